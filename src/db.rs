// ==========================================
// 产能分配排产系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout, 减少并发写入时的偶发 busy 错误
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化核心表结构（幂等）
///
/// 表:
/// - production_order: 生产订单 (上游导入写入, 核心层只改排产字段)
/// - calendar_override: 稀疏生产日历覆盖
/// - capacity_report: 派生产能报表 (整体重建)
/// - config_kv: 键值配置 (scope_id + key)
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS production_order (
            order_id            TEXT PRIMARY KEY,
            area_m2             REAL,
            intake_date         TEXT,
            delivery_due_date   TEXT,
            priority            INTEGER NOT NULL DEFAULT 99,
            assigned_date       TEXT,
            pinned              INTEGER NOT NULL DEFAULT 0,
            status              TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_order_assigned_date
            ON production_order (assigned_date);
        CREATE INDEX IF NOT EXISTS idx_order_status
            ON production_order (status);

        CREATE TABLE IF NOT EXISTS calendar_override (
            calendar_date       TEXT PRIMARY KEY,
            is_business_day     INTEGER NOT NULL DEFAULT 1,
            capacity_m2         REAL
        );

        CREATE TABLE IF NOT EXISTS capacity_report (
            report_date             TEXT PRIMARY KEY,
            total_capacity_m2       REAL NOT NULL,
            used_capacity_m2        REAL NOT NULL,
            available_capacity_m2   REAL NOT NULL,
            order_count             INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id            TEXT NOT NULL,
            key                 TEXT NOT NULL,
            value               TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )
}
