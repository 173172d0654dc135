// ==========================================
// 产能分配排产系统 - 命令行入口
// ==========================================
// 定位: 核心契约之上的薄适配层, 触发一次完整排产运行
// 并发约束: 部署侧须保证同一库上单实例运行
// ==========================================

use anyhow::Context;
use capacity_aps::config::ConfigStore;
use capacity_aps::engine::SchedulingRepositories;
use capacity_aps::{db, logging, ScheduleOrchestrator};
use chrono::Local;
use std::sync::{Arc, Mutex};

/// 默认数据库路径: <系统数据目录>/capacity-aps/aps.db
fn get_default_db_path() -> String {
    let base = dirs::data_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    let dir = base.join("capacity-aps");
    let _ = std::fs::create_dir_all(&dir);
    dir.join("aps.db").to_string_lossy().to_string()
}

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", capacity_aps::APP_NAME, capacity_aps::VERSION);
    tracing::info!("==================================================");

    // 数据库路径 (可用环境变量覆盖)
    let db_path = std::env::var("CAPACITY_APS_DB").unwrap_or_else(|_| get_default_db_path());
    tracing::info!("使用数据库: {}", db_path);

    let conn = db::open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    db::init_schema(&conn).context("初始化表结构失败")?;

    let conn = Arc::new(Mutex::new(conn));

    // 加载配置 (config_kv 覆盖 + 默认常量)
    let config = ConfigStore::from_connection(conn.clone())
        .load_schedule_config()
        .map_err(|e| anyhow::anyhow!("加载配置失败: {}", e))?;

    // 构建仓储与编排器, 执行一次完整排产运行
    let repos = SchedulingRepositories::from_connection(conn);
    let orchestrator = ScheduleOrchestrator::new(config, repos);

    let today = Local::now().date_naive();
    let result = orchestrator
        .run_scheduling_cycle(today)
        .context("排产运行失败")?;

    tracing::info!(
        run_id = %result.run_id,
        assigned_count = result.assigned_count,
        skipped_count = result.skipped_count,
        report_rows = result.snapshots.len(),
        "排产运行完成"
    );

    Ok(())
}
