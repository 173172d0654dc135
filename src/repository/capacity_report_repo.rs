// ==========================================
// 产能分配排产系统 - 产能报表数据仓储
// ==========================================
// 红线: 报表只允许整体替换或按日期替换, 禁止增量修补
// ==========================================

use crate::domain::capacity::CapacitySnapshot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

const DATE_FMT: &str = "%Y-%m-%d";

// ==========================================
// CapacityReportRepository - 产能报表仓储
// ==========================================

/// 产能报表仓储
/// 职责: capacity_report 表的整体/按日替换写入与读取
pub struct CapacityReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CapacityReportRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn insert_snapshot(
        tx: &rusqlite::Transaction<'_>,
        snapshot: &CapacitySnapshot,
    ) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT OR REPLACE INTO capacity_report (
                report_date, total_capacity_m2, used_capacity_m2,
                available_capacity_m2, order_count
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                snapshot.report_date.format(DATE_FMT).to_string(),
                snapshot.total_capacity_m2,
                snapshot.used_capacity_m2,
                snapshot.available_capacity_m2,
                snapshot.order_count,
            ],
        )?;
        Ok(())
    }

    /// 整体替换报表 (删全表后插入, 单事务)
    ///
    /// 报表是纯派生数据, 整体重建保证其永远不与订单
    /// 地面真值脱节, 即使存在带外人工改库
    ///
    /// # 参数
    /// - snapshots: 完整的报表行集合
    pub fn replace_all(&self, snapshots: &[CapacitySnapshot]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute("DELETE FROM capacity_report", [])?;
        for snapshot in snapshots {
            Self::insert_snapshot(&tx, snapshot)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(())
    }

    /// 按日期替换报表行 (人工换排后的局部重建, 单事务)
    ///
    /// # 参数
    /// - dates: 需要清除的日期集合
    /// - snapshots: 重建后的对应报表行
    pub fn replace_for_dates(
        &self,
        dates: &[NaiveDate],
        snapshots: &[CapacitySnapshot],
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for date in dates {
            tx.execute(
                "DELETE FROM capacity_report WHERE report_date = ?1",
                params![date.format(DATE_FMT).to_string()],
            )?;
        }
        for snapshot in snapshots {
            Self::insert_snapshot(&tx, snapshot)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(())
    }

    /// 读取全部报表行 (按日期升序)
    pub fn fetch_all(&self) -> RepositoryResult<Vec<CapacitySnapshot>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT report_date, total_capacity_m2, used_capacity_m2,
                   available_capacity_m2, order_count
            FROM capacity_report
            ORDER BY report_date ASC
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<SqliteResult<Vec<(String, f64, f64, f64, i64)>>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(date_str, total, used, available, order_count)| {
                NaiveDate::parse_from_str(&date_str, DATE_FMT).ok().map(
                    |report_date| CapacitySnapshot {
                        report_date,
                        total_capacity_m2: total,
                        used_capacity_m2: used,
                        available_capacity_m2: available,
                        order_count,
                    },
                )
            })
            .collect())
    }
}
