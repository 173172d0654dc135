// ==========================================
// 产能分配排产系统 - 生产日历数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::calendar::CalendarOverride;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const DATE_FMT: &str = "%Y-%m-%d";

// ==========================================
// CalendarRepository - 日历仓储
// ==========================================

/// 生产日历仓储
/// 职责: 读取 calendar_override 表的稀疏日历覆盖
pub struct CalendarRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CalendarRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取全部日历覆盖
    ///
    /// 日历是稀疏的: 只存与工作日默认规则不同的日期,
    /// 以及带单日产能覆盖的日期
    ///
    /// # 返回
    /// - Ok(HashMap<NaiveDate, CalendarOverride>): 日期 -> 覆盖规则
    pub fn fetch_all_overrides(
        &self,
    ) -> RepositoryResult<HashMap<NaiveDate, CalendarOverride>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT calendar_date, is_business_day, capacity_m2
            FROM calendar_override
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? != 0,
                    row.get::<_, Option<f64>>(2)?,
                ))
            })?
            .collect::<SqliteResult<Vec<(String, bool, Option<f64>)>>>()?;

        let mut overrides = HashMap::with_capacity(rows.len());
        for (date_str, is_business_day, capacity_m2) in rows {
            // 非法日期行静默跳过 (核心层假定日期已归一化)
            if let Ok(date) = NaiveDate::parse_from_str(&date_str, DATE_FMT) {
                overrides.insert(
                    date,
                    CalendarOverride {
                        is_business_day,
                        capacity_m2,
                    },
                );
            }
        }

        Ok(overrides)
    }

    /// 插入或替换单日覆盖 (测试与上游维护界面适配层使用)
    pub fn upsert_single(
        &self,
        date: NaiveDate,
        rule: &CalendarOverride,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO calendar_override (calendar_date, is_business_day, capacity_m2)
            VALUES (?1, ?2, ?3)
            "#,
            params![
                date.format(DATE_FMT).to_string(),
                rule.is_business_day as i64,
                rule.capacity_m2,
            ],
        )?;

        Ok(())
    }
}
