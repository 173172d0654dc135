// ==========================================
// 产能分配排产系统 - 生产订单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

use crate::domain::order::{AssignedLoad, ProductionOrder};
use crate::domain::types::OrderStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult, Row};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// 日期列统一存储格式
const DATE_FMT: &str = "%Y-%m-%d";

// ==========================================
// OrderRepository - 生产订单仓储
// ==========================================

/// 生产订单仓储
/// 职责: 管理 production_order 表的查询与排产字段批量更新
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行映射: production_order -> ProductionOrder
    ///
    /// 说明: 状态列无法识别时按 DATA_ERROR 处理 (不可排, 不中断查询)
    fn map_order_row(row: &Row<'_>) -> SqliteResult<ProductionOrder> {
        let status_raw: String = row.get(7)?;

        Ok(ProductionOrder {
            order_id: row.get(0)?,
            area_m2: row.get(1)?,
            intake_date: row
                .get::<_, Option<String>>(2)?
                .and_then(|s| NaiveDate::parse_from_str(&s, DATE_FMT).ok()),
            delivery_due_date: row
                .get::<_, Option<String>>(3)?
                .and_then(|s| NaiveDate::parse_from_str(&s, DATE_FMT).ok()),
            priority: row.get(4)?,
            assigned_date: row
                .get::<_, Option<String>>(5)?
                .and_then(|s| NaiveDate::parse_from_str(&s, DATE_FMT).ok()),
            pinned: row.get::<_, i64>(6)? != 0,
            status: OrderStatus::parse(&status_raw).unwrap_or(OrderStatus::DataError),
        })
    }

    /// 查询自动排产候选订单
    ///
    /// 过滤条件: assigned_date 为空 + 未锁定 + 状态属于可排集合
    /// 排序: (priority 升序, intake_date 升序) —— 同优先级内 FIFO
    ///
    /// # 参数
    /// - statuses: 可排状态集合
    ///
    /// # 返回
    /// - Ok(Vec<ProductionOrder>): 有序候选列表
    /// - Err: 数据库错误
    pub fn fetch_schedulable_candidates(
        &self,
        statuses: &[OrderStatus],
    ) -> RepositoryResult<Vec<ProductionOrder>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let placeholders = statuses
            .iter()
            .map(|_| "?")
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            r#"
            SELECT
                order_id, area_m2, intake_date, delivery_due_date,
                priority, assigned_date, pinned, status
            FROM production_order
            WHERE assigned_date IS NULL
              AND pinned = 0
              AND status IN ({})
            ORDER BY priority ASC, intake_date ASC
            "#,
            placeholders
        );

        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map(
                params_from_iter(statuses.iter().map(|s| s.to_string())),
                Self::map_order_row,
            )?
            .collect::<SqliteResult<Vec<ProductionOrder>>>()?;

        Ok(orders)
    }

    /// 查询全部已占用产能记录 (地面真值)
    ///
    /// 包含: 自动排产结果 + 人工锁定订单, 即所有 assigned_date 非空的订单
    /// 面积缺失按 0 计 (与报表聚合口径一致)
    pub fn fetch_assigned_loads(&self) -> RepositoryResult<Vec<AssignedLoad>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT order_id, assigned_date, COALESCE(area_m2, 0.0)
            FROM production_order
            WHERE assigned_date IS NOT NULL
            "#,
        )?;

        let loads = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<SqliteResult<Vec<(String, String, f64)>>>()?;

        // 日期解析失败的记录直接剔除 (核心层假定日期已归一化)
        Ok(loads
            .into_iter()
            .filter_map(|(order_id, date_str, area_m2)| {
                NaiveDate::parse_from_str(&date_str, DATE_FMT)
                    .ok()
                    .map(|assigned_date| AssignedLoad {
                        order_id,
                        assigned_date,
                        area_m2,
                    })
            })
            .collect())
    }

    /// 按订单号集合查询订单
    ///
    /// # 参数
    /// - order_ids: 订单号列表
    ///
    /// # 返回
    /// - Ok(Vec<ProductionOrder>): 命中的订单 (缺失的订单号静默跳过)
    pub fn find_by_ids(&self, order_ids: &[String]) -> RepositoryResult<Vec<ProductionOrder>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let placeholders = order_ids
            .iter()
            .map(|_| "?")
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            r#"
            SELECT
                order_id, area_m2, intake_date, delivery_due_date,
                priority, assigned_date, pinned, status
            FROM production_order
            WHERE order_id IN ({})
            "#,
            placeholders
        );

        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map(params_from_iter(order_ids.iter()), Self::map_order_row)?
            .collect::<SqliteResult<Vec<ProductionOrder>>>()?;

        Ok(orders)
    }

    /// 批量写入排产日期 (单事务, 全有或全无)
    ///
    /// 只更新 assigned_date, 不触碰 pinned —— 自动排产结果
    /// 必须与人工换排结果保持可区分
    ///
    /// # 参数
    /// - assignments: 订单号 -> 排产日期
    ///
    /// # 返回
    /// - Ok(usize): 实际更新行数
    /// - Err: 事务失败 (已回滚, 无部分写入)
    pub fn batch_set_assigned_date(
        &self,
        assignments: &BTreeMap<String, NaiveDate>,
    ) -> RepositoryResult<usize> {
        if assignments.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut updated = 0;
        for (order_id, date) in assignments {
            updated += tx.execute(
                "UPDATE production_order SET assigned_date = ?1 WHERE order_id = ?2",
                params![date.format(DATE_FMT).to_string(), order_id],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(updated)
    }

    /// 批量写入排产日期并加人工锁 (单事务, 全有或全无)
    ///
    /// 人工换排专用: 成功换排的订单一律置 pinned=1,
    /// 从此脱离自动排产的候选范围
    pub fn batch_set_assigned_date_and_pin(
        &self,
        assignments: &BTreeMap<String, NaiveDate>,
    ) -> RepositoryResult<usize> {
        if assignments.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut updated = 0;
        for (order_id, date) in assignments {
            updated += tx.execute(
                "UPDATE production_order SET assigned_date = ?1, pinned = 1 WHERE order_id = ?2",
                params![date.format(DATE_FMT).to_string(), order_id],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(updated)
    }

    /// 聚合某一排产日的已用面积与订单数 (地面真值)
    ///
    /// # 返回
    /// - Ok((面积合计, 订单数))
    pub fn aggregate_area_for_date(&self, date: NaiveDate) -> RepositoryResult<(f64, i64)> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            r#"
            SELECT COALESCE(SUM(area_m2), 0.0), COUNT(*)
            FROM production_order
            WHERE assigned_date = ?1
            "#,
            params![date.format(DATE_FMT).to_string()],
            |row| Ok((row.get::<_, f64>(0)?, row.get::<_, i64>(1)?)),
        )?;

        Ok(result)
    }

    /// 聚合某日期之后 (不含) 的已用面积与订单数
    ///
    /// 用途: 报表溢出桶 ("视野外全部日期") 的统计
    pub fn aggregate_area_beyond(&self, date: NaiveDate) -> RepositoryResult<(f64, i64)> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            r#"
            SELECT COALESCE(SUM(area_m2), 0.0), COUNT(*)
            FROM production_order
            WHERE assigned_date IS NOT NULL
              AND assigned_date > ?1
            "#,
            params![date.format(DATE_FMT).to_string()],
            |row| Ok((row.get::<_, f64>(0)?, row.get::<_, i64>(1)?)),
        )?;

        Ok(result)
    }

    /// 插入或替换单个订单 (测试与上游导入适配层使用)
    pub fn upsert_single(&self, order: &ProductionOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO production_order (
                order_id, area_m2, intake_date, delivery_due_date,
                priority, assigned_date, pinned, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                order.order_id,
                order.area_m2,
                order.intake_date.map(|d| d.format(DATE_FMT).to_string()),
                order
                    .delivery_due_date
                    .map(|d| d.format(DATE_FMT).to_string()),
                order.priority,
                order.assigned_date.map(|d| d.format(DATE_FMT).to_string()),
                order.pinned as i64,
                order.status.to_string(),
            ],
        )?;

        Ok(())
    }
}
