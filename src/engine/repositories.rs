// ==========================================
// 产能分配排产系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合排产流程所需的全部 Repository
// 目标: 减少编排器构造函数参数数量
// ==========================================

use std::sync::{Arc, Mutex};

use crate::repository::{CalendarRepository, CapacityReportRepository, OrderRepository};
use rusqlite::Connection;

/// 排产流程仓储集合
///
/// 聚合排产流程所需的全部 Repository, 简化依赖注入,
/// 并保证三个仓储共享同一个底层连接。
#[derive(Clone)]
pub struct SchedulingRepositories {
    /// 生产订单仓储
    pub order_repo: Arc<OrderRepository>,
    /// 生产日历仓储
    pub calendar_repo: Arc<CalendarRepository>,
    /// 产能报表仓储
    pub report_repo: Arc<CapacityReportRepository>,
}

impl SchedulingRepositories {
    /// 创建新的仓储集合
    pub fn new(
        order_repo: Arc<OrderRepository>,
        calendar_repo: Arc<CalendarRepository>,
        report_repo: Arc<CapacityReportRepository>,
    ) -> Self {
        Self {
            order_repo,
            calendar_repo,
            report_repo,
        }
    }

    /// 从共享连接构建全套仓储
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            order_repo: Arc::new(OrderRepository::from_connection(conn.clone())),
            calendar_repo: Arc::new(CalendarRepository::from_connection(conn.clone())),
            report_repo: Arc::new(CapacityReportRepository::from_connection(conn)),
        }
    }
}
