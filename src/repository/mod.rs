// ==========================================
// 产能分配排产系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口, 屏蔽数据库细节
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

pub mod calendar_repo;
pub mod capacity_report_repo;
pub mod error;
pub mod order_repo;

// 重导出核心仓储
pub use calendar_repo::CalendarRepository;
pub use capacity_report_repo::CapacityReportRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use order_repo::OrderRepository;
