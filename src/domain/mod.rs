// ==========================================
// 产能分配排产系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑, 不含引擎逻辑
// ==========================================

pub mod calendar;
pub mod capacity;
pub mod order;
pub mod types;

// 重导出核心类型
pub use calendar::CalendarOverride;
pub use capacity::{CapacitySnapshot, ReportHorizon};
pub use order::{AssignedLoad, ProductionOrder};
pub use types::OrderStatus;
