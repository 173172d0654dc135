// ==========================================
// 产能分配排产系统 - 引擎层
// ==========================================
// 职责: 实现排产业务规则
// 红线: Engine 不拼 SQL, 聚合查询一律走 Repository
// ==========================================

pub mod allocator;
pub mod calendar_service;
pub mod capacity_report;
pub mod orchestrator;
pub mod repositories;
pub mod swap_validator;

// 重导出核心引擎
pub use allocator::{AllocationOutcome, Allocator};
pub use calendar_service::CalendarService;
pub use capacity_report::CapacityReportBuilder;
pub use orchestrator::{ScheduleOrchestrator, ScheduleRunResult};
pub use repositories::SchedulingRepositories;
pub use swap_validator::{SwapOutcome, SwapRequest, SwapValidator};
