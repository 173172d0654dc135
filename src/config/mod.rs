// ==========================================
// 产能分配排产系统 - 配置层
// ==========================================
// 职责: 排产参数的显式配置值 + config_kv 加载
// 红线: 不使用进程级全局可变配置, 配置构造一次后注入各引擎
// ==========================================

pub mod schedule_config;

pub use schedule_config::{ConfigStore, ScheduleConfig};
