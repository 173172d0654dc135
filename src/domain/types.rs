// ==========================================
// 产能分配排产系统 - 领域类型定义
// ==========================================
// 依据: 上游清洗层的订单状态推导逻辑
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// 来源: 上游导入层按下料数量推导, 核心层只读
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Unscheduled,          // 未编排
    EnteredUnscheduled,   // 已录入未编排
    PartiallyScheduled,   // 部分编排
    NotManufactured,      // 未投产
    Entered,              // 新录入
    ScheduledComplete,    // 编排完成 (不可再排)
    DataError,            // 状态推导异常 (不可排)
}

impl OrderStatus {
    /// 是否属于自动排产候选状态
    ///
    /// # 返回
    /// - `true`: 可进入排产候选集
    /// - `false`: 已完成或数据异常, 不进入候选
    pub fn is_schedulable(&self) -> bool {
        !matches!(self, OrderStatus::ScheduledComplete | OrderStatus::DataError)
    }

    /// 默认可排状态全集 (配置缺省值)
    pub fn schedulable_set() -> Vec<OrderStatus> {
        vec![
            OrderStatus::Unscheduled,
            OrderStatus::EnteredUnscheduled,
            OrderStatus::PartiallyScheduled,
            OrderStatus::NotManufactured,
            OrderStatus::Entered,
        ]
    }

    /// 从数据库字符串解析
    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "UNSCHEDULED" => Some(OrderStatus::Unscheduled),
            "ENTERED_UNSCHEDULED" => Some(OrderStatus::EnteredUnscheduled),
            "PARTIALLY_SCHEDULED" => Some(OrderStatus::PartiallyScheduled),
            "NOT_MANUFACTURED" => Some(OrderStatus::NotManufactured),
            "ENTERED" => Some(OrderStatus::Entered),
            "SCHEDULED_COMPLETE" => Some(OrderStatus::ScheduledComplete),
            "DATA_ERROR" => Some(OrderStatus::DataError),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Unscheduled => write!(f, "UNSCHEDULED"),
            OrderStatus::EnteredUnscheduled => write!(f, "ENTERED_UNSCHEDULED"),
            OrderStatus::PartiallyScheduled => write!(f, "PARTIALLY_SCHEDULED"),
            OrderStatus::NotManufactured => write!(f, "NOT_MANUFACTURED"),
            OrderStatus::Entered => write!(f, "ENTERED"),
            OrderStatus::ScheduledComplete => write!(f, "SCHEDULED_COMPLETE"),
            OrderStatus::DataError => write!(f, "DATA_ERROR"),
        }
    }
}
