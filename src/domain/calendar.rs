// ==========================================
// 产能分配排产系统 - 生产日历领域模型
// ==========================================
// 约定: 日历是稀疏覆盖, 缺省日期回落到工作日规则
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// CalendarOverride - 单日日历覆盖
// ==========================================
// 缺失某日期的覆盖时: 周一至周五为工作日, 产能取默认值
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalendarOverride {
    pub is_business_day: bool,         // 是否生产日
    pub capacity_m2: Option<f64>,      // 单日产能覆盖 (平方米), None 取默认
}
