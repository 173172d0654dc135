// ==========================================
// 产能分配排产系统 - 产能报表领域模型
// ==========================================
// 红线: 报表整体派生自订单地面真值, 禁止手工修补
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// CapacitySnapshot - 单日产能快照
// ==========================================
// 用途: 可视化图表 + 人工换排校验的现状输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacitySnapshot {
    pub report_date: NaiveDate,        // 报表日期 (或溢出日键)
    pub total_capacity_m2: f64,        // 总产能 (溢出行: 等于已用量)
    pub used_capacity_m2: f64,         // 已用产能
    pub available_capacity_m2: f64,    // 剩余产能 (= total - used, 不取下限)
    pub order_count: i64,              // 订单数
}

impl CapacitySnapshot {
    /// 按普通日语义构造 (available = total - used, 允许为负)
    pub fn for_day(report_date: NaiveDate, total: f64, used: f64, order_count: i64) -> Self {
        Self {
            report_date,
            total_capacity_m2: total,
            used_capacity_m2: used,
            available_capacity_m2: total - used,
            order_count,
        }
    }

    /// 按溢出桶语义构造: 总量即用量, 剩余恒为 0
    ///
    /// 溢出桶表示"视野外全部日期", 产能无上限, 因此报表上
    /// 以"已满"的形态呈现而不给出虚假的余量。
    pub fn for_overflow(overflow_key: NaiveDate, used: f64, order_count: i64) -> Self {
        Self {
            report_date: overflow_key,
            total_capacity_m2: used,
            used_capacity_m2: used,
            available_capacity_m2: 0.0,
            order_count,
        }
    }
}

// ==========================================
// ReportHorizon - 报表视野
// ==========================================
// N 个连续工作日 + 1 个溢出日键 (视野后第一个工作日)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHorizon {
    pub days: Vec<NaiveDate>,          // 有序工作日序列, days[0] = 今日(或顺延)
    pub overflow_key: NaiveDate,       // 溢出日键, 代表视野外全部日期
}

impl ReportHorizon {
    /// 判断日期是否落在可见视野内
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }

    /// 视野最后一个可见工作日
    ///
    /// days 由构造方保证非空; 空视野按溢出日键兜底
    pub fn last_day(&self) -> NaiveDate {
        self.days.last().copied().unwrap_or(self.overflow_key)
    }
}
