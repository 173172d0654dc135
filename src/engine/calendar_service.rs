// ==========================================
// 产能分配排产系统 - 生产日历引擎
// ==========================================
// 职责: 工作日判定、单日产能、交货窗口截止日、报表视野
// 红线: 纯函数计算, 不访问数据库, 不产生副作用
// ==========================================

use crate::config::ScheduleConfig;
use crate::domain::calendar::CalendarOverride;
use crate::domain::capacity::ReportHorizon;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::HashMap;

// ==========================================
// CalendarService - 日历服务
// ==========================================

/// 生产日历服务
///
/// 基于稀疏日历覆盖 + 工作日默认规则的纯计算服务。
/// 无覆盖日期的语义: 周一至周五为工作日, 产能取配置默认值。
pub struct CalendarService {
    overrides: HashMap<NaiveDate, CalendarOverride>,
    config: ScheduleConfig,
}

impl CalendarService {
    /// 创建日历服务
    ///
    /// # 参数
    /// - overrides: 稀疏日历覆盖 (日期 -> 规则)
    /// - config: 排产配置
    pub fn new(overrides: HashMap<NaiveDate, CalendarOverride>, config: ScheduleConfig) -> Self {
        Self { overrides, config }
    }

    /// 判断是否生产日
    ///
    /// 覆盖优先; 无覆盖时按周一至周五判定
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        match self.overrides.get(&date) {
            Some(rule) => rule.is_business_day,
            None => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }

    /// 求严格大于 date 的下一个生产日
    ///
    /// 逐日向前扫描; 日历是稀疏的, 间隔通常只有几天
    pub fn next_business_day(&self, date: NaiveDate) -> NaiveDate {
        let mut next = date + Days::new(1);
        while !self.is_business_day(next) {
            next = next + Days::new(1);
        }
        next
    }

    /// 查询单日产能 (平方米)
    ///
    /// 覆盖中指定了产能则取覆盖值, 否则取配置默认值
    pub fn capacity_for(&self, date: NaiveDate) -> f64 {
        self.overrides
            .get(&date)
            .and_then(|rule| rule.capacity_m2)
            .unwrap_or(self.config.default_daily_capacity_m2)
    }

    /// 判断 date 是否紧邻一个多日停产间隔 (标准场景: 周五之后是周末)
    ///
    /// 判据: 随后两个自然日均非生产日
    fn precedes_long_gap(&self, date: NaiveDate) -> bool {
        !self.is_business_day(date + Days::new(1)) && !self.is_business_day(date + Days::new(2))
    }

    /// 计算某排产日的交货窗口截止日
    ///
    /// 规则:
    /// - 排产日紧邻多日停产间隔时: 截止日 = 排产日 + 长间隔跨度(自然日),
    ///   若落在非生产日则顺延到下一个生产日。
    ///   间隔前排产的订单需要更长的自然日跨度, 才能获得同样多的
    ///   生产日余量。
    /// - 其他情况: 从排产日起连续取 W 次下一个生产日 (W = 交货窗口)。
    ///
    /// # 参数
    /// - schedule_date: 候选排产日
    ///
    /// # 返回
    /// 交货截止日: 订单交货期晚于该日时, 此排产日不可承接该订单
    pub fn delivery_window_deadline(&self, schedule_date: NaiveDate) -> NaiveDate {
        if self.precedes_long_gap(schedule_date) {
            let mut deadline = schedule_date + Days::new(self.config.long_gap_span_days as u64);
            if !self.is_business_day(deadline) {
                deadline = self.next_business_day(deadline);
            }
            return deadline;
        }

        let mut deadline = schedule_date;
        for _ in 0..self.config.delivery_window_days {
            deadline = self.next_business_day(deadline);
        }
        deadline
    }

    /// 构建报表视野
    ///
    /// 从 today 开始 (today 非生产日则顺延到下一个生产日),
    /// 连续取 n 个生产日; 溢出日键 = 视野末日之后的第一个生产日
    ///
    /// # 参数
    /// - n: 视野长度 (生产日数, 最小 1)
    /// - today: 当前日期 (由调用方注入, 保证运行可复现)
    pub fn build_horizon(&self, n: usize, today: NaiveDate) -> ReportHorizon {
        let n = n.max(1);

        let mut day = if self.is_business_day(today) {
            today
        } else {
            self.next_business_day(today)
        };

        let mut days = Vec::with_capacity(n);
        days.push(day);
        while days.len() < n {
            day = self.next_business_day(day);
            days.push(day);
        }

        ReportHorizon {
            overflow_key: self.next_business_day(day),
            days,
        }
    }
}
