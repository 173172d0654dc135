// ==========================================
// 产能分配排产系统 - 产能分配引擎
// ==========================================
// 红线: 产能约束优先于订单优先级; 人工锁定不可触碰
// ==========================================
// 职责: 贪心分配候选订单到报表视野内的生产日
// 输入: 日历服务 + 已占用产能地面真值 + 有序候选订单
// 输出: 订单号 -> 排产日期 映射 (由上层做单次批量写入)
// ==========================================

use crate::config::ScheduleConfig;
use crate::domain::capacity::ReportHorizon;
use crate::domain::order::{AssignedLoad, ProductionOrder};
use crate::engine::calendar_service::CalendarService;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

// ==========================================
// AllocationOutcome - 分配结果
// ==========================================

/// 一次分配运行的完整输出
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// 订单号 -> 排产日期 (BTreeMap 保证遍历次序确定)
    pub assignments: BTreeMap<String, NaiveDate>,
    /// 运行结束时各日已用产能 (含播种量)
    pub used_by_day: HashMap<NaiveDate, f64>,
    /// 因字段缺失被剔除的候选: (订单号, 原因)
    pub skipped_orders: Vec<(String, String)>,
    /// 本次运行使用的报表视野
    pub horizon: ReportHorizon,
}

// ==========================================
// Allocator - 产能分配引擎
// ==========================================

/// 产能分配引擎
///
/// 纯内存计算: 一次读入快照, 算完整个分配映射, 不做中途写库。
/// 同一仓储/日历快照 + 同一候选集, 任意次运行产出相同映射。
///
/// # 软关闭策略
/// 游标日用量达到软关闭阈值后, 本次运行不再向该日投放新候选,
/// 即使后续出现更小的订单仍能放下也不回头。用确定性和线性
/// 推进换取装箱最优性, 属于既定业务策略。
pub struct Allocator {
    config: ScheduleConfig,
}

impl Allocator {
    /// 创建分配引擎
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    /// 播种已用产能映射
    ///
    /// 从全部已有排产日期的订单出发 (含自动结果与人工锁定),
    /// 视野外的日期归入溢出桶。播种自地面真值是人工锁具有
    /// 权威性的根基: 引擎不会"忘记"任何已承诺的产能。
    ///
    /// # 参数
    /// - horizon: 报表视野
    /// - loads: 已占用产能记录
    pub fn seed_usage(
        &self,
        horizon: &ReportHorizon,
        loads: &[AssignedLoad],
    ) -> HashMap<NaiveDate, f64> {
        let mut used: HashMap<NaiveDate, f64> = HashMap::new();
        for day in &horizon.days {
            used.insert(*day, 0.0);
        }
        used.insert(horizon.overflow_key, 0.0);

        let last_day = horizon.last_day();
        for load in loads {
            if let Some(slot) = used.get_mut(&load.assigned_date) {
                *slot += load.area_m2;
            } else if load.assigned_date > last_day {
                if let Some(slot) = used.get_mut(&horizon.overflow_key) {
                    *slot += load.area_m2;
                }
            }
            // 视野之前的历史日期不占用视野产能
        }

        used
    }

    /// 执行一次完整分配
    ///
    /// # 参数
    /// - calendar: 日历服务
    /// - today: 当前日期 (调用方注入)
    /// - loads: 已占用产能地面真值
    /// - candidates: 候选订单 (可以是任意存储返回次序, 引擎内部显式排序)
    ///
    /// # 返回
    /// 分配结果; 候选为空时 assignments 为空映射 (幂等运行零写入)
    pub fn run(
        &self,
        calendar: &CalendarService,
        today: NaiveDate,
        loads: &[AssignedLoad],
        candidates: Vec<ProductionOrder>,
    ) -> AllocationOutcome {
        // 步骤1: 构建视野与溢出日键
        let horizon = calendar.build_horizon(self.config.report_horizon_days, today);

        // 步骤2: 播种已用产能 (地面真值, 含人工锁定)
        let mut used = self.seed_usage(&horizon, loads);

        // 步骤3: 游标定位到第一个未软关闭的视野日
        let mut cursor = self.initial_cursor(calendar, &horizon, &used);

        // 步骤4: 候选筛选与排序 (priority 升序, intake_date 升序)
        let (mut eligible, skipped_orders) = self.select_candidates(candidates);
        eligible.sort_by_key(|o| (o.priority, o.intake_date.unwrap_or(NaiveDate::MAX)));

        info!(
            horizon_start = %horizon.days[0],
            horizon_end = %horizon.last_day(),
            overflow_key = %horizon.overflow_key,
            candidate_count = eligible.len(),
            skipped_count = skipped_orders.len(),
            "开始产能分配"
        );

        // 步骤5: 逐候选探测投放
        let mut assignments: BTreeMap<String, NaiveDate> = BTreeMap::new();
        for order in &eligible {
            // select_candidates 已保证字段齐全
            let area = order.area_m2.unwrap_or(0.0);
            let due_date = match order.delivery_due_date {
                Some(d) => d,
                None => continue,
            };

            let assigned = self.probe_and_assign(
                calendar, &horizon, &mut used, cursor, area, due_date,
            );

            assignments.insert(order.order_id.clone(), assigned);
            debug!(order_id = %order.order_id, assigned_date = %assigned, area_m2 = area, "候选已投放");

            // 步骤6: 自动投放填满游标日后, 游标单调前移 (不回头)
            if assigned == cursor && assigned != horizon.overflow_key {
                let usage = used.get(&assigned).copied().unwrap_or(0.0);
                if usage >= self.config.soft_close_threshold_m2 {
                    cursor = self.advance_within_horizon(calendar, &horizon, assigned);
                }
            }
        }

        info!(assigned_count = assignments.len(), "产能分配完成");

        AllocationOutcome {
            assignments,
            used_by_day: used,
            skipped_orders,
            horizon,
        }
    }

    /// 候选筛选: 剔除已排/锁定/状态不可排/字段缺失的订单
    ///
    /// 字段缺失只产生 warning, 不中断运行
    fn select_candidates(
        &self,
        candidates: Vec<ProductionOrder>,
    ) -> (Vec<ProductionOrder>, Vec<(String, String)>) {
        let mut eligible = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();

        for order in candidates {
            if order.assigned_date.is_some() || order.pinned {
                continue;
            }
            if !self
                .config
                .schedulable_statuses
                .contains(&order.status)
            {
                continue;
            }
            match order.validate_candidate() {
                Ok(()) => eligible.push(order),
                Err(reason) => {
                    warn!(order_id = %order.order_id, reason = %reason, "候选字段缺失, 本轮跳过");
                    skipped.push((order.order_id, reason));
                }
            }
        }

        (eligible, skipped)
    }

    /// 初始游标: 跳过已被人工/历史占满 (达软关闭阈值) 的视野日
    fn initial_cursor(
        &self,
        calendar: &CalendarService,
        horizon: &ReportHorizon,
        used: &HashMap<NaiveDate, f64>,
    ) -> NaiveDate {
        let mut cursor = horizon.days[0];
        loop {
            if cursor == horizon.overflow_key {
                break;
            }
            let usage = used.get(&cursor).copied().unwrap_or(0.0);
            if usage < self.config.soft_close_threshold_m2 {
                break;
            }
            info!(day = %cursor, used_m2 = usage, "该日已饱和, 游标前移");
            cursor = self.advance_within_horizon(calendar, horizon, cursor);
        }
        cursor
    }

    /// 游标/探针前移: 视野内取下一个生产日, 出界则落到溢出桶
    fn advance_within_horizon(
        &self,
        calendar: &CalendarService,
        horizon: &ReportHorizon,
        day: NaiveDate,
    ) -> NaiveDate {
        let next = calendar.next_business_day(day);
        if horizon.contains(next) {
            next
        } else {
            horizon.overflow_key
        }
    }

    /// 单个候选的探测投放
    ///
    /// 次序: 溢出桶无条件承接 -> 交货窗口校验 -> 产能校验。
    /// 交货校验在产能校验之前: 交不上货的日子再空也不能用。
    fn probe_and_assign(
        &self,
        calendar: &CalendarService,
        horizon: &ReportHorizon,
        used: &mut HashMap<NaiveDate, f64>,
        start: NaiveDate,
        area: f64,
        due_date: NaiveDate,
    ) -> NaiveDate {
        let mut probe = start;
        loop {
            // 溢出桶: 无上限, 必定承接
            if probe == horizon.overflow_key {
                *used.entry(probe).or_insert(0.0) += area;
                return probe;
            }

            // 交货窗口: 交货期晚于该日截止日, 此日不可承接
            let deadline = calendar.delivery_window_deadline(probe);
            if due_date > deadline {
                probe = self.advance_within_horizon(calendar, horizon, probe);
                continue;
            }

            // 产能校验
            let usage = used.get(&probe).copied().unwrap_or(0.0);
            if usage + area <= calendar.capacity_for(probe) {
                *used.entry(probe).or_insert(0.0) += area;
                return probe;
            }

            probe = self.advance_within_horizon(calendar, horizon, probe);
        }
    }
}
