// ==========================================
// Allocator 引擎测试
// ==========================================
// 测试目标: 贪心分配、软关闭游标、交货窗口校验、
//          播种权威性、幂等与确定性
// ==========================================


use capacity_aps::domain::order::AssignedLoad;
use capacity_aps::domain::types::OrderStatus;
use capacity_aps::engine::Allocator;
use chrono::NaiveDate;
use test_helpers::{d, plain_calendar, test_config, OrderBuilder};

// 2026-01 参照: 1/5 周一, 视野 = 1/5..1/9, 溢出日 = 1/12

fn today() -> NaiveDate {
    d(2026, 1, 5)
}

fn make_load(order_id: &str, date: NaiveDate, area: f64) -> AssignedLoad {
    AssignedLoad {
        order_id: order_id.to_string(),
        assigned_date: date,
        area_m2: area,
    }
}

// ==========================================
// 基本分配与软关闭策略
// ==========================================

#[test]
fn test_soft_close_scenario_60_then_50() {
    // 产能 100, 软关闭 90: O1(60) 进 day1 后 day1 仍开放,
    // O2(50) 放不下 day1 (110 > 100), 落到 day2
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let candidates = vec![
        OrderBuilder::new("O1").area(60.0).priority(1).due(d(2026, 1, 6)).build(),
        OrderBuilder::new("O2").area(50.0).priority(2).due(d(2026, 1, 6)).build(),
    ];

    let outcome = allocator.run(&calendar, today(), &[], candidates);

    assert_eq!(outcome.assignments["O1"], d(2026, 1, 5));
    assert_eq!(outcome.assignments["O2"], d(2026, 1, 6));
    assert_eq!(outcome.used_by_day[&d(2026, 1, 5)], 60.0);
    assert_eq!(outcome.used_by_day[&d(2026, 1, 6)], 50.0);
}

#[test]
fn test_soft_closed_day_never_reopens() {
    // day1 投放达到软关闭后, 后续更小的订单也不再回到 day1,
    // 即使产能上仍然放得下 —— 既定业务策略
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let candidates = vec![
        OrderBuilder::new("O1").area(92.0).priority(1).due(d(2026, 1, 6)).build(),
        OrderBuilder::new("O2").area(5.0).priority(2).due(d(2026, 1, 6)).build(),
    ];

    let outcome = allocator.run(&calendar, today(), &[], candidates);

    assert_eq!(outcome.assignments["O1"], d(2026, 1, 5));
    // 92 + 5 = 97 <= 100 本可放下, 但 day1 已软关闭
    assert_eq!(outcome.assignments["O2"], d(2026, 1, 6));
}

#[test]
fn test_fifo_within_priority() {
    // 同优先级按录入日期先后; 不同优先级数值小者先排
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let candidates = vec![
        OrderBuilder::new("A").area(40.0).priority(1).intake(d(2026, 1, 2)).due(d(2026, 1, 6)).build(),
        OrderBuilder::new("B").area(40.0).priority(1).intake(d(2026, 1, 1)).due(d(2026, 1, 6)).build(),
        OrderBuilder::new("C").area(40.0).priority(0).intake(d(2026, 1, 3)).due(d(2026, 1, 6)).build(),
    ];

    let outcome = allocator.run(&calendar, today(), &[], candidates);

    // 投放次序 C -> B -> A; 第三单超出 day1 产能落 day2
    assert_eq!(outcome.assignments["C"], d(2026, 1, 5));
    assert_eq!(outcome.assignments["B"], d(2026, 1, 5));
    assert_eq!(outcome.assignments["A"], d(2026, 1, 6));
}

// ==========================================
// 播种: 人工锁定与既有排产具有权威性
// ==========================================

#[test]
fn test_seeding_skips_presaturated_day() {
    // day1 已有 92 (达软关闭), 新候选直接从 day2 开始,
    // 即使它在 day1 产能上放得下
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let loads = vec![make_load("LOCKED", d(2026, 1, 5), 92.0)];
    let candidates =
        vec![OrderBuilder::new("NEW").area(5.0).priority(1).due(d(2026, 1, 6)).build()];

    let outcome = allocator.run(&calendar, today(), &loads, candidates);

    assert_eq!(outcome.assignments["NEW"], d(2026, 1, 6));
}

#[test]
fn test_seeding_buckets_far_dates_into_overflow() {
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let horizon = calendar.build_horizon(5, today());
    let loads = vec![
        make_load("H1", d(2026, 1, 7), 30.0),   // 视野内
        make_load("H2", d(2026, 2, 20), 70.0),  // 视野外 -> 溢出桶
        make_load("H3", d(2025, 12, 1), 40.0),  // 历史日期 -> 不计
    ];

    let used = allocator.seed_usage(&horizon, &loads);

    assert_eq!(used[&d(2026, 1, 7)], 30.0);
    assert_eq!(used[&horizon.overflow_key], 70.0);
    assert_eq!(used.values().sum::<f64>(), 100.0);
}

// ==========================================
// 交货窗口校验
// ==========================================

#[test]
fn test_due_date_pushes_order_later() {
    // 交货期 1/9: 1/5 (截止 1/7)、1/6 (截止 1/8) 都不可承接,
    // 1/7 (截止 1/9) 起才可投放 —— 近交期优先占近日
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let candidates =
        vec![OrderBuilder::new("JIT").area(10.0).priority(1).due(d(2026, 1, 9)).build()];

    let outcome = allocator.run(&calendar, today(), &[], candidates);

    assert_eq!(outcome.assignments["JIT"], d(2026, 1, 7));
}

#[test]
fn test_due_on_schedule_day_is_assignable() {
    // 校验是"交货期不得晚于截止日", 不是"不得早于排产日"
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let candidates =
        vec![OrderBuilder::new("DUE_TODAY").area(10.0).priority(1).due(d(2026, 1, 5)).build()];

    let outcome = allocator.run(&calendar, today(), &[], candidates);

    assert_eq!(outcome.assignments["DUE_TODAY"], d(2026, 1, 5));
}

#[test]
fn test_due_within_deadline_is_assignable() {
    // 交货期仅 1 个生产日之后, 截止日在 2 个生产日之后 -> 可承接
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let candidates =
        vec![OrderBuilder::new("NEAR").area(10.0).priority(1).due(d(2026, 1, 6)).build()];

    let outcome = allocator.run(&calendar, today(), &[], candidates);

    assert_eq!(outcome.assignments["NEAR"], d(2026, 1, 5));
}

#[test]
fn test_far_due_date_lands_in_overflow() {
    // 交货期远超视野内全部截止日 -> 落溢出桶
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let candidates =
        vec![OrderBuilder::new("FAR").area(10.0).priority(1).due(d(2026, 1, 30)).build()];

    let outcome = allocator.run(&calendar, today(), &[], candidates);

    assert_eq!(outcome.assignments["FAR"], d(2026, 1, 12)); // 溢出日键
}

// ==========================================
// 溢出桶承接
// ==========================================

#[test]
fn test_overflow_accepts_unconditionally() {
    // 视野五日全部占满: 候选无条件落溢出桶, 不受产能限制
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let loads: Vec<AssignedLoad> = (5..=9)
        .map(|day| make_load(&format!("FULL{}", day), d(2026, 1, day), 100.0))
        .collect();
    let candidates =
        vec![OrderBuilder::new("BIG").area(500.0).priority(1).due(d(2026, 1, 6)).build()];

    let outcome = allocator.run(&calendar, today(), &loads, candidates);

    assert_eq!(outcome.assignments["BIG"], d(2026, 1, 12));
    assert_eq!(outcome.used_by_day[&d(2026, 1, 12)], 500.0);
}

// ==========================================
// 候选筛选
// ==========================================

#[test]
fn test_pinned_and_assigned_orders_never_in_output() {
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let candidates = vec![
        OrderBuilder::new("PINNED").area(10.0).pinned().build(),
        OrderBuilder::new("DONE").area(10.0).assigned(d(2026, 1, 6)).build(),
        OrderBuilder::new("COMPLETE").area(10.0).status(OrderStatus::ScheduledComplete).build(),
        OrderBuilder::new("OK").area(10.0).due(d(2026, 1, 6)).build(),
    ];

    let outcome = allocator.run(&calendar, today(), &[], candidates);

    assert_eq!(outcome.assignments.len(), 1);
    assert!(outcome.assignments.contains_key("OK"));
}

#[test]
fn test_missing_fields_skip_with_reason() {
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let candidates = vec![
        OrderBuilder::new("NO_AREA").no_area().build(),
        OrderBuilder::new("NO_DUE").no_due().build(),
        OrderBuilder::new("OK").area(10.0).due(d(2026, 1, 6)).build(),
    ];

    let outcome = allocator.run(&calendar, today(), &[], candidates);

    assert_eq!(outcome.assignments.len(), 1);
    assert_eq!(outcome.skipped_orders.len(), 2);
    let skipped_ids: Vec<&str> = outcome
        .skipped_orders
        .iter()
        .map(|(id, _)| id.as_str())
        .collect();
    assert!(skipped_ids.contains(&"NO_AREA"));
    assert!(skipped_ids.contains(&"NO_DUE"));
}

// ==========================================
// 幂等与确定性
// ==========================================

#[test]
fn test_second_run_with_no_new_candidates_is_empty() {
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let candidates = vec![
        OrderBuilder::new("O1").area(60.0).priority(1).due(d(2026, 1, 6)).build(),
        OrderBuilder::new("O2").area(50.0).priority(2).due(d(2026, 1, 6)).build(),
    ];

    let first = allocator.run(&calendar, today(), &[], candidates);
    assert_eq!(first.assignments.len(), 2);

    // 第一次结果落库后成为地面真值, 候选集为空
    let loads: Vec<AssignedLoad> = first
        .assignments
        .iter()
        .map(|(id, date)| make_load(id, *date, if id == "O1" { 60.0 } else { 50.0 }))
        .collect();

    let second = allocator.run(&calendar, today(), &loads, vec![]);
    assert!(second.assignments.is_empty());

    // 播种后的用量与第一次运行末态一致
    assert_eq!(second.used_by_day[&d(2026, 1, 5)], 60.0);
    assert_eq!(second.used_by_day[&d(2026, 1, 6)], 50.0);
}

#[test]
fn test_deterministic_regardless_of_input_order() {
    let calendar = plain_calendar(test_config());
    let allocator = Allocator::new(test_config());

    let build_set = || {
        vec![
            OrderBuilder::new("A").area(40.0).priority(2).intake(d(2026, 1, 1)).due(d(2026, 1, 6)).build(),
            OrderBuilder::new("B").area(40.0).priority(1).intake(d(2026, 1, 2)).due(d(2026, 1, 6)).build(),
            OrderBuilder::new("C").area(40.0).priority(1).intake(d(2026, 1, 1)).due(d(2026, 1, 6)).build(),
        ]
    };

    let forward = allocator.run(&calendar, today(), &[], build_set());
    let mut reversed_input = build_set();
    reversed_input.reverse();
    let reversed = allocator.run(&calendar, today(), &[], reversed_input);

    assert_eq!(forward.assignments, reversed.assignments);
}
