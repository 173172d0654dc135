// ==========================================
// CalendarService 引擎测试
// ==========================================
// 测试目标: 工作日判定、产能查询、交货窗口截止日、报表视野
// ==========================================


use test_helpers::{calendar_with_overrides, d, plain_calendar, test_config};

// 2026-01 参照: 1/5 周一, 1/9 周五, 1/10 周六, 1/11 周日, 1/12 周一

// ==========================================
// 工作日判定
// ==========================================

#[test]
fn test_weekday_default_rule() {
    let calendar = plain_calendar(test_config());

    assert!(calendar.is_business_day(d(2026, 1, 5))); // 周一
    assert!(calendar.is_business_day(d(2026, 1, 9))); // 周五
    assert!(!calendar.is_business_day(d(2026, 1, 10))); // 周六
    assert!(!calendar.is_business_day(d(2026, 1, 11))); // 周日
}

#[test]
fn test_override_beats_weekday_rule() {
    let calendar = calendar_with_overrides(
        test_config(),
        vec![
            (d(2026, 1, 10), true, None),  // 周六加班
            (d(2026, 1, 7), false, None),  // 周三停产
        ],
    );

    assert!(calendar.is_business_day(d(2026, 1, 10)));
    assert!(!calendar.is_business_day(d(2026, 1, 7)));
}

#[test]
fn test_next_business_day_skips_weekend_and_overrides() {
    let calendar = calendar_with_overrides(
        test_config(),
        vec![(d(2026, 1, 12), false, None)], // 下周一也停产
    );

    // 周五 -> 跳过周末和停产周一 -> 周二
    assert_eq!(calendar.next_business_day(d(2026, 1, 9)), d(2026, 1, 13));
    // 普通日 -> 次日
    assert_eq!(calendar.next_business_day(d(2026, 1, 5)), d(2026, 1, 6));
}

// ==========================================
// 产能查询
// ==========================================

#[test]
fn test_capacity_override_and_default() {
    let calendar = calendar_with_overrides(
        test_config(),
        vec![
            (d(2026, 1, 6), true, Some(50.0)),
            (d(2026, 1, 7), true, None), // 有覆盖但未指定产能
        ],
    );

    assert_eq!(calendar.capacity_for(d(2026, 1, 6)), 50.0);
    assert_eq!(calendar.capacity_for(d(2026, 1, 7)), 100.0); // 默认
    assert_eq!(calendar.capacity_for(d(2026, 1, 8)), 100.0); // 无覆盖
}

// ==========================================
// 交货窗口截止日
// ==========================================

#[test]
fn test_friday_deadline_is_following_tuesday() {
    let calendar = plain_calendar(test_config());

    // 周五紧邻周末间隔: +4 自然日 = 周二
    assert_eq!(
        calendar.delivery_window_deadline(d(2026, 1, 9)),
        d(2026, 1, 13)
    );
}

#[test]
fn test_friday_deadline_slides_when_tuesday_is_holiday() {
    let calendar = calendar_with_overrides(
        test_config(),
        vec![(d(2026, 1, 13), false, None)], // 周二停产
    );

    // +4 落在停产日, 顺延到周三
    assert_eq!(
        calendar.delivery_window_deadline(d(2026, 1, 9)),
        d(2026, 1, 14)
    );
}

#[test]
fn test_midweek_deadline_uses_business_day_window() {
    let calendar = plain_calendar(test_config());

    // 周三: 连取 2 个生产日 -> 周五
    assert_eq!(
        calendar.delivery_window_deadline(d(2026, 1, 7)),
        d(2026, 1, 9)
    );
    // 周四: 周五 + 下周一
    assert_eq!(
        calendar.delivery_window_deadline(d(2026, 1, 8)),
        d(2026, 1, 12)
    );
}

#[test]
fn test_long_gap_rule_applies_before_holiday_bridge() {
    // 周五 1/9 停产: 周四 1/8 之后连续三天非生产日
    let calendar = calendar_with_overrides(
        test_config(),
        vec![(d(2026, 1, 9), false, None)],
    );

    // 长间隔规则: 1/8 + 4 自然日 = 1/12 周一 (生产日, 不再顺延)
    assert_eq!(
        calendar.delivery_window_deadline(d(2026, 1, 8)),
        d(2026, 1, 12)
    );
}

// ==========================================
// 报表视野
// ==========================================

#[test]
fn test_build_horizon_from_business_day() {
    let calendar = plain_calendar(test_config());

    let horizon = calendar.build_horizon(5, d(2026, 1, 5));

    assert_eq!(
        horizon.days,
        vec![
            d(2026, 1, 5),
            d(2026, 1, 6),
            d(2026, 1, 7),
            d(2026, 1, 8),
            d(2026, 1, 9),
        ]
    );
    assert_eq!(horizon.overflow_key, d(2026, 1, 12));
    assert_eq!(horizon.last_day(), d(2026, 1, 9));
}

#[test]
fn test_build_horizon_rolls_forward_from_non_business_today() {
    let calendar = plain_calendar(test_config());

    // 周六启动: 视野从下周一开始
    let horizon = calendar.build_horizon(3, d(2026, 1, 10));

    assert_eq!(
        horizon.days,
        vec![d(2026, 1, 12), d(2026, 1, 13), d(2026, 1, 14)]
    );
    assert_eq!(horizon.overflow_key, d(2026, 1, 15));
}

#[test]
fn test_build_horizon_respects_override_for_today() {
    // 周一被覆盖为停产: 视野从周二开始
    let calendar = calendar_with_overrides(
        test_config(),
        vec![(d(2026, 1, 5), false, None)],
    );

    let horizon = calendar.build_horizon(2, d(2026, 1, 5));

    assert_eq!(horizon.days, vec![d(2026, 1, 6), d(2026, 1, 7)]);
}
