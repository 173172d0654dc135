// ==========================================
// 产能分配排产系统 - 排产配置
// ==========================================
// 职责: 配置加载、查询、快照
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::domain::types::OrderStatus;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 默认常量 (与现场运行参数一致)
// ==========================================

/// 默认单日产能 (平方米)
pub const DEFAULT_DAILY_CAPACITY_M2: f64 = 180_000.0;

/// 软关闭阈值 (平方米): 达到后当日不再接收新候选
pub const DEFAULT_SOFT_CLOSE_THRESHOLD_M2: f64 = 165_000.0;

/// 交货窗口 (工作日数)
pub const DEFAULT_DELIVERY_WINDOW_DAYS: u32 = 2;

/// 长间隔跨度 (自然日数): 多日停产间隔前最后一个工作日适用
pub const DEFAULT_LONG_GAP_SPAN_DAYS: i64 = 4;

/// 报表视野 (工作日数)
pub const DEFAULT_REPORT_HORIZON_DAYS: usize = 5;

/// 换排容差 (平方米): 仅人工换排校验使用
pub const DEFAULT_SWAP_TOLERANCE_M2: f64 = 10_000.0;

// ==========================================
// ScheduleConfig - 排产配置值
// ==========================================
// 构造一次, 注入 CalendarService / Allocator /
// CapacityReportBuilder / SwapValidator, 不做全局单例
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// 默认单日产能 (平方米), 无日历覆盖时生效
    pub default_daily_capacity_m2: f64,
    /// 软关闭阈值 (平方米), 低于满产能以预留余量
    pub soft_close_threshold_m2: f64,
    /// 交货窗口 (工作日数)
    pub delivery_window_days: u32,
    /// 长间隔跨度 (自然日数)
    pub long_gap_span_days: i64,
    /// 报表视野 (工作日数)
    pub report_horizon_days: usize,
    /// 换排容差 (平方米)
    pub swap_tolerance_m2: f64,
    /// 可自动排产的订单状态集合
    pub schedulable_statuses: Vec<OrderStatus>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_daily_capacity_m2: DEFAULT_DAILY_CAPACITY_M2,
            soft_close_threshold_m2: DEFAULT_SOFT_CLOSE_THRESHOLD_M2,
            delivery_window_days: DEFAULT_DELIVERY_WINDOW_DAYS,
            long_gap_span_days: DEFAULT_LONG_GAP_SPAN_DAYS,
            report_horizon_days: DEFAULT_REPORT_HORIZON_DAYS,
            swap_tolerance_m2: DEFAULT_SWAP_TOLERANCE_M2,
            schedulable_statuses: OrderStatus::schedulable_set(),
        }
    }
}

impl ScheduleConfig {
    /// 配置快照 (JSON 字符串)
    ///
    /// # 用途
    /// - 每次排产运行开始时记入日志, 便于复盘运行参数
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// ==========================================
// ConfigStore - 配置加载器
// ==========================================
pub struct ConfigStore {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigStore {
    /// 从已有连接创建 ConfigStore
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值 (scope_id='global')
    ///
    /// # 参数
    /// - key: 配置键
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取可解析的数值配置, 解析失败回落默认值
    fn get_parsed_or<T: std::str::FromStr>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T, Box<dyn Error>> {
        match self.get_config_value(key)? {
            Some(raw) => Ok(raw.trim().parse::<T>().unwrap_or(default)),
            None => Ok(default),
        }
    }

    /// 加载完整排产配置 (缺失项回落默认常量)
    ///
    /// # 返回
    /// - Ok(ScheduleConfig): 合并覆盖后的配置
    /// - Err: 数据库访问失败
    pub fn load_schedule_config(&self) -> Result<ScheduleConfig, Box<dyn Error>> {
        let defaults = ScheduleConfig::default();

        Ok(ScheduleConfig {
            default_daily_capacity_m2: self.get_parsed_or(
                "schedule/default_daily_capacity_m2",
                defaults.default_daily_capacity_m2,
            )?,
            soft_close_threshold_m2: self.get_parsed_or(
                "schedule/soft_close_threshold_m2",
                defaults.soft_close_threshold_m2,
            )?,
            delivery_window_days: self.get_parsed_or(
                "schedule/delivery_window_days",
                defaults.delivery_window_days,
            )?,
            long_gap_span_days: self.get_parsed_or(
                "schedule/long_gap_span_days",
                defaults.long_gap_span_days,
            )?,
            report_horizon_days: self.get_parsed_or(
                "schedule/report_horizon_days",
                defaults.report_horizon_days,
            )?,
            swap_tolerance_m2: self.get_parsed_or(
                "schedule/swap_tolerance_m2",
                defaults.swap_tolerance_m2,
            )?,
            schedulable_statuses: defaults.schedulable_statuses,
        })
    }
}
