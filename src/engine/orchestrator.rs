// ==========================================
// 产能分配排产系统 - 引擎编排器
// ==========================================
// 用途: 协调一次完整排产运行的读-算-写流程
// ==========================================
// 一次运行 = 快照读取 -> 内存计算 -> 单次批量写入 -> 报表重建
// 并发约束: 同一仓储上的排产运行与人工换排必须由调用方
// 以外部互斥 (单工作者/串行队列/咨询锁) 保证串行, 本层不加锁
// ==========================================

use crate::config::ScheduleConfig;
use crate::domain::capacity::{CapacitySnapshot, ReportHorizon};
use crate::engine::allocator::Allocator;
use crate::engine::calendar_service::CalendarService;
use crate::engine::capacity_report::CapacityReportBuilder;
use crate::engine::repositories::SchedulingRepositories;
use crate::engine::swap_validator::{SwapOutcome, SwapRequest, SwapValidator};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// ==========================================
// ScheduleRunResult - 运行结果
// ==========================================

#[derive(Debug, Clone)]
pub struct ScheduleRunResult {
    /// 运行标识 (日志追踪用)
    pub run_id: Uuid,
    /// 本次新分配订单数
    pub assigned_count: usize,
    /// 因字段缺失被跳过的候选数
    pub skipped_count: usize,
    /// 本次运行的报表视野
    pub horizon: ReportHorizon,
    /// 重建后的报表行
    pub snapshots: Vec<CapacitySnapshot>,
}

// ==========================================
// ScheduleOrchestrator - 排产编排器
// ==========================================

pub struct ScheduleOrchestrator {
    config: ScheduleConfig,
    repos: SchedulingRepositories,
    report_builder: Arc<CapacityReportBuilder>,
}

impl ScheduleOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - config: 排产配置 (构造一次, 注入各引擎)
    /// - repos: 仓储集合
    pub fn new(config: ScheduleConfig, repos: SchedulingRepositories) -> Self {
        let report_builder = Arc::new(CapacityReportBuilder::new(
            repos.order_repo.clone(),
            repos.report_repo.clone(),
        ));

        Self {
            config,
            repos,
            report_builder,
        }
    }

    /// 执行一次完整排产运行
    ///
    /// 流程:
    /// 1. 读取日历覆盖, 构建日历服务
    /// 2. 读取候选订单与已占用产能地面真值
    /// 3. 内存计算完整分配映射
    /// 4. 单事务批量写入排产日期 (只写 assigned_date, 不动 pinned)
    /// 5. 整体重建产能报表
    ///
    /// 无新候选时分配映射为空, 跳过写入 —— 重复运行幂等
    ///
    /// # 参数
    /// - today: 当前日期 (调用方注入, 测试可复现)
    pub fn run_scheduling_cycle(&self, today: NaiveDate) -> RepositoryResult<ScheduleRunResult> {
        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            %today,
            config = %self.config.snapshot_json(),
            "开始排产运行"
        );

        // 步骤1: 日历
        let overrides = self.repos.calendar_repo.fetch_all_overrides()?;
        let calendar = CalendarService::new(overrides, self.config.clone());

        // 步骤2: 快照读取
        let candidates = self
            .repos
            .order_repo
            .fetch_schedulable_candidates(&self.config.schedulable_statuses)?;
        let loads = self.repos.order_repo.fetch_assigned_loads()?;

        // 步骤3: 内存计算
        let allocator = Allocator::new(self.config.clone());
        let outcome = allocator.run(&calendar, today, &loads, candidates);

        // 步骤4: 单次批量写入 (空映射零写入)
        if !outcome.assignments.is_empty() {
            let updated = self
                .repos
                .order_repo
                .batch_set_assigned_date(&outcome.assignments)?;
            info!(%run_id, updated, "排产日期已批量写入");
        } else {
            info!(%run_id, "无新候选, 跳过写入");
        }

        // 步骤5: 报表整体重建 (地面真值聚合)
        let snapshots = self.report_builder.rebuild_all(&calendar, &outcome.horizon)?;

        info!(
            %run_id,
            assigned_count = outcome.assignments.len(),
            skipped_count = outcome.skipped_orders.len(),
            "排产运行结束"
        );

        Ok(ScheduleRunResult {
            run_id,
            assigned_count: outcome.assignments.len(),
            skipped_count: outcome.skipped_orders.len(),
            horizon: outcome.horizon,
            snapshots,
        })
    }

    /// 执行一次人工换排 (校验 + 互换 + 局部报表刷新)
    ///
    /// 与 run_scheduling_cycle 共用同一把外部互斥锁
    pub fn execute_swap(&self, request: &SwapRequest) -> RepositoryResult<SwapOutcome> {
        let overrides = self.repos.calendar_repo.fetch_all_overrides()?;
        let calendar = CalendarService::new(overrides, self.config.clone());

        let validator = SwapValidator::new(
            self.config.clone(),
            self.repos.order_repo.clone(),
            self.report_builder.clone(),
        );

        validator.execute(&calendar, request)
    }

    /// 报表构建器 (适配层只读访问)
    pub fn report_builder(&self) -> &Arc<CapacityReportBuilder> {
        &self.report_builder
    }
}
