// ==========================================
// 产能分配排产系统 - 产能报表引擎
// ==========================================
// 红线: 报表永远从订单地面真值重算, 不复用分配引擎的内存增量
// ==========================================
// 职责: 聚合各视野日的实际占用, 生成并落库产能快照
// 用途: 可视化图表 + 人工换排校验
// ==========================================

use crate::domain::capacity::{CapacitySnapshot, ReportHorizon};
use crate::engine::calendar_service::CalendarService;
use crate::repository::error::RepositoryResult;
use crate::repository::{CapacityReportRepository, OrderRepository};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

// ==========================================
// CapacityReportBuilder - 产能报表构建器
// ==========================================

/// 产能报表构建器
///
/// 所有用量均通过数据库聚合取得 (地面真值), 因此即使发生过
/// 带外人工改库, 重建后的报表也不会与订单脱节。
pub struct CapacityReportBuilder {
    order_repo: Arc<OrderRepository>,
    report_repo: Arc<CapacityReportRepository>,
}

impl CapacityReportBuilder {
    /// 创建报表构建器
    pub fn new(
        order_repo: Arc<OrderRepository>,
        report_repo: Arc<CapacityReportRepository>,
    ) -> Self {
        Self {
            order_repo,
            report_repo,
        }
    }

    /// 查询某日当前实际占用 (平方米)
    ///
    /// 人工换排校验复用此口径, 保证校验与报表一致
    pub fn current_usage(&self, date: NaiveDate) -> RepositoryResult<f64> {
        let (used, _count) = self.order_repo.aggregate_area_for_date(date)?;
        Ok(used)
    }

    /// 按视野构建完整报表行集合 (不落库)
    ///
    /// - 每个视野日: total = 日历产能, used = 地面真值聚合
    /// - 溢出行: 仅在视野外存在占用时生成, total = used (余量恒 0)
    pub fn build_snapshots(
        &self,
        calendar: &CalendarService,
        horizon: &ReportHorizon,
    ) -> RepositoryResult<Vec<CapacitySnapshot>> {
        let mut snapshots = Vec::with_capacity(horizon.days.len() + 1);

        for day in &horizon.days {
            let (used, count) = self.order_repo.aggregate_area_for_date(*day)?;
            snapshots.push(CapacitySnapshot::for_day(
                *day,
                calendar.capacity_for(*day),
                used,
                count,
            ));
        }

        let (overflow_used, overflow_count) =
            self.order_repo.aggregate_area_beyond(horizon.last_day())?;
        if overflow_used > 0.0 {
            snapshots.push(CapacitySnapshot::for_overflow(
                horizon.overflow_key,
                overflow_used,
                overflow_count,
            ));
        }

        Ok(snapshots)
    }

    /// 整体重建报表 (构建 + 全量替换落库)
    ///
    /// # 返回
    /// - Ok(Vec<CapacitySnapshot>): 落库后的报表行
    pub fn rebuild_all(
        &self,
        calendar: &CalendarService,
        horizon: &ReportHorizon,
    ) -> RepositoryResult<Vec<CapacitySnapshot>> {
        let snapshots = self.build_snapshots(calendar, horizon)?;
        self.report_repo.replace_all(&snapshots)?;

        info!(row_count = snapshots.len(), "产能报表已整体重建");
        Ok(snapshots)
    }

    /// 按日期局部重建报表 (人工换排后的两日刷新)
    ///
    /// # 参数
    /// - calendar: 日历服务
    /// - dates: 需要刷新的日期集合
    pub fn refresh_for_dates(
        &self,
        calendar: &CalendarService,
        dates: &[NaiveDate],
    ) -> RepositoryResult<()> {
        let mut snapshots = Vec::with_capacity(dates.len());
        for date in dates {
            let (used, count) = self.order_repo.aggregate_area_for_date(*date)?;
            snapshots.push(CapacitySnapshot::for_day(
                *date,
                calendar.capacity_for(*date),
                used,
                count,
            ));
        }

        self.report_repo.replace_for_dates(dates, &snapshots)?;

        info!(dates = ?dates, "产能报表已局部刷新");
        Ok(())
    }
}
