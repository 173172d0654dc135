// ==========================================
// 产能分配排产系统 - 人工换排校验引擎
// ==========================================
// 红线: 校验不通过时零写入; 成功换排一律加人工锁
// ==========================================
// 职责: 校验并执行两组订单之间的排产日互换
// 输入: 两组互斥订单号 + 两个目标日期
// 输出: 结构化结果 (通过/拒绝), 拒绝不是异常
// ==========================================

use crate::config::ScheduleConfig;
use crate::engine::calendar_service::CalendarService;
use crate::engine::capacity_report::CapacityReportBuilder;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::OrderRepository;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// SwapRequest / SwapOutcome
// ==========================================

/// 换排请求: 把 origin 组移到 dest_date, dest 组移到 origin_date
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub origin_order_ids: Vec<String>,
    pub dest_order_ids: Vec<String>,
    pub origin_date: NaiveDate,
    pub dest_date: NaiveDate,
}

/// 换排结果
///
/// 拒绝是正常业务结局, 用值表达而非错误; 拒绝时保证零副作用
#[derive(Debug, Clone, PartialEq)]
pub enum SwapOutcome {
    /// 换排已执行, 全部涉及订单已加人工锁
    Applied {
        /// 目标日换排后的投影用量 (平方米)
        projected_m2: f64,
        /// 实际移动订单数
        moved_count: usize,
    },
    /// 目标日将超出容差上限, 未做任何改动
    Rejected {
        /// 目标日换排后的投影用量 (平方米)
        projected_m2: f64,
        /// 容差上限 (= 日历产能 + 换排容差)
        limit_m2: f64,
    },
}

// ==========================================
// SwapValidator - 换排校验器
// ==========================================

/// 人工换排校验器
///
/// 校验口径与产能报表一致: 目标日现状用量取自地面真值聚合,
/// 而不是任何内存副本。
pub struct SwapValidator {
    config: ScheduleConfig,
    order_repo: Arc<OrderRepository>,
    report_builder: Arc<CapacityReportBuilder>,
}

impl SwapValidator {
    /// 创建换排校验器
    pub fn new(
        config: ScheduleConfig,
        order_repo: Arc<OrderRepository>,
        report_builder: Arc<CapacityReportBuilder>,
    ) -> Self {
        Self {
            config,
            order_repo,
            report_builder,
        }
    }

    /// 校验并执行换排
    ///
    /// 流程:
    /// 1. 读取两组订单文档, 计算进入量与离开量
    /// 2. 从地面真值取目标日现状用量, 计算投影
    /// 3. 投影 > 日历产能 + 容差 => 拒绝 (零写入)
    /// 4. 否则单事务互换日期并全部加锁, 再局部刷新两日报表
    ///
    /// # 并发约束
    /// 与自动排产运行共用同一把外部互斥锁, 由调用方保证串行
    ///
    /// # 返回
    /// - Ok(SwapOutcome): 通过或拒绝
    /// - Err: 仓储访问失败 (无部分写入)
    pub fn execute(
        &self,
        calendar: &CalendarService,
        request: &SwapRequest,
    ) -> RepositoryResult<SwapOutcome> {
        // 两组订单号必须互斥
        let origin_set: HashSet<&String> = request.origin_order_ids.iter().collect();
        if request.dest_order_ids.iter().any(|id| origin_set.contains(id)) {
            return Err(RepositoryError::FieldValueError {
                field: "order_ids".to_string(),
                message: "换排两侧订单号存在交集".to_string(),
            });
        }

        // 步骤1: 读取文档, 计算进入/离开量 (面积缺失按 0 计)
        let origin_orders = self.order_repo.find_by_ids(&request.origin_order_ids)?;
        let dest_orders = self.order_repo.find_by_ids(&request.dest_order_ids)?;

        let entering_m2: f64 = origin_orders
            .iter()
            .map(|o| o.area_m2.unwrap_or(0.0))
            .sum();
        // 离开量只计当前确实排在目标日的订单, 防止前端传入
        // 过期集合时重复扣减
        let leaving_m2: f64 = dest_orders
            .iter()
            .filter(|o| o.assigned_date == Some(request.dest_date))
            .map(|o| o.area_m2.unwrap_or(0.0))
            .sum();

        // 步骤2: 地面真值现状 + 投影
        let current_m2 = self.report_builder.current_usage(request.dest_date)?;
        let projected_m2 = current_m2 + entering_m2 - leaving_m2;
        let limit_m2 = calendar.capacity_for(request.dest_date) + self.config.swap_tolerance_m2;

        info!(
            dest_date = %request.dest_date,
            current_m2,
            entering_m2,
            leaving_m2,
            projected_m2,
            limit_m2,
            "换排校验"
        );

        // 步骤3: 超限拒绝, 零写入
        if projected_m2 > limit_m2 {
            warn!(
                dest_date = %request.dest_date,
                projected_m2,
                limit_m2,
                "换排被拒绝: 目标日将超出容差上限"
            );
            return Ok(SwapOutcome::Rejected {
                projected_m2,
                limit_m2,
            });
        }

        // 步骤4: 单事务互换并加人工锁
        let mut assignments: BTreeMap<String, NaiveDate> = BTreeMap::new();
        for id in &request.origin_order_ids {
            assignments.insert(id.clone(), request.dest_date);
        }
        for id in &request.dest_order_ids {
            assignments.insert(id.clone(), request.origin_date);
        }

        let moved_count = self
            .order_repo
            .batch_set_assigned_date_and_pin(&assignments)?;

        // 步骤5: 仅刷新涉及的两日报表
        self.report_builder
            .refresh_for_dates(calendar, &[request.origin_date, request.dest_date])?;

        info!(moved_count, "换排已执行并加锁");

        Ok(SwapOutcome::Applied {
            projected_m2,
            moved_count,
        })
    }
}
