// ==========================================
// 产能分配排产系统 - 生产订单领域模型
// ==========================================
// 红线: pinned=true 后自动排产不得改动 assigned_date
// ==========================================

use crate::domain::types::OrderStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ProductionOrder - 生产订单
// ==========================================
// 来源: 上游导入层写入, 核心层只改 assigned_date / pinned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    // ===== 主键 =====
    pub order_id: String,               // 订单号 (OP), 上游保证唯一

    // ===== 排产输入 =====
    pub area_m2: Option<f64>,           // 订单面积 (平方米), 缺失则跳过候选
    pub intake_date: Option<NaiveDate>, // 录入日期 (FIFO 次序依据)
    pub delivery_due_date: Option<NaiveDate>, // 交货期, 缺失则跳过候选
    pub priority: i64,                  // 优先级, 数值小者先排

    // ===== 排产输出 =====
    pub assigned_date: Option<NaiveDate>, // 排产日期, NULL = 未排
    pub pinned: bool,                     // 人工锁定标志 (换排后置位)

    // ===== 状态 =====
    pub status: OrderStatus,            // 订单状态 (上游推导)
}

impl ProductionOrder {
    /// 候选合法性检查
    ///
    /// # 返回
    /// - `Ok(())`: 字段齐全, 可参与排产
    /// - `Err(reason)`: 缺失字段说明 (调用方记录 warning 后跳过)
    pub fn validate_candidate(&self) -> Result<(), String> {
        if self.area_m2.is_none() {
            return Err("缺失订单面积 area_m2".to_string());
        }
        if self.delivery_due_date.is_none() {
            return Err("缺失交货期 delivery_due_date".to_string());
        }
        Ok(())
    }
}

// ==========================================
// AssignedLoad - 已占用产能记录
// ==========================================
// 用途: Allocator 播种 / 报表聚合的地面真值输入
#[derive(Debug, Clone)]
pub struct AssignedLoad {
    pub order_id: String,
    pub assigned_date: NaiveDate,
    pub area_m2: f64,
}
