// ==========================================
// 葡萄采收决策系统 - 决策输入/输出领域模型
// ==========================================
// 依据: 决策模型说明 - BeliefInputs / CalibrationParams / DecisionResult
// 红线: 全部为不可变值类型,单次计算内有效
// ==========================================

use crate::domain::types::{RecommendedAction, Scenario};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// BeliefInputs - 主观概率输入
// ==========================================
// 默认值即酿酒师初始判断（原滑块初始值）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefInputs {
    pub prob_storm: f64,          // 风暴概率
    pub prob_botrytis: f64,       // 风暴后贵腐菌概率
    pub prob_no_sugar: f64,       // 无风暴: 糖分不增加
    pub prob_typical_sugar: f64,  // 无风暴: 糖分正常增加
    pub prob_high_sugar: f64,     // 无风暴: 糖分大幅增加
}

impl BeliefInputs {
    pub fn new(
        prob_storm: f64,
        prob_botrytis: f64,
        prob_no_sugar: f64,
        prob_typical_sugar: f64,
        prob_high_sugar: f64,
    ) -> Self {
        Self {
            prob_storm,
            prob_botrytis,
            prob_no_sugar,
            prob_typical_sugar,
            prob_high_sugar,
        }
    }

    /// 三个糖分概率之和（不做归一）
    pub fn sugar_sum(&self) -> f64 {
        self.prob_no_sugar + self.prob_typical_sugar + self.prob_high_sugar
    }

    /// 字段名与取值列表,用于校验与审计
    pub fn named_fields(&self) -> [(&'static str, f64); 5] {
        [
            ("prob_storm", self.prob_storm),
            ("prob_botrytis", self.prob_botrytis),
            ("prob_no_sugar", self.prob_no_sugar),
            ("prob_typical_sugar", self.prob_typical_sugar),
            ("prob_high_sugar", self.prob_high_sugar),
        ]
    }
}

impl Default for BeliefInputs {
    /// storm=0.5, botrytis=0.1, no/typical/high sugar = 0.6/0.3/0.1
    fn default() -> Self {
        Self::new(0.5, 0.1, 0.6, 0.3, 0.1)
    }
}

// ==========================================
// CalibrationParams - 风暴预测信号校准参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParams {
    pub sensitivity: f64, // 真阳性率
    pub specificity: f64, // 真阴性率
}

impl CalibrationParams {
    pub const DEFAULT_SENSITIVITY: f64 = 0.83;
    pub const DEFAULT_SPECIFICITY: f64 = 0.87;

    pub fn new(sensitivity: f64, specificity: f64) -> Self {
        Self {
            sensitivity,
            specificity,
        }
    }

    /// 理想信号（sensitivity = specificity = 1）
    pub fn perfect() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SENSITIVITY, Self::DEFAULT_SPECIFICITY)
    }
}

// ==========================================
// DecisionResult - 决策结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub expected_value: f64,        // 期望值（货币单位,不做取整）
    pub action: RecommendedAction,  // 建议动作
}

// ==========================================
// DecisionBreakdown - 决策树分解（可解释性）
// ==========================================
// 每个中间量都保留,便于解释"为什么是这个建议"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionBreakdown {
    // ===== 信号校正 =====
    pub corrected_storm: f64,
    pub corrected_no_storm: f64,

    // ===== 情景收入 =====
    pub scenario_revenues: BTreeMap<Scenario, f64>,
    pub storm_revenue: f64,     // 按贵腐概率混合后的风暴分支收入
    pub no_storm_revenue: f64,  // 按糖分概率混合后的无风暴分支收入

    // ===== 分支贡献 =====
    pub storm_contribution: f64,
    pub no_storm_contribution: f64,

    // ===== 结论 =====
    pub expected_value: f64,
    pub baseline: f64,
    pub margin: f64, // expected_value - baseline
    pub action: RecommendedAction,
}

impl DecisionBreakdown {
    pub fn result(&self) -> DecisionResult {
        DecisionResult {
            expected_value: self.expected_value,
            action: self.action,
        }
    }
}
