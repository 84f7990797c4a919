// ==========================================
// 葡萄采收决策系统 - API 数据传输对象
// ==========================================

use crate::domain::decision::{BeliefInputs, CalibrationParams, DecisionBreakdown, DecisionResult};
use crate::domain::types::SugarSumPolicy;
use serde::{Deserialize, Serialize};

/// 评估请求
///
/// 未给出的字段取配置中的默认值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluateDecisionRequest {
    pub prob_storm: Option<f64>,
    pub prob_botrytis: Option<f64>,
    pub prob_no_sugar: Option<f64>,
    pub prob_typical_sugar: Option<f64>,
    pub prob_high_sugar: Option<f64>,
    pub sensitivity: Option<f64>,
    pub specificity: Option<f64>,

    /// 是否写入决策日志
    #[serde(default)]
    pub record: bool,
    /// 操作人（写日志时使用,缺省 "system"）
    pub actor: Option<String>,
}

impl EvaluateDecisionRequest {
    /// 以默认值补齐主观概率
    pub fn resolve_beliefs(&self, defaults: &BeliefInputs) -> BeliefInputs {
        BeliefInputs {
            prob_storm: self.prob_storm.unwrap_or(defaults.prob_storm),
            prob_botrytis: self.prob_botrytis.unwrap_or(defaults.prob_botrytis),
            prob_no_sugar: self.prob_no_sugar.unwrap_or(defaults.prob_no_sugar),
            prob_typical_sugar: self.prob_typical_sugar.unwrap_or(defaults.prob_typical_sugar),
            prob_high_sugar: self.prob_high_sugar.unwrap_or(defaults.prob_high_sugar),
        }
    }

    /// 以默认值补齐校准参数
    pub fn resolve_calibration(&self, defaults: &CalibrationParams) -> CalibrationParams {
        CalibrationParams {
            sensitivity: self.sensitivity.unwrap_or(defaults.sensitivity),
            specificity: self.specificity.unwrap_or(defaults.specificity),
        }
    }
}

/// 评估响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateDecisionResponse {
    // ===== 实际使用的输入 =====
    pub beliefs: BeliefInputs,
    pub calibration: CalibrationParams,

    // ===== 结论 =====
    pub result: DecisionResult,
    pub breakdown: DecisionBreakdown,

    // ===== 展示文本（当前语言） =====
    pub e_value_text: String,
    pub action_text: String,

    /// 写入日志时的记录ID
    pub decision_id: Option<String>,
}

/// 默认值快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionDefaultsResponse {
    pub beliefs: BeliefInputs,
    pub calibration: CalibrationParams,
    pub baseline: f64,
    pub sugar_sum_policy: SugarSumPolicy,
}
