// ==========================================
// 葡萄采收决策系统 - 输入校验器
// ==========================================
// 职责: 概率/校准参数范围校验 + 糖分概率和策略
// 红线: 越界输入必须显式报错,不得静默给出错误建议
// ==========================================

use crate::domain::decision::{BeliefInputs, CalibrationParams};
use crate::domain::types::SugarSumPolicy;
use crate::engine::error::{DecisionError, EngineResult};
use tracing::warn;

/// 糖分概率和允许的偏差
pub const SUGAR_SUM_TOLERANCE: f64 = 1e-6;

/// 校验单个概率值（有限且位于 [0,1]）
pub fn validate_probability(field: &str, value: f64) -> EngineResult<()> {
    if !value.is_finite() {
        return Err(DecisionError::invalid_input(field, value, "必须为有限数"));
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(DecisionError::invalid_input(field, value, "必须位于 [0, 1]"));
    }
    Ok(())
}

// ==========================================
// InputValidator - 输入校验器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct InputValidator {
    policy: SugarSumPolicy,
}

impl InputValidator {
    pub fn new(policy: SugarSumPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SugarSumPolicy {
        self.policy
    }

    /// 校验一次评估的全部输入
    ///
    /// 顺序:
    /// 1) 五个主观概率范围
    /// 2) sensitivity / specificity 范围
    /// 3) 糖分概率和（按策略 IGNORE / WARN / REJECT）
    pub fn validate(&self, beliefs: &BeliefInputs, calib: &CalibrationParams) -> EngineResult<()> {
        for (field, value) in beliefs.named_fields() {
            validate_probability(field, value)?;
        }

        validate_probability("sensitivity", calib.sensitivity)?;
        validate_probability("specificity", calib.specificity)?;

        self.check_sugar_sum(beliefs)
    }

    /// 糖分概率和检查（不做归一化）
    fn check_sugar_sum(&self, beliefs: &BeliefInputs) -> EngineResult<()> {
        let sum = beliefs.sugar_sum();
        if (sum - 1.0).abs() <= SUGAR_SUM_TOLERANCE {
            return Ok(());
        }

        match self.policy {
            SugarSumPolicy::Ignore => Ok(()),
            SugarSumPolicy::Warn => {
                warn!(sugar_sum = sum, "糖分概率之和不为 1,按原值计算");
                Ok(())
            }
            SugarSumPolicy::Reject => Err(DecisionError::invalid_input(
                "sugar_sum",
                sum,
                "三个糖分概率之和必须为 1",
            )),
        }
    }
}
