// ==========================================
// 葡萄采收决策系统 - 信号校准推导
// ==========================================
// 职责: 由降水分类器的混淆矩阵推导 sensitivity / specificity
// 输入: TP / FN / TN / FP
// 输出: CalibrationParams
// ==========================================

use crate::domain::decision::CalibrationParams;
use crate::engine::error::{DecisionError, EngineResult};

/// 由混淆矩阵计数推导校准参数
///
/// - sensitivity = TP / (TP + FN)
/// - specificity = TN / (TN + FP)
///
/// 正类或负类样本为 0 时无法定义,返回 InvalidInput
pub fn calibration_from_counts(
    true_positive: u64,
    false_negative: u64,
    true_negative: u64,
    false_positive: u64,
) -> EngineResult<CalibrationParams> {
    let positives = true_positive + false_negative;
    let negatives = true_negative + false_positive;

    if positives == 0 {
        return Err(DecisionError::invalid_input(
            "positives",
            0.0,
            "无正类样本,sensitivity 未定义",
        ));
    }
    if negatives == 0 {
        return Err(DecisionError::invalid_input(
            "negatives",
            0.0,
            "无负类样本,specificity 未定义",
        ));
    }

    Ok(CalibrationParams::new(
        true_positive as f64 / positives as f64,
        true_negative as f64 / negatives as f64,
    ))
}
