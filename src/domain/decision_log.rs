// ==========================================
// 葡萄采收决策系统 - 决策日志领域模型
// ==========================================
// 用途: 审计追踪,每次经 API 的评估都可落库
// 对齐: decision_log 表
// ==========================================

use crate::domain::decision::{BeliefInputs, CalibrationParams, DecisionResult};
use crate::domain::types::RecommendedAction;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// DecisionLogEntry - 决策日志
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    // ===== 主键 =====
    pub decision_id: String,          // 日志ID (UUID v4)
    pub decided_at: NaiveDateTime,    // 评估时间 (UTC)
    pub actor: String,                // 操作人

    // ===== 输入 =====
    pub beliefs: BeliefInputs,
    pub calibration: CalibrationParams,

    // ===== 输出 =====
    pub expected_value: f64,
    pub action: RecommendedAction,
    pub baseline: f64, // 评估时使用的基线
}

impl DecisionLogEntry {
    /// 由一次评估结果构造日志条目
    pub fn new(
        actor: &str,
        beliefs: BeliefInputs,
        calibration: CalibrationParams,
        result: &DecisionResult,
        baseline: f64,
    ) -> Self {
        Self {
            decision_id: Uuid::new_v4().to_string(),
            decided_at: Utc::now().naive_utc(),
            actor: actor.to_string(),
            beliefs,
            calibration,
            expected_value: result.expected_value,
            action: result.action,
            baseline,
        }
    }
}
