// ==========================================
// 葡萄采收决策系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 决策引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    /// 输入越界或非有限值
    #[error("无效输入: {field}={value} ({reason})")]
    InvalidInput {
        field: String,
        value: f64,
        reason: String,
    },

    /// 领域常量配置非法（收入表/情景产量/基线）
    #[error("无效配置: {0}")]
    InvalidConfiguration(String),
}

impl DecisionError {
    pub fn invalid_input(field: &str, value: f64, reason: impl Into<String>) -> Self {
        DecisionError::InvalidInput {
            field: field.to_string(),
            value,
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, DecisionError>;
