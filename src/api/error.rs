// ==========================================
// 葡萄采收决策系统 - API层错误类型
// ==========================================
// 职责: 汇总引擎/仓储/配置错误,给出可读的错误消息
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::engine::error::DecisionError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入/模型错误
    // ==========================================
    #[error("无效输入: field={field}, value={value}, 原因: {reason}")]
    InvalidInput {
        field: String,
        value: f64,
        reason: String,
    },

    #[error("决策模型配置无效: {0}")]
    InvalidConfiguration(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 DecisionError 转换
// ==========================================
impl From<DecisionError> for ApiError {
    fn from(err: DecisionError) -> Self {
        match err {
            DecisionError::InvalidInput {
                field,
                value,
                reason,
            } => ApiError::InvalidInput {
                field,
                value,
                reason,
            },
            DecisionError::InvalidConfiguration(msg) => ApiError::InvalidConfiguration(msg),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::DuplicateDecision(msg) => {
                ApiError::DatabaseError(format!("决策记录重复: {}", msg))
            }
            RepositoryError::InvalidStoredValue { field, message } => {
                ApiError::ValidationError(format!("字段{}错误: {}", field, message))
            }
        }
    }
}

// ==========================================
// 从配置读取错误转换（DecisionConfigReader 返回装箱错误）
// ==========================================
impl From<Box<dyn std::error::Error + Send + Sync>> for ApiError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        match err.downcast::<DecisionError>() {
            Ok(decision_err) => ApiError::from(*decision_err),
            Err(other) => ApiError::ConfigError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
