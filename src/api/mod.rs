// ==========================================
// 葡萄采收决策系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI 等展示适配器调用
// ==========================================

pub mod decision_api;
pub mod dto;
pub mod error;

// 重导出核心类型
pub use decision_api::DecisionApi;
pub use dto::{DecisionDefaultsResponse, EvaluateDecisionRequest, EvaluateDecisionResponse};
pub use error::{ApiError, ApiResult};
