// ==========================================
// 葡萄采收决策系统 - 数据仓储层
// ==========================================
// 职责: 数据访问,不含业务逻辑
// 存储: SQLite (decision_log 表)
// ==========================================

pub mod decision_log_repo;
pub mod error;

pub use decision_log_repo::DecisionLogRepository;
pub use error::{RepositoryError, RepositoryResult};
