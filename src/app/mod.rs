// ==========================================
// 葡萄采收决策系统 - 应用层
// ==========================================
// 职责: 装配共享状态,供 CLI 调用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
