// ==========================================
// 葡萄采收决策系统 - 应用状态
// ==========================================
// 职责: 打开共享连接,装配配置/仓储/API
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::DecisionApi;
use crate::config::config_manager::ConfigManager;
use crate::db::{open_in_memory_connection, open_sqlite_connection};
use crate::repository::decision_log_repo::DecisionLogRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "HARVEST_DECISION_DB_PATH";

/// 应用状态
///
/// 配置管理器与决策日志仓储共享同一连接
pub struct AppState {
    pub db_path: String,
    pub config_manager: Arc<ConfigManager>,
    pub decision_log_repo: Arc<DecisionLogRepository>,
    pub decision_api: Arc<DecisionApi>,
}

impl AppState {
    /// 打开数据库文件并装配
    ///
    /// # 返回
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        Self::from_connection(db_path, conn)
    }

    /// 内存库（一次性评估,不保留历史）
    pub fn in_memory() -> Result<Self, String> {
        let conn = open_in_memory_connection().map_err(|e| format!("无法打开内存数据库: {}", e))?;
        Self::from_connection(":memory:".to_string(), conn)
    }

    fn from_connection(db_path: String, conn: Connection) -> Result<Self, String> {
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let decision_log_repo = Arc::new(DecisionLogRepository::new(conn));

        let decision_api = Arc::new(DecisionApi::new(
            config_manager.clone(),
            Some(decision_log_repo.clone()),
        ));

        Ok(Self {
            db_path,
            config_manager,
            decision_log_repo,
            decision_api,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./harvest_decision.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("harvest-decision");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("harvest_decision.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
    }

    #[test]
    fn test_app_state_opens_file_db() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();

        assert_eq!(state.db_path, db_path);
        assert_eq!(state.decision_log_repo.count().unwrap(), 0);
    }

    #[test]
    fn test_in_memory_state() {
        let state = AppState::in_memory().unwrap();
        assert_eq!(state.db_path, ":memory:");
    }
}
