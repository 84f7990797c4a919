// ==========================================
// 葡萄采收决策系统 - 配置层
// ==========================================
// 职责: 决策模型常量 + 系统配置管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod decision_config_trait;
pub mod decision_model;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use decision_config_trait::DecisionConfigReader;
pub use decision_model::{
    DecisionModel, RevenueTable, ScenarioCaseCounts, DEFAULT_BASELINE, DEFAULT_BOTTLES_PER_CASE,
};
