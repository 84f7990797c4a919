// ==========================================
// 葡萄采收决策系统 - 核心库
// ==========================================
// 系统定位: 决策支持系统 (采收与否由人工最终决定)
// 技术栈: Rust + SQLite
// 核心: 信号校正 → 决策树期望值 → 与立即采收基线比较
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 期望值计算
pub mod engine;

// 配置层 - 决策模型与系统配置
pub mod config;

// 数据仓储层 - 决策日志
pub mod repository;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 气象数据管道 - 校准参数来源
pub mod weather;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{RecommendedAction, Scenario, SugarSumPolicy, WineGrade};

// 领域实体
pub use domain::{
    BeliefInputs, CalibrationParams, DecisionBreakdown, DecisionLogEntry, DecisionResult,
    FeatureRow,
};

// 引擎
pub use engine::{DecisionError, ExpectedValueCalculator};

// 配置
pub use config::{ConfigManager, DecisionModel};

// API
pub use api::{DecisionApi, EvaluateDecisionRequest, EvaluateDecisionResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "葡萄采收决策系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
