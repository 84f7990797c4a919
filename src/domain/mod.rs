// ==========================================
// 葡萄采收决策系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod decision;
pub mod decision_log;
pub mod types;
pub mod weather;

// 重导出核心类型
pub use decision::{BeliefInputs, CalibrationParams, DecisionBreakdown, DecisionResult};
pub use decision_log::DecisionLogEntry;
pub use types::{RecommendedAction, Scenario, SugarSumPolicy, WineGrade};
pub use weather::{DailyWeather, FeatureRow, WeeklyWeather};
