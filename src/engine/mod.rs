// ==========================================
// 葡萄采收决策系统 - 引擎层
// ==========================================
// 职责: 决策规则计算,不拼 SQL
// 红线: 所有结论必须可分解解释
// ==========================================

pub mod calibration;
pub mod error;
pub mod expected_value;
pub mod validation;

// 重导出核心引擎
pub use calibration::calibration_from_counts;
pub use error::{DecisionError, EngineResult};
pub use expected_value::{correct_storm_probability, ExpectedValueCalculator};
pub use validation::{validate_probability, InputValidator};
