// ==========================================
// 葡萄采收决策系统 - 气象数据管道
// ==========================================
// 职责: 气象文件加载 → 周度特征 → 分类评估 → 校准参数
// ==========================================

pub mod error;
pub mod features;
pub mod file_parser;
pub mod loader;
pub mod metrics;

pub use error::WeatherImportError;
pub use features::{
    aggregate_weekly, build_dataset, build_feature_rows, chronological_split, HARVEST_WEEKS,
    RAIN_THRESHOLD,
};
pub use file_parser::{
    CsvWeatherParser, ExcelWeatherParser, RawWeatherRecord, UniversalWeatherParser,
    WeatherFileParser,
};
pub use loader::{merge_daily, records_to_daily, WeatherLoader};
pub use metrics::{
    evaluate_classifier, ClassMetrics, ClassificationReport, ConfusionMatrix,
    MovingAverageBaseline, PrecipitationClassifier,
};
