// ==========================================
// 葡萄采收决策系统 - 气象数据导入错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 气象数据导入/处理错误类型
#[derive(Error, Debug)]
pub enum WeatherImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 数据映射错误 =====
    #[error("缺少必需列: {0}")]
    MissingColumn(String),

    #[error("日期格式错误 (行 {row}): 期望 YYYY-MM-DD，实际 {value}")]
    DateFormatError { row: usize, value: String },

    #[error("类型转换失败 (行 {row}, 字段 {field}): {value}")]
    TypeConversionError {
        row: usize,
        field: String,
        value: String,
    },

    // ===== 数据集错误 =====
    #[error("无效参数: {0}")]
    InvalidParameter(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for WeatherImportError {
    fn from(err: std::io::Error) -> Self {
        WeatherImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for WeatherImportError {
    fn from(err: csv::Error) -> Self {
        WeatherImportError::CsvParseError(err.to_string())
    }
}
