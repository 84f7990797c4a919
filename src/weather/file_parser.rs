// ==========================================
// 葡萄采收决策系统 - 气象文件解析器
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 按表头映射的原始行（表头统一转大写）
// ==========================================

use crate::weather::error::WeatherImportError;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始气象行
///
/// row_number 为文件中的行号（表头为第 1 行）
#[derive(Debug, Clone, PartialEq)]
pub struct RawWeatherRecord {
    pub row_number: usize,
    pub fields: HashMap<String, String>,
}

impl RawWeatherRecord {
    /// 读取字段（空串视为缺失）
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// 文件解析 Trait
pub trait WeatherFileParser {
    fn parse_to_raw_records(
        &self,
        file_path: &Path,
    ) -> Result<Vec<RawWeatherRecord>, WeatherImportError>;
}

fn ensure_exists(path: &Path) -> Result<(), WeatherImportError> {
    if !path.exists() {
        return Err(WeatherImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_uppercase()
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvWeatherParser;

impl WeatherFileParser for CsvWeatherParser {
    fn parse_to_raw_records(
        &self,
        file_path: &Path,
    ) -> Result<Vec<RawWeatherRecord>, WeatherImportError> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(WeatherImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let fields: HashMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.trim().to_string()))
                .collect();

            // 跳过完全空白的行
            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawWeatherRecord {
                row_number: idx + 2,
                fields,
            });
        }

        Ok(records)
    }
}

/// 单元格转文本,日期单元格输出 %Y-%m-%d
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::DateTimeIso(iso) => iso.split('T').next().unwrap_or(iso).to_string(),
        other => other.to_string(),
    }
}

// ==========================================
// Excel Parser（读取第一个工作表）
// ==========================================
pub struct ExcelWeatherParser;

impl WeatherFileParser for ExcelWeatherParser {
    fn parse_to_raw_records(
        &self,
        file_path: &Path,
    ) -> Result<Vec<RawWeatherRecord>, WeatherImportError> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(WeatherImportError::UnsupportedFormat(ext));
        }

        // 按扩展名选择 xlsx / xls 读取器
        let mut workbook = open_workbook_auto(file_path)
            .map_err(|e| WeatherImportError::ExcelParseError(e.to_string()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| WeatherImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| WeatherImportError::ExcelParseError(e.to_string()))?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| WeatherImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| normalize_header(&cell_to_string(cell)))
            .collect();

        let mut records = Vec::new();
        for (idx, data_row) in rows.enumerate() {
            let fields: HashMap<String, String> = headers
                .iter()
                .zip(data_row.iter())
                .map(|(h, cell)| (h.clone(), cell_to_string(cell).trim().to_string()))
                .collect();

            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawWeatherRecord {
                row_number: idx + 2,
                fields,
            });
        }

        Ok(records)
    }
}

// ==========================================
// 通用解析器（按扩展名分派）
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct UniversalWeatherParser;

impl WeatherFileParser for UniversalWeatherParser {
    fn parse_to_raw_records(
        &self,
        file_path: &Path,
    ) -> Result<Vec<RawWeatherRecord>, WeatherImportError> {
        match extension_of(file_path).as_str() {
            "csv" => CsvWeatherParser.parse_to_raw_records(file_path),
            "xlsx" | "xls" => ExcelWeatherParser.parse_to_raw_records(file_path),
            other => Err(WeatherImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_headers_are_uppercased() {
        let file = csv_file(&["date,prcp,Tmax,TMIN", "2020-09-01,0.1,80,60"]);

        let records = CsvWeatherParser.parse_to_raw_records(file.path()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].row_number, 2);
        assert_eq!(records[0].get("DATE"), Some("2020-09-01"));
        assert_eq!(records[0].get("TMAX"), Some("80"));
    }

    #[test]
    fn test_csv_skips_blank_rows_and_keeps_row_numbers() {
        let file = csv_file(&["DATE,PRCP", "2020-09-01,0.1", ",", "2020-09-02,"]);

        let records = CsvWeatherParser.parse_to_raw_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].row_number, 4);
        assert_eq!(records[1].get("PRCP"), None);
    }

    #[test]
    fn test_cell_to_string_dates_and_numbers() {
        assert_eq!(
            cell_to_string(&Data::DateTimeIso("2020-09-01T00:00:00".to_string())),
            "2020-09-01"
        );
        assert_eq!(cell_to_string(&Data::Float(0.1)), "0.1");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_missing_file() {
        let result = UniversalWeatherParser.parse_to_raw_records(Path::new("no_such_weather.csv"));
        assert!(matches!(result, Err(WeatherImportError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalWeatherParser.parse_to_raw_records(file.path());
        assert!(matches!(result, Err(WeatherImportError::UnsupportedFormat(_))));
    }
}
