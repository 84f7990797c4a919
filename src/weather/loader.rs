// ==========================================
// 葡萄采收决策系统 - 气象数据加载器
// ==========================================
// 职责: 文件 → 原始行 → DailyWeather
// 必需列: DATE / PRCP / TMAX / TMIN
// ==========================================

use crate::domain::weather::DailyWeather;
use crate::weather::error::WeatherImportError;
use crate::weather::file_parser::{RawWeatherRecord, UniversalWeatherParser, WeatherFileParser};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

pub const REQUIRED_COLUMNS: [&str; 4] = ["DATE", "PRCP", "TMAX", "TMIN"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

#[derive(Debug, Clone, Copy)]
pub struct WeatherLoader {
    parser: UniversalWeatherParser,
}

impl Default for WeatherLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherLoader {
    pub fn new() -> Self {
        Self {
            parser: UniversalWeatherParser,
        }
    }

    /// 加载单个文件,返回按日期升序的日记录
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(&self, file_path: P) -> Result<Vec<DailyWeather>, WeatherImportError> {
        let records = self.parser.parse_to_raw_records(file_path.as_ref())?;
        let daily = records_to_daily(&records)?;
        info!(rows = daily.len(), "气象数据加载完成");
        Ok(daily)
    }

    /// 并发加载多个文件
    ///
    /// 每个文件在 tokio 阻塞线程池中解析,需在 tokio 运行时内调用
    ///
    /// # 返回
    /// 与输入顺序一致的逐文件结果,单个文件失败不影响其它文件
    pub async fn load_many(
        &self,
        file_paths: Vec<PathBuf>,
    ) -> Vec<Result<Vec<DailyWeather>, String>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量加载气象文件");

        let tasks = file_paths.into_iter().map(|path| {
            let loader = *self;
            async move {
                let path_str = path.display().to_string();
                match tokio::task::spawn_blocking(move || loader.load(&path)).await {
                    Ok(Ok(daily)) => Ok(daily),
                    Ok(Err(e)) => {
                        error!(file = %path_str, error = %e, "气象文件加载失败");
                        Err(format!("文件 {} 加载失败: {}", path_str, e))
                    }
                    Err(join_err) => {
                        error!(file = %path_str, error = %join_err, "气象文件加载任务异常退出");
                        Err(format!("文件 {} 加载任务异常: {}", path_str, join_err))
                    }
                }
            }
        });

        let results = join_all(tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量加载完成"
        );

        results
    }
}

/// 合并多份日记录（按日期排序,同日期保留先出现者）
pub fn merge_daily(batches: Vec<Vec<DailyWeather>>) -> Vec<DailyWeather> {
    let mut merged: Vec<DailyWeather> = batches.into_iter().flatten().collect();
    merged.sort_by_key(|d| d.date);
    merged.dedup_by_key(|d| d.date);
    merged
}

/// 原始行映射为日记录
pub fn records_to_daily(records: &[RawWeatherRecord]) -> Result<Vec<DailyWeather>, WeatherImportError> {
    if let Some(first) = records.first() {
        for column in REQUIRED_COLUMNS {
            if !first.fields.contains_key(column) {
                return Err(WeatherImportError::MissingColumn(column.to_string()));
            }
        }
    }

    let mut daily = records
        .iter()
        .map(|record| {
            Ok(DailyWeather {
                date: parse_date(record)?,
                prcp: parse_number(record, "PRCP")?,
                tmax: parse_number(record, "TMAX")?,
                tmin: parse_number(record, "TMIN")?,
            })
        })
        .collect::<Result<Vec<_>, WeatherImportError>>()?;

    daily.sort_by_key(|d| d.date);
    Ok(daily)
}

fn parse_date(record: &RawWeatherRecord) -> Result<NaiveDate, WeatherImportError> {
    let raw = record.get("DATE").unwrap_or("");
    // Excel 日期时间单元格可能带时间部分
    let date_part = raw.split_whitespace().next().unwrap_or("");

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .ok_or_else(|| WeatherImportError::DateFormatError {
            row: record.row_number,
            value: raw.to_string(),
        })
}

fn parse_number(record: &RawWeatherRecord, column: &str) -> Result<Option<f64>, WeatherImportError> {
    match record.get(column) {
        None => Ok(None),
        Some(raw) if raw.eq_ignore_ascii_case("NA") || raw.eq_ignore_ascii_case("NaN") => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| WeatherImportError::TypeConversionError {
                row: record.row_number,
                field: column.to_string(),
                value: raw.to_string(),
            }),
    }
}
