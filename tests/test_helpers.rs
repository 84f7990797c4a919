// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、测试配置、合成气象数据
// ==========================================
#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use harvest_decision::config::config_keys;
use harvest_decision::db::open_sqlite_connection;
use harvest_decision::domain::{BeliefInputs, CalibrationParams};
use rusqlite::{params, Connection};
use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const EPS: f64 = 1e-6;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    harvest_decision::logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("非 UTF-8 路径")?.to_string();

    open_sqlite_connection(&db_path)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 写入一组非默认的测试配置
pub fn insert_test_config(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let entries = [
        (config_keys::BASELINE, "950000".to_string()),
        (config_keys::SENSITIVITY, "0.9".to_string()),
        (config_keys::SPECIFICITY, "0.8".to_string()),
        (config_keys::SUGAR_SUM_POLICY, "REJECT".to_string()),
        (
            config_keys::BELIEF_DEFAULTS,
            serde_json::to_string(&BeliefInputs::new(0.4, 0.2, 0.5, 0.3, 0.2))?,
        ),
    ];

    for (key, value) in entries {
        conn.execute(
            "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
            params![key, value],
        )?;
    }
    Ok(())
}

/// 原始界面默认值
pub fn default_beliefs() -> BeliefInputs {
    BeliefInputs::new(0.5, 0.1, 0.6, 0.3, 0.1)
}

pub fn default_calibration() -> CalibrationParams {
    CalibrationParams::new(0.83, 0.87)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {}, got {}",
        expected,
        actual
    );
}

// ==========================================
// 合成气象数据
// ==========================================

/// 生成 [start, end] 的日气象 CSV 行
///
/// 降水由 rain_fn(日期) 决定,温度固定
pub fn weather_csv_lines<F>(start: NaiveDate, end: NaiveDate, rain_fn: F) -> Vec<String>
where
    F: Fn(NaiveDate) -> f64,
{
    let mut lines = vec!["DATE,PRCP,TMAX,TMIN".to_string()];
    let mut day = start;
    while day <= end {
        lines.push(format!("{},{},78,56", day.format("%Y-%m-%d"), rain_fn(day)));
        day += Duration::days(1);
    }
    lines
}

/// 写入 CSV 文件
pub fn write_csv(dir: &Path, name: &str, lines: &[String]) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path)?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    Ok(path)
}
