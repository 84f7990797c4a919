// ==========================================
// 葡萄采收决策系统 - 气象数据领域模型
// ==========================================
// 用途: 降水分类数据集（采收窗口周度特征）
// 列名对齐原始气象 CSV: DATE / PRCP / TMAX / TMIN
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 日气象记录（缺测值为 None）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub prcp: Option<f64>, // 降水量
    pub tmax: Option<f64>, // 最高温
    pub tmin: Option<f64>, // 最低温
}

/// 周度汇总（自然年 + ISO 周）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyWeather {
    pub year: i32,
    pub week_of_year: u32,
    pub prcp: f64,         // 周降水合计（缺测按 0）
    pub tmax: Option<f64>, // 周均最高温（全缺测为 None）
    pub tmin: Option<f64>, // 周均最低温
}

/// 分类特征行
///
/// label = 当周降水 >= 阈值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub year: i32,
    pub week_of_year: u32,
    pub tmax: f64,
    pub tmin: f64,
    pub prcp_lag1: f64,
    pub prcp_lag2: f64,
    pub prcp_ma3: f64,
    pub prcp: f64,
    pub label: bool,
}
