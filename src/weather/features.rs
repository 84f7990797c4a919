// ==========================================
// 葡萄采收决策系统 - 降水特征工程
// ==========================================
// 流程: 日记录 → 采收窗口周汇总 → 滞后/滑动特征 → 标签
// 红线: 特征行按 (年, 周) 时间顺序排列,切分不打乱
// ==========================================

use crate::domain::weather::{DailyWeather, FeatureRow, WeeklyWeather};
use crate::weather::error::WeatherImportError;
use chrono::Datelike;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// 采收窗口（ISO 周）
pub const HARVEST_WEEKS: RangeInclusive<u32> = 35..=40;

/// 周降水达到该值即视为降水周
pub const RAIN_THRESHOLD: f64 = 0.35;

/// 滑动平均窗口
pub const MOVING_AVERAGE_WINDOW: usize = 3;

#[derive(Default)]
struct WeekAccumulator {
    prcp_sum: f64,
    tmax_sum: f64,
    tmax_count: u32,
    tmin_sum: f64,
    tmin_count: u32,
}

fn mean(sum: f64, count: u32) -> Option<f64> {
    (count > 0).then(|| sum / f64::from(count))
}

/// 按 (自然年, ISO 周) 汇总采收窗口内的日记录
///
/// - PRCP: 合计,缺测跳过（全缺测记 0）
/// - TMAX / TMIN: 均值,缺测跳过（全缺测为 None）
pub fn aggregate_weekly(daily: &[DailyWeather]) -> Vec<WeeklyWeather> {
    let mut weeks: BTreeMap<(i32, u32), WeekAccumulator> = BTreeMap::new();

    for day in daily {
        let week = day.date.iso_week().week();
        if !HARVEST_WEEKS.contains(&week) {
            continue;
        }

        let acc = weeks.entry((day.date.year(), week)).or_default();
        if let Some(p) = day.prcp {
            acc.prcp_sum += p;
        }
        if let Some(t) = day.tmax {
            acc.tmax_sum += t;
            acc.tmax_count += 1;
        }
        if let Some(t) = day.tmin {
            acc.tmin_sum += t;
            acc.tmin_count += 1;
        }
    }

    weeks
        .into_iter()
        .map(|((year, week_of_year), acc)| WeeklyWeather {
            year,
            week_of_year,
            prcp: acc.prcp_sum,
            tmax: mean(acc.tmax_sum, acc.tmax_count),
            tmin: mean(acc.tmin_sum, acc.tmin_count),
        })
        .collect()
}

/// 由周汇总构造特征行
///
/// 滞后与滑动平均沿整个周序列计算（跨年连续）,
/// 任一特征缺失的行被丢弃。
pub fn build_feature_rows(weekly: &[WeeklyWeather]) -> Vec<FeatureRow> {
    weekly
        .iter()
        .enumerate()
        .filter_map(|(i, week)| {
            if i < MOVING_AVERAGE_WINDOW - 1 {
                return None;
            }
            let lag1 = weekly[i - 1].prcp;
            let lag2 = weekly[i - 2].prcp;
            let ma3 = weekly[i + 1 - MOVING_AVERAGE_WINDOW..=i]
                .iter()
                .map(|w| w.prcp)
                .sum::<f64>()
                / MOVING_AVERAGE_WINDOW as f64;

            Some(FeatureRow {
                year: week.year,
                week_of_year: week.week_of_year,
                tmax: week.tmax?,
                tmin: week.tmin?,
                prcp_lag1: lag1,
                prcp_lag2: lag2,
                prcp_ma3: ma3,
                prcp: week.prcp,
                label: week.prcp >= RAIN_THRESHOLD,
            })
        })
        .collect()
}

/// 日记录 → 特征行
pub fn build_dataset(daily: &[DailyWeather]) -> Vec<FeatureRow> {
    build_feature_rows(&aggregate_weekly(daily))
}

/// 按时间顺序切分训练集/测试集
///
/// # 参数
/// - test_fraction: 测试集比例,(0, 1) 开区间;测试集行数向上取整
///
/// # 返回
/// (训练集, 测试集),测试集为时间上最靠后的行
pub fn chronological_split(
    rows: &[FeatureRow],
    test_fraction: f64,
) -> Result<(Vec<FeatureRow>, Vec<FeatureRow>), WeatherImportError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(WeatherImportError::InvalidParameter(format!(
            "test_fraction 必须在 (0, 1) 之间: {}",
            test_fraction
        )));
    }

    let test_len = ((rows.len() as f64) * test_fraction).ceil() as usize;
    if rows.len() < 2 || test_len >= rows.len() {
        return Err(WeatherImportError::InvalidParameter(format!(
            "样本不足以切分: {} 行",
            rows.len()
        )));
    }

    let (train, test) = rows.split_at(rows.len() - test_len);
    Ok((train.to_vec(), test.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32, prcp: Option<f64>, tmax: Option<f64>) -> DailyWeather {
        DailyWeather {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            prcp,
            tmax,
            tmin: tmax.map(|t| t - 20.0),
        }
    }

    fn week(year: i32, week_of_year: u32, prcp: f64) -> WeeklyWeather {
        WeeklyWeather {
            year,
            week_of_year,
            prcp,
            tmax: Some(75.0),
            tmin: Some(55.0),
        }
    }

    #[test]
    fn test_aggregate_filters_harvest_window() {
        // 2021-08-02 属于 ISO 第 31 周
        // 2021-08-30 与 2021-08-31 属于 ISO 第 35 周
        let daily = vec![
            day(2021, 8, 2, Some(5.0), Some(90.0)),
            day(2021, 8, 30, Some(0.2), Some(80.0)),
            day(2021, 8, 31, None, Some(70.0)),
        ];

        let weekly = aggregate_weekly(&daily);

        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].week_of_year, 35);
        assert!((weekly[0].prcp - 0.2).abs() < 1e-12);
        assert_eq!(weekly[0].tmax, Some(75.0));
    }

    #[test]
    fn test_all_missing_prcp_sums_to_zero() {
        let daily = vec![day(2021, 9, 1, None, None)];
        let weekly = aggregate_weekly(&daily);
        assert_eq!(weekly[0].prcp, 0.0);
        assert_eq!(weekly[0].tmax, None);
    }

    #[test]
    fn test_feature_rows_lags_and_label() {
        let weekly = vec![
            week(2020, 35, 0.1),
            week(2020, 36, 0.2),
            week(2020, 37, 0.6),
            week(2020, 38, 0.0),
        ];

        let rows = build_feature_rows(&weekly);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].week_of_year, 37);
        assert_eq!(rows[0].prcp_lag1, 0.2);
        assert_eq!(rows[0].prcp_lag2, 0.1);
        assert!((rows[0].prcp_ma3 - 0.3).abs() < 1e-12);
        assert!(rows[0].label);
        assert!(!rows[1].label);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let weekly = vec![week(2020, 35, 0.0), week(2020, 36, 0.0), week(2020, 37, 0.35)];
        let rows = build_feature_rows(&weekly);
        assert!(rows[0].label);
    }

    #[test]
    fn test_rows_with_missing_temperature_are_dropped() {
        let mut weekly = vec![week(2020, 35, 0.1), week(2020, 36, 0.2), week(2020, 37, 0.3)];
        weekly[2].tmin = None;
        assert!(build_feature_rows(&weekly).is_empty());
    }

    #[test]
    fn test_lags_span_years() {
        let weekly = vec![week(2019, 39, 1.0), week(2019, 40, 2.0), week(2020, 35, 0.0)];
        let rows = build_feature_rows(&weekly);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2020);
        assert_eq!(rows[0].prcp_lag1, 2.0);
    }

    #[test]
    fn test_chronological_split_keeps_order() {
        let weekly: Vec<WeeklyWeather> = (35..=40).map(|w| week(2020, w, 0.1)).collect();
        let rows = build_feature_rows(&weekly);
        assert_eq!(rows.len(), 4);

        let (train, test) = chronological_split(&rows, 0.2).unwrap();

        assert_eq!(train.len(), 3);
        assert_eq!(test.len(), 1);
        assert_eq!(test[0].week_of_year, 40);
    }

    #[test]
    fn test_chronological_split_rejects_bad_fraction() {
        let rows = build_feature_rows(&[week(2020, 35, 0.1), week(2020, 36, 0.1), week(2020, 37, 0.1)]);
        assert!(chronological_split(&rows, 0.0).is_err());
        assert!(chronological_split(&rows, 1.0).is_err());
        assert!(chronological_split(&rows, f64::NAN).is_err());
        // 仅 1 行不足以切分
        assert!(chronological_split(&rows, 0.5).is_err());
    }
}
