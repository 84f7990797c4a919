// ==========================================
// 葡萄采收决策系统 - 降水分类评估
// ==========================================
// 职责: 分类器接口 + 混淆矩阵 + 分类报告
// 产出: 灵敏度/特异度 → CalibrationParams
// ==========================================

use crate::domain::decision::CalibrationParams;
use crate::domain::weather::FeatureRow;
use crate::engine::calibration::calibration_from_counts;
use crate::engine::error::EngineResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// 降水分类器接口
///
/// 训练过程不在本系统内;实现方只需给出单行预测。
pub trait PrecipitationClassifier {
    fn predict(&self, row: &FeatureRow) -> bool;
}

impl<F> PrecipitationClassifier for F
where
    F: Fn(&FeatureRow) -> bool,
{
    fn predict(&self, row: &FeatureRow) -> bool {
        self(row)
    }
}

/// 滑动平均基准分类器: PRCP_MA3 >= threshold 即预测降水
#[derive(Debug, Clone, Copy)]
pub struct MovingAverageBaseline {
    pub threshold: f64,
}

impl PrecipitationClassifier for MovingAverageBaseline {
    fn predict(&self, row: &FeatureRow) -> bool {
        row.prcp_ma3 >= self.threshold
    }
}

// ==========================================
// ConfusionMatrix
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: u64,
    pub false_negative: u64,
    pub true_negative: u64,
    pub false_positive: u64,
}

impl ConfusionMatrix {
    pub fn record(&mut self, actual: bool, predicted: bool) {
        match (actual, predicted) {
            (true, true) => self.true_positive += 1,
            (true, false) => self.false_negative += 1,
            (false, false) => self.true_negative += 1,
            (false, true) => self.false_positive += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positive + self.false_negative + self.true_negative + self.false_positive
    }

    /// 灵敏度/特异度（任一类别无样本时报错）
    pub fn to_calibration(&self) -> EngineResult<CalibrationParams> {
        calibration_from_counts(
            self.true_positive,
            self.false_negative,
            self.true_negative,
            self.false_positive,
        )
    }
}

impl fmt::Display for ConfusionMatrix {
    // 行为实际类别,列为预测类别（0, 1）
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[[{} {}]", self.true_negative, self.false_positive)?;
        write!(f, " [{} {}]]", self.false_negative, self.true_positive)
    }
}

// ==========================================
// ClassificationReport
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u64,
}

impl ClassMetrics {
    fn from_counts(hit: u64, predicted: u64, support: u64) -> Self {
        let precision = ratio(hit, predicted);
        let recall = ratio(hit, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
            support,
        }
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub confusion: ConfusionMatrix,
    pub no_rain: ClassMetrics,
    pub rain: ClassMetrics,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn from_confusion(confusion: ConfusionMatrix) -> Self {
        let c = confusion;
        let rain = ClassMetrics::from_counts(
            c.true_positive,
            c.true_positive + c.false_positive,
            c.true_positive + c.false_negative,
        );
        let no_rain = ClassMetrics::from_counts(
            c.true_negative,
            c.true_negative + c.false_negative,
            c.true_negative + c.false_positive,
        );
        let total = c.total();

        let macro_avg = ClassMetrics {
            precision: (rain.precision + no_rain.precision) / 2.0,
            recall: (rain.recall + no_rain.recall) / 2.0,
            f1: (rain.f1 + no_rain.f1) / 2.0,
            support: total,
        };

        let weight = |a: f64, b: f64| {
            if total == 0 {
                0.0
            } else {
                (a * no_rain.support as f64 + b * rain.support as f64) / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weight(no_rain.precision, rain.precision),
            recall: weight(no_rain.recall, rain.recall),
            f1: weight(no_rain.f1, rain.f1),
            support: total,
        };

        Self {
            confusion,
            no_rain,
            rain,
            accuracy: ratio(c.true_positive + c.true_negative, total),
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (name, m) in [("0", &self.no_rain), ("1", &self.rain)] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.confusion.total()
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

/// 在给定样本上评估分类器
pub fn evaluate_classifier<C>(classifier: &C, rows: &[FeatureRow]) -> ClassificationReport
where
    C: PrecipitationClassifier + ?Sized,
{
    let mut confusion = ConfusionMatrix::default();
    for row in rows {
        confusion.record(row.label, classifier.predict(row));
    }

    let report = ClassificationReport::from_confusion(confusion);
    info!(
        samples = rows.len(),
        accuracy = report.accuracy,
        "分类器评估完成"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(prcp_ma3: f64, label: bool) -> FeatureRow {
        FeatureRow {
            year: 2020,
            week_of_year: 36,
            tmax: 75.0,
            tmin: 55.0,
            prcp_lag1: 0.0,
            prcp_lag2: 0.0,
            prcp_ma3,
            prcp: if label { 0.5 } else { 0.0 },
            label,
        }
    }

    #[test]
    fn test_confusion_counts() {
        let rows = vec![
            row(0.5, true),
            row(0.1, true),
            row(0.0, false),
            row(0.4, false),
            row(0.0, false),
        ];

        let report = evaluate_classifier(&MovingAverageBaseline { threshold: 0.35 }, &rows);

        assert_eq!(
            report.confusion,
            ConfusionMatrix {
                true_positive: 1,
                false_negative: 1,
                true_negative: 2,
                false_positive: 1,
            }
        );
        assert!((report.accuracy - 0.6).abs() < 1e-12);
        assert!((report.rain.precision - 0.5).abs() < 1e-12);
        assert!((report.rain.recall - 0.5).abs() < 1e-12);
        assert_eq!(report.no_rain.support, 3);
    }

    #[test]
    fn test_closure_classifier_and_calibration() {
        let rows = vec![row(0.0, true), row(0.0, true), row(0.0, false)];
        let always_rain = |_: &FeatureRow| true;

        let report = evaluate_classifier(&always_rain, &rows);
        let calib = report.confusion.to_calibration().unwrap();

        assert_eq!(calib.sensitivity, 1.0);
        assert_eq!(calib.specificity, 0.0);
        // 无预测为 0 的样本时精确率按 0 计
        assert_eq!(report.no_rain.precision, 0.0);
    }

    #[test]
    fn test_calibration_requires_both_classes() {
        let rows = vec![row(0.0, false), row(0.0, false)];
        let report = evaluate_classifier(&MovingAverageBaseline { threshold: 0.35 }, &rows);
        assert!(report.confusion.to_calibration().is_err());
    }

    #[test]
    fn test_display_layout() {
        let matrix = ConfusionMatrix {
            true_positive: 4,
            false_negative: 1,
            true_negative: 7,
            false_positive: 2,
        };
        assert_eq!(matrix.to_string(), "[[7 2]\n [1 4]]");

        let text = ClassificationReport::from_confusion(matrix).to_string();
        assert!(text.contains("weighted avg"));
        assert!(text.contains("accuracy"));
    }
}
