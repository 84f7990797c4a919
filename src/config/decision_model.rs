// ==========================================
// 葡萄采收决策系统 - 决策模型常量配置
// ==========================================
// 职责: 收入表 / 情景产量表 / 每箱瓶数 / 基线 的可注入配置
// 红线: 构造即校验,非法常量以 InvalidConfiguration 报错
// ==========================================

use crate::domain::types::{Scenario, WineGrade};
use crate::engine::error::{DecisionError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// 无模型决策的期望值（决策阈值）
pub const DEFAULT_BASELINE: f64 = 928_500.0;

/// 每箱瓶数
pub const DEFAULT_BOTTLES_PER_CASE: u32 = 12;

// ==========================================
// RevenueTable - 每瓶收入表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevenueTable(BTreeMap<WineGrade, f64>);

impl RevenueTable {
    pub fn new(entries: BTreeMap<WineGrade, f64>) -> Self {
        Self(entries)
    }

    pub fn revenue_per_bottle(&self, grade: WineGrade) -> Option<f64> {
        self.0.get(&grade).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WineGrade, &f64)> {
        self.0.iter()
    }
}

impl Default for RevenueTable {
    fn default() -> Self {
        Self(BTreeMap::from([
            (WineGrade::Trocken, 5.0),
            (WineGrade::Kabinett, 10.0),
            (WineGrade::Spaetlese, 15.0),
            (WineGrade::Auslese, 30.0),
            (WineGrade::Beerenauslese, 40.0),
            (WineGrade::Trockenbeerenauslese, 120.0),
        ]))
    }
}

// ==========================================
// ScenarioCaseCounts - 各情景产量（箱）
// ==========================================
// 情景内未列出的等级视为 0 箱
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioCaseCounts(BTreeMap<Scenario, BTreeMap<WineGrade, u32>>);

impl ScenarioCaseCounts {
    pub fn new(entries: BTreeMap<Scenario, BTreeMap<WineGrade, u32>>) -> Self {
        Self(entries)
    }

    pub fn cases(&self, scenario: Scenario) -> Option<&BTreeMap<WineGrade, u32>> {
        self.0.get(&scenario)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Scenario, &BTreeMap<WineGrade, u32>)> {
        self.0.iter()
    }
}

impl Default for ScenarioCaseCounts {
    fn default() -> Self {
        use WineGrade::*;

        Self(BTreeMap::from([
            (
                Scenario::HarvestNow,
                BTreeMap::from([(Trocken, 6000), (Kabinett, 2000), (Spaetlese, 2000)]),
            ),
            (
                Scenario::StormNoMold,
                BTreeMap::from([(Trocken, 5000), (Kabinett, 1000)]),
            ),
            (
                Scenario::StormMold,
                BTreeMap::from([(Trockenbeerenauslese, 2000)]),
            ),
            (
                Scenario::NoStormNoSugar,
                BTreeMap::from([(Trocken, 6000), (Kabinett, 2000), (Spaetlese, 2000)]),
            ),
            (
                Scenario::NoStormTypicalSugar,
                BTreeMap::from([
                    (Trocken, 5000),
                    (Kabinett, 1000),
                    (Spaetlese, 2500),
                    (Auslese, 1500),
                ]),
            ),
            (
                Scenario::NoStormHighSugar,
                BTreeMap::from([
                    (Trocken, 4000),
                    (Kabinett, 2500),
                    (Spaetlese, 2000),
                    (Auslese, 1000),
                    (Beerenauslese, 500),
                ]),
            ),
        ]))
    }
}

// ==========================================
// DecisionModel - 决策模型（常量打包）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionModel {
    pub revenue_per_bottle: RevenueTable,
    pub cases: ScenarioCaseCounts,
    #[serde(default = "default_bottles_per_case")]
    pub bottles_per_case: u32,
    #[serde(default = "default_baseline")]
    pub baseline: f64,
}

fn default_bottles_per_case() -> u32 {
    DEFAULT_BOTTLES_PER_CASE
}

fn default_baseline() -> f64 {
    DEFAULT_BASELINE
}

impl Default for DecisionModel {
    fn default() -> Self {
        Self {
            revenue_per_bottle: RevenueTable::default(),
            cases: ScenarioCaseCounts::default(),
            bottles_per_case: DEFAULT_BOTTLES_PER_CASE,
            baseline: DEFAULT_BASELINE,
        }
    }
}

impl DecisionModel {
    /// 构造并校验
    pub fn new(
        revenue_per_bottle: RevenueTable,
        cases: ScenarioCaseCounts,
        bottles_per_case: u32,
        baseline: f64,
    ) -> EngineResult<Self> {
        let model = Self {
            revenue_per_bottle,
            cases,
            bottles_per_case,
            baseline,
        };
        model.validate()?;
        Ok(model)
    }

    /// 替换基线（其余常量不变）
    pub fn with_baseline(mut self, baseline: f64) -> EngineResult<Self> {
        self.baseline = baseline;
        self.validate()?;
        Ok(self)
    }

    /// 校验常量
    ///
    /// 规则:
    /// - 每瓶收入必须为有限正数
    /// - 五个必需情景必须存在
    /// - 情景中出现的等级必须在收入表中有定义
    /// - 每箱瓶数 > 0
    /// - 基线为有限非负数
    pub fn validate(&self) -> EngineResult<()> {
        for (grade, revenue) in self.revenue_per_bottle.iter() {
            if !revenue.is_finite() || *revenue <= 0.0 {
                return Err(DecisionError::InvalidConfiguration(format!(
                    "等级 {} 的每瓶收入必须为正数,实际 {}",
                    grade, revenue
                )));
            }
        }

        for scenario in Scenario::REQUIRED {
            if self.cases.cases(scenario).is_none() {
                return Err(DecisionError::InvalidConfiguration(format!(
                    "缺少情景产量定义: {}",
                    scenario
                )));
            }
        }

        for (scenario, grades) in self.cases.iter() {
            for grade in grades.keys() {
                if self.revenue_per_bottle.revenue_per_bottle(*grade).is_none() {
                    return Err(DecisionError::InvalidConfiguration(format!(
                        "情景 {} 引用了未定义收入的等级 {}",
                        scenario, grade
                    )));
                }
            }
        }

        if self.bottles_per_case == 0 {
            return Err(DecisionError::InvalidConfiguration(
                "每箱瓶数必须大于 0".to_string(),
            ));
        }

        if !self.baseline.is_finite() || self.baseline < 0.0 {
            return Err(DecisionError::InvalidConfiguration(format!(
                "基线必须为非负有限数,实际 {}",
                self.baseline
            )));
        }

        Ok(())
    }

    /// 从 JSON 字符串加载并校验
    pub fn from_json_str(raw: &str) -> EngineResult<Self> {
        let model: DecisionModel = serde_json::from_str(raw).map_err(|e| {
            DecisionError::InvalidConfiguration(format!("决策模型 JSON 解析失败: {}", e))
        })?;
        model.validate()?;
        Ok(model)
    }

    /// 从 JSON 文件加载并校验
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DecisionError::InvalidConfiguration(format!(
                "读取决策模型文件失败 ({}): {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_string(&self) -> String {
        // 仅含 BTreeMap/数值,序列化不会失败
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_is_valid() {
        let model = DecisionModel::default();
        assert!(model.validate().is_ok());
        assert_eq!(model.bottles_per_case, 12);
        assert_eq!(model.baseline, 928_500.0);
        assert_eq!(
            model.revenue_per_bottle.revenue_per_bottle(WineGrade::Trockenbeerenauslese),
            Some(120.0)
        );
    }

    #[test]
    fn test_non_positive_revenue_rejected() {
        let mut revenue = RevenueTable::default().0;
        revenue.insert(WineGrade::Kabinett, -10.0);
        let result = DecisionModel::new(
            RevenueTable::new(revenue),
            ScenarioCaseCounts::default(),
            12,
            DEFAULT_BASELINE,
        );
        assert!(matches!(result, Err(DecisionError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_missing_required_scenario_rejected() {
        let mut cases = ScenarioCaseCounts::default().0;
        cases.remove(&Scenario::StormMold);
        let result = DecisionModel::new(
            RevenueTable::default(),
            ScenarioCaseCounts::new(cases),
            12,
            DEFAULT_BASELINE,
        );
        match result {
            Err(DecisionError::InvalidConfiguration(msg)) => assert!(msg.contains("Storm-Mold")),
            other => panic!("Expected InvalidConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_harvest_now_scenario_is_optional() {
        let mut cases = ScenarioCaseCounts::default().0;
        cases.remove(&Scenario::HarvestNow);
        let result = DecisionModel::new(
            RevenueTable::default(),
            ScenarioCaseCounts::new(cases),
            12,
            DEFAULT_BASELINE,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_grade_without_revenue_rejected() {
        let mut revenue = RevenueTable::default().0;
        revenue.remove(&WineGrade::Beerenauslese);
        let result = DecisionModel::new(
            RevenueTable::new(revenue),
            ScenarioCaseCounts::default(),
            12,
            DEFAULT_BASELINE,
        );
        assert!(matches!(result, Err(DecisionError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_invalid_baseline_and_bottles_rejected() {
        assert!(DecisionModel::default().with_baseline(-1.0).is_err());
        assert!(DecisionModel::default().with_baseline(f64::NAN).is_err());

        let result = DecisionModel::new(
            RevenueTable::default(),
            ScenarioCaseCounts::default(),
            0,
            DEFAULT_BASELINE,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_json_keeps_domain_labels() {
        let json = DecisionModel::default().to_json_string();
        assert!(json.contains("\"Spätlese\":15.0"));
        assert!(json.contains("\"No Storm-High Sugar\""));

        let back = DecisionModel::from_json_str(&json).unwrap();
        assert_eq!(back, DecisionModel::default());
    }

    #[test]
    fn test_json_defaults_bottles_and_baseline() {
        let raw = r#"{
            "revenue_per_bottle": {"Trocken": 5, "Trockenbeerenauslese": 120},
            "cases": {
                "Storm-Mold": {"Trockenbeerenauslese": 10},
                "Storm-No Mold": {"Trocken": 10},
                "No Storm-No Sugar": {"Trocken": 10},
                "No Storm-Typical Sugar": {"Trocken": 20},
                "No Storm-High Sugar": {"Trocken": 30}
            }
        }"#;
        let model = DecisionModel::from_json_str(raw).unwrap();
        assert_eq!(model.bottles_per_case, 12);
        assert_eq!(model.baseline, DEFAULT_BASELINE);
    }

    #[test]
    fn test_json_unknown_scenario_rejected() {
        let raw = r#"{"revenue_per_bottle": {}, "cases": {"Hail": {}}}"#;
        assert!(DecisionModel::from_json_str(raw).is_err());
    }
}
