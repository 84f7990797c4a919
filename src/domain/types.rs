// ==========================================
// 葡萄采收决策系统 - 领域类型定义
// ==========================================
// 依据: 决策模型说明 - 酒款等级 / 情景 / 建议动作
// 红线: 情景与等级为固定枚举,不是可扩展框架
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 酒款等级 (Wine Grade)
// ==========================================
// 顺序: 甜度/稀有度递增 (Trocken < ... < Trockenbeerenauslese)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WineGrade {
    Trocken,
    Kabinett,
    #[serde(rename = "Spätlese")]
    Spaetlese,
    Auslese,
    Beerenauslese,
    Trockenbeerenauslese,
}

impl WineGrade {
    /// 全部等级（按甜度递增）
    pub const ALL: [WineGrade; 6] = [
        WineGrade::Trocken,
        WineGrade::Kabinett,
        WineGrade::Spaetlese,
        WineGrade::Auslese,
        WineGrade::Beerenauslese,
        WineGrade::Trockenbeerenauslese,
    ];

    /// 展示名称（与酒标一致）
    pub fn label(&self) -> &'static str {
        match self {
            WineGrade::Trocken => "Trocken",
            WineGrade::Kabinett => "Kabinett",
            WineGrade::Spaetlese => "Spätlese",
            WineGrade::Auslese => "Auslese",
            WineGrade::Beerenauslese => "Beerenauslese",
            WineGrade::Trockenbeerenauslese => "Trockenbeerenauslese",
        }
    }
}

impl fmt::Display for WineGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 产量情景 (Scenario)
// ==========================================
// HarvestNow 仅作参考展示,不参与期望值公式
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scenario {
    #[serde(rename = "Harvest Now")]
    HarvestNow,
    #[serde(rename = "Storm-Mold")]
    StormMold,
    #[serde(rename = "Storm-No Mold")]
    StormNoMold,
    #[serde(rename = "No Storm-No Sugar")]
    NoStormNoSugar,
    #[serde(rename = "No Storm-Typical Sugar")]
    NoStormTypicalSugar,
    #[serde(rename = "No Storm-High Sugar")]
    NoStormHighSugar,
}

impl Scenario {
    /// 期望值公式必需的五个情景
    pub const REQUIRED: [Scenario; 5] = [
        Scenario::StormMold,
        Scenario::StormNoMold,
        Scenario::NoStormNoSugar,
        Scenario::NoStormTypicalSugar,
        Scenario::NoStormHighSugar,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::HarvestNow => "Harvest Now",
            Scenario::StormMold => "Storm-Mold",
            Scenario::StormNoMold => "Storm-No Mold",
            Scenario::NoStormNoSugar => "No Storm-No Sugar",
            Scenario::NoStormTypicalSugar => "No Storm-Typical Sugar",
            Scenario::NoStormHighSugar => "No Storm-High Sugar",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 建议动作 (Recommended Action)
// ==========================================
// 判定: 期望值严格大于基线 → Wait; 相等或更小 → Harvest Now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendedAction {
    #[serde(rename = "Wait")]
    Wait,
    #[serde(rename = "Harvest Now")]
    HarvestNow,
}

impl RecommendedAction {
    /// 由期望值与基线判定建议动作
    pub fn from_expected_value(expected_value: f64, baseline: f64) -> Self {
        if expected_value > baseline {
            RecommendedAction::Wait
        } else {
            RecommendedAction::HarvestNow
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecommendedAction::Wait => "Wait",
            RecommendedAction::HarvestNow => "Harvest Now",
        }
    }

    /// 从字符串解析（数据库 / 命令行）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wait" => Some(RecommendedAction::Wait),
            "harvest now" | "harvest_now" | "harvestnow" => Some(RecommendedAction::HarvestNow),
            _ => None,
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 糖分概率和校验策略 (Sugar Sum Policy)
// ==========================================
// 三个无风暴糖分概率不强制归一,由策略决定处理方式
// 序列化格式: SCREAMING_SNAKE_CASE (与 config_kv 一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SugarSumPolicy {
    Ignore, // 不检查
    #[default]
    Warn,   // 记录告警,数值不变
    Reject, // 拒绝输入
}

impl fmt::Display for SugarSumPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SugarSumPolicy::Ignore => write!(f, "IGNORE"),
            SugarSumPolicy::Warn => write!(f, "WARN"),
            SugarSumPolicy::Reject => write!(f, "REJECT"),
        }
    }
}

impl SugarSumPolicy {
    /// 从字符串解析策略,未知值回退到默认 WARN
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "IGNORE" => SugarSumPolicy::Ignore,
            "REJECT" => SugarSumPolicy::Reject,
            _ => SugarSumPolicy::Warn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_threshold_is_strict() {
        assert_eq!(
            RecommendedAction::from_expected_value(928_500.01, 928_500.0),
            RecommendedAction::Wait
        );
        assert_eq!(
            RecommendedAction::from_expected_value(928_500.0, 928_500.0),
            RecommendedAction::HarvestNow
        );
        assert_eq!(
            RecommendedAction::from_expected_value(0.0, 928_500.0),
            RecommendedAction::HarvestNow
        );
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(RecommendedAction::Wait.to_string(), "Wait");
        assert_eq!(RecommendedAction::HarvestNow.to_string(), "Harvest Now");
        assert_eq!(RecommendedAction::parse("harvest now"), Some(RecommendedAction::HarvestNow));
        assert_eq!(RecommendedAction::parse("WAIT"), Some(RecommendedAction::Wait));
        assert_eq!(RecommendedAction::parse("later"), None);
    }

    #[test]
    fn test_grade_serde_uses_label() {
        let json = serde_json::to_string(&WineGrade::Spaetlese).unwrap();
        assert_eq!(json, "\"Spätlese\"");
        let back: WineGrade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WineGrade::Spaetlese);
    }

    #[test]
    fn test_grade_order_by_sweetness() {
        assert!(WineGrade::Trocken < WineGrade::Kabinett);
        assert!(WineGrade::Beerenauslese < WineGrade::Trockenbeerenauslese);
    }

    #[test]
    fn test_sugar_policy_parse() {
        assert_eq!(SugarSumPolicy::from_str("reject"), SugarSumPolicy::Reject);
        assert_eq!(SugarSumPolicy::from_str("IGNORE"), SugarSumPolicy::Ignore);
        assert_eq!(SugarSumPolicy::from_str("???"), SugarSumPolicy::Warn);
        assert_eq!(SugarSumPolicy::default(), SugarSumPolicy::Warn);
    }
}
