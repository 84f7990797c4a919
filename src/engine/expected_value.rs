// ==========================================
// 葡萄采收决策系统 - 期望值计算引擎
// ==========================================
// 职责: 决策树期望值计算 + 建议动作判定
// 输入: BeliefInputs + CalibrationParams
// 输出: DecisionResult / DecisionBreakdown
// ==========================================
// 红线: 纯函数,无状态、无 I/O,模型常量只读
// ==========================================

use crate::config::decision_model::DecisionModel;
use crate::domain::decision::{BeliefInputs, CalibrationParams, DecisionBreakdown, DecisionResult};
use crate::domain::types::{RecommendedAction, Scenario, SugarSumPolicy};
use crate::engine::error::EngineResult;
use crate::engine::validation::InputValidator;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

// ==========================================
// 信号校正
// ==========================================

/// 对风暴概率做灵敏度/特异度校正
///
/// # 返回
/// (corrected_storm, corrected_no_storm)
/// - corrected_storm = storm·sens + (1−storm)·(1−spec)
/// - corrected_no_storm = (1−storm)·spec + storm·(1−sens)
pub fn correct_storm_probability(prob_storm: f64, calib: &CalibrationParams) -> (f64, f64) {
    let corrected_storm =
        prob_storm * calib.sensitivity + (1.0 - prob_storm) * (1.0 - calib.specificity);
    let corrected_no_storm =
        (1.0 - prob_storm) * calib.specificity + prob_storm * (1.0 - calib.sensitivity);
    (corrected_storm, corrected_no_storm)
}

// ==========================================
// ExpectedValueCalculator - 期望值计算引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct ExpectedValueCalculator {
    model: DecisionModel,
    validator: InputValidator,
}

impl Default for ExpectedValueCalculator {
    fn default() -> Self {
        Self::new(DecisionModel::default())
    }
}

impl ExpectedValueCalculator {
    /// 使用给定模型创建计算引擎（糖分和策略默认 WARN）
    pub fn new(model: DecisionModel) -> Self {
        Self {
            model,
            validator: InputValidator::new(SugarSumPolicy::default()),
        }
    }

    /// 校验模型后创建
    pub fn try_new(model: DecisionModel) -> EngineResult<Self> {
        model.validate()?;
        Ok(Self::new(model))
    }

    /// 指定糖分概率和校验策略
    pub fn with_sugar_policy(mut self, policy: SugarSumPolicy) -> Self {
        self.validator = InputValidator::new(policy);
        self
    }

    pub fn model(&self) -> &DecisionModel {
        &self.model
    }

    pub fn baseline(&self) -> f64 {
        self.model.baseline
    }

    pub fn sugar_policy(&self) -> SugarSumPolicy {
        self.validator.policy()
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算期望值与建议动作（不做范围校验）
    ///
    /// 对任意有限输入均有定义;越界输入会得到无意义的数值,
    /// 需要校验时使用 `evaluate`。
    pub fn compute(&self, beliefs: &BeliefInputs, calib: &CalibrationParams) -> DecisionResult {
        self.breakdown(beliefs, calib).result()
    }

    /// 校验输入后计算
    ///
    /// # 返回
    /// - Ok(DecisionResult)
    /// - Err(DecisionError::InvalidInput): 概率/校准参数越界,或糖分和不满足 REJECT 策略
    #[instrument(skip(self), fields(baseline = self.model.baseline))]
    pub fn evaluate(
        &self,
        beliefs: &BeliefInputs,
        calib: &CalibrationParams,
    ) -> EngineResult<DecisionResult> {
        self.validator.validate(beliefs, calib)?;
        Ok(self.compute(beliefs, calib))
    }

    /// 校验输入后计算,并返回完整分解
    pub fn evaluate_with_breakdown(
        &self,
        beliefs: &BeliefInputs,
        calib: &CalibrationParams,
    ) -> EngineResult<DecisionBreakdown> {
        self.validator.validate(beliefs, calib)?;
        Ok(self.breakdown(beliefs, calib))
    }

    /// 决策树分解
    ///
    /// 步骤:
    /// 1. 信号校正风暴概率
    /// 2. 风暴分支: 按贵腐概率混合 Storm-Mold / Storm-No Mold
    /// 3. 无风暴分支: 按三个糖分概率加权（不归一）
    /// 4. 期望值 = 风暴收入·校正风暴概率 + 无风暴收入·校正无风暴概率
    /// 5. 期望值 > 基线 → Wait,否则 Harvest Now
    pub fn breakdown(&self, beliefs: &BeliefInputs, calib: &CalibrationParams) -> DecisionBreakdown {
        // 1. 信号校正
        let (corrected_storm, corrected_no_storm) =
            correct_storm_probability(beliefs.prob_storm, calib);

        // 2. 各情景收入
        let scenario_revenues: BTreeMap<Scenario, f64> = self
            .model
            .cases
            .iter()
            .map(|(scenario, _)| (*scenario, self.scenario_revenue(*scenario)))
            .collect();
        let revenue_of = |s: Scenario| scenario_revenues.get(&s).copied().unwrap_or(0.0);

        let storm_revenue = beliefs.prob_botrytis * revenue_of(Scenario::StormMold)
            + (1.0 - beliefs.prob_botrytis) * revenue_of(Scenario::StormNoMold);

        // 3. 无风暴分支
        let no_storm_revenue = revenue_of(Scenario::NoStormNoSugar) * beliefs.prob_no_sugar
            + revenue_of(Scenario::NoStormTypicalSugar) * beliefs.prob_typical_sugar
            + revenue_of(Scenario::NoStormHighSugar) * beliefs.prob_high_sugar;

        // 4. 期望值
        let storm_contribution = storm_revenue * corrected_storm;
        let no_storm_contribution = no_storm_revenue * corrected_no_storm;
        let expected_value = storm_contribution + no_storm_contribution;

        // 5. 建议动作
        let baseline = self.model.baseline;
        let action = RecommendedAction::from_expected_value(expected_value, baseline);

        debug!(
            corrected_storm,
            storm_revenue,
            no_storm_revenue,
            expected_value,
            action = %action,
            "决策树计算完成"
        );

        DecisionBreakdown {
            corrected_storm,
            corrected_no_storm,
            scenario_revenues,
            storm_revenue,
            no_storm_revenue,
            storm_contribution,
            no_storm_contribution,
            expected_value,
            baseline,
            margin: expected_value - baseline,
            action,
        }
    }

    // ==========================================
    // 情景收入
    // ==========================================

    /// 单情景总收入 = Σ 箱数 × 每箱瓶数 × 每瓶收入
    ///
    /// 情景未定义时返回 0
    pub fn scenario_revenue(&self, scenario: Scenario) -> f64 {
        let bottles_per_case = self.model.bottles_per_case as f64;

        match self.model.cases.cases(scenario) {
            Some(grades) => grades
                .iter()
                .map(|(grade, cases)| {
                    let per_bottle = self
                        .model
                        .revenue_per_bottle
                        .revenue_per_bottle(*grade)
                        .unwrap_or(0.0);
                    *cases as f64 * bottles_per_case * per_bottle
                })
                .sum(),
            None => 0.0,
        }
    }
}
