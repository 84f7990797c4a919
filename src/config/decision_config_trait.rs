// ==========================================
// 葡萄采收决策系统 - 决策配置读取 Trait
// ==========================================
// 职责: 定义决策 API 所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::decision_model::DecisionModel;
use crate::domain::decision::{BeliefInputs, CalibrationParams};
use crate::domain::types::SugarSumPolicy;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// DecisionConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait DecisionConfigReader: Send + Sync {
    /// 获取决策基线（无模型期望值）
    ///
    /// # 默认值
    /// - 928500
    async fn get_baseline(&self) -> Result<f64, Box<dyn Error + Send + Sync>>;

    /// 获取风暴预测信号校准参数
    ///
    /// # 默认值
    /// - sensitivity = 0.83, specificity = 0.87
    async fn get_calibration(&self) -> Result<CalibrationParams, Box<dyn Error + Send + Sync>>;

    /// 获取主观概率默认值（未指定的输入使用此值）
    ///
    /// # 默认值
    /// - storm 0.5, botrytis 0.1, no/typical/high sugar 0.6/0.3/0.1
    async fn get_belief_defaults(&self) -> Result<BeliefInputs, Box<dyn Error + Send + Sync>>;

    /// 获取糖分概率和策略
    ///
    /// # 默认值
    /// - WARN
    async fn get_sugar_sum_policy(&self) -> Result<SugarSumPolicy, Box<dyn Error + Send + Sync>>;

    /// 获取决策模型
    ///
    /// # 逻辑
    /// 1. 读取 decision/model（JSON）,缺失则使用内置常量
    /// 2. 若存在 decision/baseline,覆盖模型中的基线
    /// 3. 校验后返回
    async fn load_decision_model(&self) -> Result<DecisionModel, Box<dyn Error + Send + Sync>>;
}
