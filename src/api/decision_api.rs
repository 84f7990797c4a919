// ==========================================
// 葡萄采收决策系统 - 决策 API
// ==========================================
// 职责: 补齐默认值 → 校验 → 计算分解 → 展示文本 → 可选审计落库
// 红线: 计算只走 ExpectedValueCalculator,API 层不重复公式
// ==========================================

use std::sync::Arc;

use tracing::{info, instrument};

use crate::api::dto::{DecisionDefaultsResponse, EvaluateDecisionRequest, EvaluateDecisionResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::config::decision_config_trait::DecisionConfigReader;
use crate::domain::decision_log::DecisionLogEntry;
use crate::domain::types::RecommendedAction;
use crate::engine::expected_value::ExpectedValueCalculator;
use crate::i18n;
use crate::repository::decision_log_repo::DecisionLogRepository;

const DEFAULT_ACTOR: &str = "system";

// ==========================================
// DecisionApi - 决策 API
// ==========================================
pub struct DecisionApi {
    config: Arc<dyn DecisionConfigReader>,
    log_repo: Option<Arc<DecisionLogRepository>>,
}

impl DecisionApi {
    /// 创建 DecisionApi
    ///
    /// # 参数
    /// - config: 配置读取器
    /// - log_repo: 决策日志仓储（None 时不支持落库与历史查询）
    pub fn new(
        config: Arc<dyn DecisionConfigReader>,
        log_repo: Option<Arc<DecisionLogRepository>>,
    ) -> Self {
        Self { config, log_repo }
    }

    /// 按当前配置构造计算器
    async fn calculator(&self) -> ApiResult<ExpectedValueCalculator> {
        let model = self.config.load_decision_model().await?;
        let policy = self.config.get_sugar_sum_policy().await?;
        Ok(ExpectedValueCalculator::try_new(model)?.with_sugar_policy(policy))
    }

    fn repo(&self) -> ApiResult<&DecisionLogRepository> {
        self.log_repo
            .as_deref()
            .ok_or_else(|| ApiError::InternalError("未配置决策日志仓储".to_string()))
    }

    /// 评估一次采收决策
    ///
    /// # 返回
    /// - Ok(EvaluateDecisionResponse): 结论、分解与展示文本
    /// - Err(ApiError::InvalidInput): 输入越界
    #[instrument(skip(self, request), fields(record = request.record))]
    pub async fn evaluate(
        &self,
        request: EvaluateDecisionRequest,
    ) -> ApiResult<EvaluateDecisionResponse> {
        let beliefs = request.resolve_beliefs(&self.config.get_belief_defaults().await?);
        let calibration = request.resolve_calibration(&self.config.get_calibration().await?);

        let calculator = self.calculator().await?;
        let breakdown = calculator.evaluate_with_breakdown(&beliefs, &calibration)?;
        let result = breakdown.result();

        let decision_id = if request.record {
            let actor = request.actor.as_deref().unwrap_or(DEFAULT_ACTOR);
            let entry =
                DecisionLogEntry::new(actor, beliefs, calibration, &result, breakdown.baseline);
            Some(self.repo()?.insert(&entry)?)
        } else {
            None
        };

        info!(
            expected_value = result.expected_value,
            action = %result.action,
            decision_id = decision_id.as_deref().unwrap_or("-"),
            "决策评估完成"
        );

        Ok(EvaluateDecisionResponse {
            beliefs,
            calibration,
            result,
            e_value_text: i18n::format_e_value(result.expected_value),
            action_text: i18n::format_action(result.action),
            breakdown,
            decision_id,
        })
    }

    /// 查询默认输入与基线
    pub async fn get_defaults(&self) -> ApiResult<DecisionDefaultsResponse> {
        Ok(DecisionDefaultsResponse {
            beliefs: self.config.get_belief_defaults().await?,
            calibration: self.config.get_calibration().await?,
            baseline: self.config.load_decision_model().await?.baseline,
            sugar_sum_policy: self.config.get_sugar_sum_policy().await?,
        })
    }

    /// 最近的决策记录（按时间倒序）
    pub fn list_recent_decisions(&self, limit: usize) -> ApiResult<Vec<DecisionLogEntry>> {
        Ok(self.repo()?.list_recent(limit)?)
    }

    /// 按建议动作筛选决策记录
    ///
    /// # 参数
    /// - action: "Wait" / "Harvest Now"（大小写不敏感）
    pub fn list_decisions_by_action(&self, action: &str) -> ApiResult<Vec<DecisionLogEntry>> {
        let action = RecommendedAction::parse(action)
            .ok_or_else(|| ApiError::ValidationError(format!("未知的建议动作: {}", action)))?;
        Ok(self.repo()?.list_by_action(action)?)
    }

    /// 按ID查询单条决策记录
    pub fn get_decision(&self, decision_id: &str) -> ApiResult<DecisionLogEntry> {
        self.repo()?
            .find_by_id(decision_id)?
            .ok_or_else(|| ApiError::NotFound(format!("决策记录(id={})不存在", decision_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_manager::{config_keys, ConfigManager};
    use crate::db::open_in_memory_connection;
    use std::sync::Mutex;

    fn setup_api() -> (DecisionApi, Arc<ConfigManager>) {
        let conn = Arc::new(Mutex::new(open_in_memory_connection().unwrap()));
        let config = Arc::new(ConfigManager::from_connection(conn.clone()).unwrap());
        let repo = Arc::new(DecisionLogRepository::new(conn));
        (DecisionApi::new(config.clone(), Some(repo)), config)
    }

    #[tokio::test]
    async fn test_evaluate_with_defaults() {
        let (api, _) = setup_api();

        let response = api.evaluate(EvaluateDecisionRequest::default()).await.unwrap();

        assert!((response.result.expected_value - 917_160.0).abs() < 1e-6);
        assert_eq!(response.result.action, RecommendedAction::HarvestNow);
        assert!(response.decision_id.is_none());
    }

    #[tokio::test]
    async fn test_evaluate_rejects_out_of_range() {
        let (api, _) = setup_api();
        let request = EvaluateDecisionRequest {
            sensitivity: Some(1.2),
            ..Default::default()
        };

        let err = api.evaluate(request).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "sensitivity"));
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let (api, _) = setup_api();
        let request = EvaluateDecisionRequest {
            record: true,
            actor: Some("vintner".to_string()),
            ..Default::default()
        };

        let response = api.evaluate(request).await.unwrap();
        let id = response.decision_id.unwrap();

        let stored = api.get_decision(&id).unwrap();
        assert_eq!(stored.actor, "vintner");
        assert_eq!(api.list_recent_decisions(10).unwrap().len(), 1);
        assert_eq!(api.list_decisions_by_action("harvest now").unwrap().len(), 1);
        assert!(api.list_decisions_by_action("Wait").unwrap().is_empty());
        assert!(api.list_decisions_by_action("maybe").is_err());
    }

    #[tokio::test]
    async fn test_configured_baseline_changes_action() {
        let (api, config) = setup_api();
        config.set_config_value(config_keys::BASELINE, "900000").unwrap();

        let response = api.evaluate(EvaluateDecisionRequest::default()).await.unwrap();
        assert_eq!(response.result.action, RecommendedAction::Wait);
        assert_eq!(api.get_defaults().await.unwrap().baseline, 900_000.0);
    }

    #[tokio::test]
    async fn test_history_without_repository() {
        let conn = Arc::new(Mutex::new(open_in_memory_connection().unwrap()));
        let config = Arc::new(ConfigManager::from_connection(conn).unwrap());
        let api = DecisionApi::new(config, None);

        assert!(api.list_recent_decisions(5).is_err());
        let request = EvaluateDecisionRequest {
            record: true,
            ..Default::default()
        };
        assert!(api.evaluate(request).await.is_err());
    }
}
