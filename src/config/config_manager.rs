// ==========================================
// 葡萄采收决策系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope,当前仅 global)
// ==========================================

use crate::config::decision_config_trait::DecisionConfigReader;
use crate::config::decision_model::{DecisionModel, DEFAULT_BASELINE};
use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::domain::decision::{BeliefInputs, CalibrationParams};
use crate::domain::types::SugarSumPolicy;
use crate::engine::validation::validate_probability;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const BASELINE: &str = "decision/baseline";
    pub const SENSITIVITY: &str = "decision/sensitivity";
    pub const SPECIFICITY: &str = "decision/specificity";
    pub const BELIEF_DEFAULTS: &str = "decision/belief_defaults";
    pub const SUGAR_SUM_POLICY: &str = "decision/sugar_sum_policy";
    pub const DECISION_MODEL: &str = "decision/model";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA 与建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&conn_guard)?;
            ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供 CLI 复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 写入决策模型（先校验）
    pub fn set_decision_model(&self, model: &DecisionModel) -> ConfigResult<()> {
        model.validate()?;
        self.set_config_value(config_keys::DECISION_MODEL, &model.to_json_string())
    }

    /// 写入主观概率默认值（先校验范围）
    pub fn set_belief_defaults(&self, beliefs: &BeliefInputs) -> ConfigResult<()> {
        for (field, value) in beliefs.named_fields() {
            validate_probability(field, value)?;
        }
        self.set_config_value(config_keys::BELIEF_DEFAULTS, &serde_json::to_string(beliefs)?)
    }

    /// 从 config_kv 表读取并解析为 f64,缺失时返回默认值
    fn get_f64_or_default(&self, key: &str, default: f64) -> ConfigResult<f64> {
        match self.get_config_value(key)? {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("配置值格式错误 (key: {}, value: {}): {}", key, raw, e).into()),
            None => Ok(default),
        }
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 导出当前配置,便于复现一次决策
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖现有的 global 配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            // 元信息键不回写
            if key.starts_with("__meta_") {
                continue;
            }
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }
}

// ==========================================
// DecisionConfigReader 实现
// ==========================================
#[async_trait]
impl DecisionConfigReader for ConfigManager {
    async fn get_baseline(&self) -> ConfigResult<f64> {
        self.get_f64_or_default(config_keys::BASELINE, DEFAULT_BASELINE)
    }

    async fn get_calibration(&self) -> ConfigResult<CalibrationParams> {
        let sensitivity = self.get_f64_or_default(
            config_keys::SENSITIVITY,
            CalibrationParams::DEFAULT_SENSITIVITY,
        )?;
        let specificity = self.get_f64_or_default(
            config_keys::SPECIFICITY,
            CalibrationParams::DEFAULT_SPECIFICITY,
        )?;
        Ok(CalibrationParams::new(sensitivity, specificity))
    }

    async fn get_belief_defaults(&self) -> ConfigResult<BeliefInputs> {
        match self.get_config_value(config_keys::BELIEF_DEFAULTS)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(BeliefInputs::default()),
        }
    }

    async fn get_sugar_sum_policy(&self) -> ConfigResult<SugarSumPolicy> {
        Ok(self
            .get_config_value(config_keys::SUGAR_SUM_POLICY)?
            .map(|raw| SugarSumPolicy::from_str(&raw))
            .unwrap_or_default())
    }

    async fn load_decision_model(&self) -> ConfigResult<DecisionModel> {
        let model = match self.get_config_value(config_keys::DECISION_MODEL)? {
            Some(raw) => DecisionModel::from_json_str(&raw)?,
            None => DecisionModel::default(),
        };

        // 单独配置的基线优先
        match self.get_config_value(config_keys::BASELINE)? {
            Some(_) => {
                let baseline = self.get_baseline().await?;
                Ok(model.with_baseline(baseline)?)
            }
            None => Ok(model),
        }
    }
}
