// ==========================================
// 葡萄采收决策系统 - 决策日志数据仓储
// ==========================================
// 对齐: decision_log 表
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::decision::{BeliefInputs, CalibrationParams};
use crate::domain::decision_log::DecisionLogEntry;
use crate::domain::types::RecommendedAction;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const SELECT_COLUMNS: &str = r#"
    decision_id, decided_at, actor,
    prob_storm, prob_botrytis, prob_no_sugar, prob_typical_sugar, prob_high_sugar,
    sensitivity, specificity, expected_value, action, baseline
"#;

// ==========================================
// DecisionLogRepository - 决策日志仓储
// ==========================================
pub struct DecisionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DecisionLogRepository {
    /// 创建新的决策日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入决策日志
    ///
    /// # 返回
    /// - `Ok(decision_id)`: 成功插入
    pub fn insert(&self, entry: &DecisionLogEntry) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO decision_log (
                decision_id, decided_at, actor,
                prob_storm, prob_botrytis, prob_no_sugar, prob_typical_sugar, prob_high_sugar,
                sensitivity, specificity, expected_value, action, baseline
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                entry.decision_id,
                entry.decided_at.format(TS_FORMAT).to_string(),
                entry.actor,
                entry.beliefs.prob_storm,
                entry.beliefs.prob_botrytis,
                entry.beliefs.prob_no_sugar,
                entry.beliefs.prob_typical_sugar,
                entry.beliefs.prob_high_sugar,
                entry.calibration.sensitivity,
                entry.calibration.specificity,
                entry.expected_value,
                entry.action.label(),
                entry.baseline,
            ],
        )?;

        Ok(entry.decision_id.clone())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 ID 查询
    pub fn find_by_id(&self, decision_id: &str) -> RepositoryResult<Option<DecisionLogEntry>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM decision_log WHERE decision_id = ?1", SELECT_COLUMNS);

        let raw = conn
            .query_row(&sql, params![decision_id], map_row)
            .optional()?;

        raw.map(RawDecisionRow::into_entry).transpose()
    }

    /// 最近 N 条（按时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<DecisionLogEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM decision_log ORDER BY decided_at DESC, rowid DESC LIMIT ?1",
            SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], map_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    /// 按建议动作过滤
    pub fn list_by_action(&self, action: RecommendedAction) -> RepositoryResult<Vec<DecisionLogEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM decision_log WHERE action = ?1 ORDER BY decided_at DESC, rowid DESC",
            SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![action.label()], map_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    /// 日志总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM decision_log", [], |row| row.get(0))?;
        Ok(n)
    }
}

// ==========================================
// 行映射
// ==========================================

struct RawDecisionRow {
    decision_id: String,
    decided_at: String,
    actor: String,
    beliefs: BeliefInputs,
    calibration: CalibrationParams,
    expected_value: f64,
    action: String,
    baseline: f64,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<RawDecisionRow> {
    Ok(RawDecisionRow {
        decision_id: row.get(0)?,
        decided_at: row.get(1)?,
        actor: row.get(2)?,
        beliefs: BeliefInputs::new(row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?, row.get(7)?),
        calibration: CalibrationParams::new(row.get(8)?, row.get(9)?),
        expected_value: row.get(10)?,
        action: row.get(11)?,
        baseline: row.get(12)?,
    })
}

impl RawDecisionRow {
    fn into_entry(self) -> RepositoryResult<DecisionLogEntry> {
        let decided_at = NaiveDateTime::parse_from_str(&self.decided_at, TS_FORMAT).map_err(|e| {
            RepositoryError::InvalidStoredValue {
                field: "decided_at".to_string(),
                message: format!("{} ({})", e, self.decided_at),
            }
        })?;

        let action = RecommendedAction::parse(&self.action).ok_or_else(|| {
            RepositoryError::InvalidStoredValue {
                field: "action".to_string(),
                message: format!("未知建议动作: {}", self.action),
            }
        })?;

        Ok(DecisionLogEntry {
            decision_id: self.decision_id,
            decided_at,
            actor: self.actor,
            beliefs: self.beliefs,
            calibration: self.calibration,
            expected_value: self.expected_value,
            action,
            baseline: self.baseline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory_connection;
    use crate::domain::decision::DecisionResult;

    fn setup_repo() -> DecisionLogRepository {
        let conn = open_in_memory_connection().unwrap();
        DecisionLogRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn sample_entry(expected_value: f64, action: RecommendedAction) -> DecisionLogEntry {
        DecisionLogEntry::new(
            "tester",
            BeliefInputs::default(),
            CalibrationParams::default(),
            &DecisionResult {
                expected_value,
                action,
            },
            928_500.0,
        )
    }

    #[test]
    fn test_insert_and_find() {
        let repo = setup_repo();
        let entry = sample_entry(917_160.0, RecommendedAction::HarvestNow);
        let id = repo.insert(&entry).unwrap();

        let found = repo.find_by_id(&id).unwrap().expect("entry should exist");
        assert_eq!(found.decision_id, entry.decision_id);
        assert_eq!(found.action, RecommendedAction::HarvestNow);
        assert_eq!(found.beliefs, BeliefInputs::default());
        assert_eq!(found.decided_at, entry.decided_at);
        assert_eq!(found.expected_value, 917_160.0);
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let repo = setup_repo();
        let entry = sample_entry(917_160.0, RecommendedAction::HarvestNow);
        repo.insert(&entry).unwrap();

        let err = repo.insert(&entry).unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateDecision(_)));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_find_missing_returns_none() {
        let repo = setup_repo();
        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_recent_and_by_action() {
        let repo = setup_repo();
        repo.insert(&sample_entry(1_000_000.0, RecommendedAction::Wait)).unwrap();
        repo.insert(&sample_entry(900_000.0, RecommendedAction::HarvestNow)).unwrap();
        repo.insert(&sample_entry(1_200_000.0, RecommendedAction::Wait)).unwrap();

        assert_eq!(repo.count().unwrap(), 3);
        assert_eq!(repo.list_recent(2).unwrap().len(), 2);
        assert_eq!(repo.list_by_action(RecommendedAction::Wait).unwrap().len(), 2);
        assert_eq!(repo.list_by_action(RecommendedAction::HarvestNow).unwrap().len(), 1);
    }
}
