//! SQLite-backed feature state store.
//!
//! Implements the `StateStore` port over the `feature_state` table. Strategy
//! parameters are kept as a JSON object in `parameters_json`.

use std::collections::BTreeMap;
use std::sync::Arc;

use featuregate_core::StateStore;
use featuregate_domain::{FeatureState, Result};
use rusqlite::{params, OptionalExtension, Row};

use super::manager::{map_sql_error, DbManager};
use crate::errors::InfraError;

/// Durable [`StateStore`] with upsert semantics.
#[derive(Debug, Clone)]
pub struct SqliteStateStore {
    db: Arc<DbManager>,
}

impl SqliteStateStore {
    /// Create a store over an already migrated database.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Arc<DbManager> {
        &self.db
    }
}

impl StateStore for SqliteStateStore {
    fn get(&self, feature_name: &str) -> Result<Option<FeatureState>> {
        let conn = self.db.get_connection()?;
        let row = conn
            .query_row(
                "SELECT feature_name, enabled, strategy_id, parameters_json
                 FROM feature_state
                 WHERE feature_name = ?1",
                params![feature_name],
                read_row,
            )
            .optional()
            .map_err(map_sql_error)?;

        row.map(StoredRow::into_state).transpose()
    }

    fn put(&self, state: &FeatureState) -> Result<()> {
        let parameters_json =
            serde_json::to_string(&state.parameters).map_err(InfraError::from)?;
        let now = chrono::Utc::now().timestamp();

        let conn = self.db.get_connection()?;
        conn.execute(
            "INSERT INTO feature_state (feature_name, enabled, strategy_id, parameters_json, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(feature_name) DO UPDATE SET
                enabled = excluded.enabled,
                strategy_id = excluded.strategy_id,
                parameters_json = excluded.parameters_json,
                updated_at = excluded.updated_at",
            params![
                state.feature_name,
                i64::from(state.enabled),
                state.strategy_id,
                parameters_json,
                now
            ],
        )
        .map_err(map_sql_error)?;

        tracing::debug!(feature = %state.feature_name, enabled = state.enabled, "feature state stored");
        Ok(())
    }

    fn list(&self) -> Result<Vec<FeatureState>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT feature_name, enabled, strategy_id, parameters_json
                 FROM feature_state
                 ORDER BY feature_name",
            )
            .map_err(map_sql_error)?;

        let rows = stmt
            .query_map(params![], read_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;

        rows.into_iter().map(StoredRow::into_state).collect()
    }
}

struct StoredRow {
    feature_name: String,
    enabled: bool,
    strategy_id: Option<String>,
    parameters_json: String,
}

impl StoredRow {
    fn into_state(self) -> Result<FeatureState> {
        let parameters: BTreeMap<String, String> =
            serde_json::from_str(&self.parameters_json).map_err(InfraError::from)?;
        Ok(FeatureState {
            feature_name: self.feature_name,
            enabled: self.enabled,
            strategy_id: self.strategy_id,
            parameters,
        })
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        feature_name: row.get(0)?,
        enabled: row.get::<_, i64>(1)? != 0,
        strategy_id: row.get(2)?,
        parameters_json: row.get(3)?,
    })
}
