//! libSQL progress store. Supports local file and in-memory databases.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, params};
use tracing::{debug, info};

use super::migrations;
use super::traits::{Progress, ProgressKey, ProgressStore};
use crate::error::DatabaseError;
use crate::interaction::Interaction;

/// libSQL-backed [`ProgressStore`].
///
/// Holds a single connection reused for all operations; `libsql::Connection`
/// is safe for concurrent async use.
pub struct LibSqlProgressStore {
    _db: libsql::Database,
    conn: Connection,
}

impl LibSqlProgressStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;
        let store = Self::with_database(db).await?;
        info!(path = %path.display(), "Progress database opened");
        Ok(store)
    }

    /// In-memory database, mostly for tests.
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::with_database(db).await
    }

    async fn with_database(db: libsql::Database) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self { _db: db, conn })
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string.
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|ndt| ndt.and_utc())
}

fn opt_text(s: Option<String>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s),
        None => libsql::Value::Null,
    }
}

fn row_to_progress(row: &libsql::Row) -> Result<Progress, DatabaseError> {
    let read = |e: libsql::Error| DatabaseError::Query(format!("load_progress: {e}"));

    let user_id: String = row.get(0).map_err(read)?;
    let step_id: String = row.get(1).map_err(read)?;
    let progress: f64 = row.get(2).map_err(read)?;
    let last_interaction: Option<String> = row.get(3).ok();
    let interactions_json: String = row.get(4).map_err(read)?;

    let interactions: Vec<Interaction> = serde_json::from_str(&interactions_json)
        .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

    Ok(Progress {
        user_id,
        step_id,
        progress,
        last_interaction: last_interaction.as_deref().and_then(parse_datetime),
        interactions,
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl ProgressStore for LibSqlProgressStore {
    async fn save(&self, progress: &Progress) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let interactions = serde_json::to_string(&progress.interactions)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO journey_progress
                    (user_id, step_id, progress, last_interaction, interactions, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (user_id, step_id) DO UPDATE SET
                    progress = ?3, last_interaction = ?4, interactions = ?5, updated_at = ?6",
                params![
                    progress.user_id.clone(),
                    progress.step_id.clone(),
                    progress.progress,
                    opt_text(progress.last_interaction.map(|t| t.to_rfc3339())),
                    interactions,
                    now,
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("save_progress: {e}")))?;

        debug!(
            user_id = %progress.user_id,
            step_id = %progress.step_id,
            progress = progress.progress,
            "Progress saved"
        );
        Ok(())
    }

    async fn load(&self, key: &ProgressKey) -> Result<Option<Progress>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT user_id, step_id, progress, last_interaction, interactions
                 FROM journey_progress WHERE user_id = ?1 AND step_id = ?2",
                params![key.user_id.clone(), key.step_id.clone()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("load_progress: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_progress(&row).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("load_progress: {e}"))),
        }
    }
}
