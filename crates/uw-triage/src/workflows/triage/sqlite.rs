//! SQLite-backed [`TriageRepository`].
//!
//! Each operation acquires its own pooled connection and returns it on drop, including on
//! error paths. Process replacement runs in a transaction so readers never observe a
//! half-replaced result set.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use super::domain::{NewSubmission, Submission, SubmissionId};
use super::pipeline::PredictionOutcome;
use super::predictions::{FeatureAttribution, VulnerabilityReport};
use super::repository::{LeaderboardRow, ProcessResultRecord, RepositoryError, TriageRepository};

#[derive(Debug, Clone)]
pub struct SqliteTriageStore {
    pool: SqlitePool,
}

impl SqliteTriageStore {
    /// Opens (creating if needed) the database at `url` and brings the schema up to date.
    pub async fn connect(url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init().await?;
        info!(%url, "opened triage store");
        Ok(store)
    }

    /// Private in-memory database; a single long-lived connection keeps it alive.
    pub async fn in_memory() -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Idempotent schema bootstrap followed by additive column migrations.
    pub async fn init(&self) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                underwriter_name TEXT NOT NULL,
                prioritized_ids TEXT NOT NULL,
                discarded_ids TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS process_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                submission_id INTEGER REFERENCES submissions(id),
                property_id INTEGER NOT NULL,
                ai_risk TEXT,
                quote_propensity REAL,
                total_risk_score REAL,
                shap_values TEXT,
                vulnerability_data TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;

        add_column_if_missing(&mut conn, "submissions", "score", "REAL DEFAULT NULL").await?;

        Ok(())
    }
}

async fn add_column_if_missing(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<(), RepositoryError> {
    let present: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_one(&mut *conn)
            .await?;

    if present == 0 {
        sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))
            .execute(&mut *conn)
            .await?;
        info!(table, column, "added column");
    }

    Ok(())
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: i64,
    underwriter_name: String,
    prioritized_ids: String,
    discarded_ids: String,
    created_at: Option<NaiveDateTime>,
    score: Option<f64>,
}

impl SubmissionRow {
    fn into_submission(self) -> Result<Submission, RepositoryError> {
        let id = self.id;
        let decode = move |raw: &str, column: &str| {
            serde_json::from_str::<Vec<String>>(raw).map_err(|err| {
                RepositoryError::Corrupt(format!("submission {id} {column}: {err}"))
            })
        };

        Ok(Submission {
            id: SubmissionId(id),
            prioritized_ids: decode(&self.prioritized_ids, "prioritized_ids")?,
            discarded_ids: decode(&self.discarded_ids, "discarded_ids")?,
            underwriter_name: self.underwriter_name,
            created_at: self.created_at,
            score: self.score,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProcessRow {
    submission_id: i64,
    property_id: i64,
    ai_risk: Option<String>,
    quote_propensity: Option<f64>,
    total_risk_score: Option<f64>,
    shap_values: Option<String>,
    vulnerability_data: Option<String>,
}

impl ProcessRow {
    fn into_record(self) -> ProcessResultRecord {
        let shap_values = match self.shap_values.as_deref().map(str::trim) {
            None | Some("") => Vec::new(),
            Some(raw) => serde_json::from_str::<Vec<FeatureAttribution>>(raw).unwrap_or_else(|err| {
                warn!(property_id = self.property_id, error = %err, "ignoring unreadable shap_values");
                Vec::new()
            }),
        };

        ProcessResultRecord {
            submission_id: SubmissionId(self.submission_id),
            property_id: self.property_id,
            ai_risk: self.ai_risk,
            quote_propensity: self.quote_propensity,
            total_risk_score: self.total_risk_score,
            shap_values,
            vulnerability_data: decode_vulnerability(self.property_id, self.vulnerability_data.as_deref()),
        }
    }
}

/// `None` for absent, blank, or `{}` blobs; unreadable blobs are logged and dropped.
fn decode_vulnerability(property_id: i64, raw: Option<&str>) -> Option<VulnerabilityReport> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(property_id, error = %err, "ignoring unreadable vulnerability_data");
            return None;
        }
    };

    match &value {
        serde_json::Value::Object(map) if map.is_empty() => return None,
        serde_json::Value::Null => return None,
        _ => {}
    }

    serde_json::from_value(value)
        .map_err(|err| warn!(property_id, error = %err, "ignoring malformed vulnerability_data"))
        .ok()
}

#[derive(sqlx::FromRow)]
struct LeaderboardRecord {
    id: i64,
    underwriter_name: String,
    score: f64,
    created_at: Option<NaiveDateTime>,
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|err| RepositoryError::Corrupt(err.to_string()))
}

const SUBMISSION_COLUMNS: &str =
    "id, underwriter_name, prioritized_ids, discarded_ids, created_at, score";

#[async_trait]
impl TriageRepository for SqliteTriageStore {
    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, RepositoryError> {
        let prioritized = encode(&submission.prioritized_ids)?;
        let discarded = encode(&submission.discarded_ids)?;

        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(
            "INSERT INTO submissions (underwriter_name, prioritized_ids, discarded_ids) VALUES (?, ?, ?)",
        )
        .bind(&submission.underwriter_name)
        .bind(prioritized)
        .bind(discarded)
        .execute(&mut *conn)
        .await?;

        let id = SubmissionId(result.last_insert_rowid());
        info!(submission_id = %id, underwriter = %submission.underwriter_name, "recorded submission");

        Ok(Submission {
            id,
            underwriter_name: submission.underwriter_name,
            prioritized_ids: submission.prioritized_ids,
            discarded_ids: submission.discarded_ids,
            created_at: None,
            score: None,
        })
    }

    async fn fetch_submission(
        &self,
        id: SubmissionId,
    ) -> Result<Option<Submission>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?"
        ))
        .bind(id.0)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(SubmissionRow::into_submission).transpose()
    }

    async fn latest_submission(&self) -> Result<Option<Submission>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(&mut *conn)
        .await?;

        row.map(SubmissionRow::into_submission).transpose()
    }

    async fn replace_process_results(
        &self,
        id: SubmissionId,
        outcomes: &[PredictionOutcome],
    ) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM process_results WHERE submission_id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for outcome in outcomes {
            let vulnerability = match &outcome.vulnerability_data {
                Some(report) => encode(report)?,
                None => "{}".to_string(),
            };

            sqlx::query(
                r#"
                INSERT INTO process_results
                    (submission_id, property_id, ai_risk, quote_propensity,
                     total_risk_score, shap_values, vulnerability_data)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(id.0)
            .bind(outcome.property_id)
            .bind(&outcome.ai_risk)
            .bind(outcome.quote_propensity)
            .bind(outcome.total_risk_score)
            .bind(encode(&outcome.shap_values)?)
            .bind(vulnerability)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(submission_id = %id, removed, inserted = outcomes.len(), "replaced process results");
        Ok(outcomes.len())
    }

    async fn process_results(
        &self,
        id: SubmissionId,
    ) -> Result<Vec<ProcessResultRecord>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, ProcessRow>(
            r#"
            SELECT submission_id, property_id, ai_risk, quote_propensity,
                   total_risk_score, shap_values, vulnerability_data
            FROM process_results
            WHERE submission_id = ?
            ORDER BY property_id, id
            "#,
        )
        .bind(id.0)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(ProcessRow::into_record).collect())
    }

    async fn record_score(&self, id: SubmissionId, score: f64) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let updated = sqlx::query("UPDATE submissions SET score = ? WHERE id = ?")
            .bind(score)
            .bind(id.0)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardRow>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, LeaderboardRecord>(
            r#"
            SELECT id, underwriter_name, score, created_at
            FROM submissions
            WHERE score IS NOT NULL
            ORDER BY score DESC, created_at ASC, id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| LeaderboardRow {
                submission_id: SubmissionId(row.id),
                underwriter_name: row.underwriter_name,
                score: row.score,
                created_at: row.created_at,
            })
            .collect())
    }
}
