//! Record store backing the dashboard.
//!
//! SQLite plays the part of the hosted document collection: writes are
//! append-only and stamped at write time, reads are scoped to the creating
//! user and ordered newest first. Records are never updated or deleted.

use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{Vitals, VitalsRecord};

/// Append-only store of vitals records, one row per observation.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Connect to the database, creating the file and schema when missing.
    pub async fn connect(db_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::initialize_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Get a handle on the underlying connection pool.
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS vitals_records (
                id TEXT PRIMARY KEY,
                patient_id TEXT NOT NULL,
                pressure TEXT NOT NULL,
                hr INTEGER,
                spo2 REAL,
                note TEXT,
                created_at INTEGER,
                created_by TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_vitals_records_owner
             ON vitals_records (created_by, created_at DESC)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Append one observation for `user_id`, stamped with the current time.
    ///
    /// The caller guarantees an authenticated user id; unauthenticated
    /// writes are rejected before this is reached.
    #[instrument(skip(self, vitals, patient_id), fields(patient_id = %patient_id))]
    pub async fn add_record(
        &self,
        user_id: &str,
        patient_id: &str,
        vitals: Vitals,
    ) -> Result<VitalsRecord> {
        let record = VitalsRecord {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            vitals,
            created_at: Some(Utc::now()),
            created_by: user_id.to_string(),
        };

        sqlx::query(
            "INSERT INTO vitals_records
                (id, patient_id, pressure, hr, spo2, note, created_at, created_by)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.patient_id)
        .bind(&record.vitals.pressure)
        .bind(record.vitals.hr)
        .bind(record.vitals.spo2)
        .bind(&record.vitals.note)
        .bind(record.created_at.map(|t| t.timestamp_millis()))
        .bind(&record.created_by)
        .execute(&self.pool)
        .await?;

        info!("Vitals recorded for patient {}", record.patient_id);
        Ok(record)
    }

    /// All records created by `user_id`, newest first. Rows without a
    /// timestamp sort last.
    #[instrument(skip(self))]
    pub async fn records_for(&self, user_id: &str) -> Result<Vec<VitalsRecord>> {
        let rows = sqlx::query(
            "SELECT id, patient_id, pressure, hr, spo2, note, created_at, created_by
             FROM vitals_records
             WHERE created_by = ?
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }

    /// One record by id, scoped to its owner. `None` when the record does
    /// not exist or belongs to another user.
    #[instrument(skip(self))]
    pub async fn record_for(&self, user_id: &str, record_id: &str) -> Result<Option<VitalsRecord>> {
        let row = sqlx::query(
            "SELECT id, patient_id, pressure, hr, spo2, note, created_at, created_by
             FROM vitals_records
             WHERE id = ? AND created_by = ?",
        )
        .bind(record_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }
}

fn row_to_record(row: &SqliteRow) -> Result<VitalsRecord> {
    let created_at: Option<i64> = row.try_get("created_at")?;
    Ok(VitalsRecord {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        vitals: Vitals {
            pressure: row.try_get("pressure")?,
            hr: row.try_get("hr")?,
            spo2: row.try_get("spo2")?,
            note: row.try_get("note")?,
        },
        created_at: created_at.and_then(DateTime::from_timestamp_millis),
        created_by: row.try_get("created_by")?,
    })
}
