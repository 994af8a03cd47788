// Repository layer for database operations
//
// The accept and end paths are single guarded UPDATE statements; the WHERE
// clause carries the state-machine guard, so the database serializes racing
// callers and at most one of them gets the row back.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mayday_core::{CreateSos, ListOrder, SosEvent, SosStatus};

use crate::models::SosEventRow;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the sos_events table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sos_events (
                id UUID PRIMARY KEY,
                station_id TEXT NOT NULL,
                station_name TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('pending', 'accepted', 'ended')),
                accepted_by TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                accepted_at TIMESTAMPTZ,
                ended_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS sos_events_status_created_idx
            ON sos_events (status, created_at)
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::debug!("sos_events schema ensured");
        Ok(())
    }

    pub async fn create_sos(&self, input: CreateSos) -> Result<SosEvent> {
        let row = sqlx::query_as::<_, SosEventRow>(
            r#"
            INSERT INTO sos_events (id, station_id, station_name, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, station_id, station_name, status, accepted_by, created_at, accepted_at, ended_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.station_id)
        .bind(&input.station_name)
        .fetch_one(&self.pool)
        .await?;

        row.into_event()
    }

    pub async fn get_sos(&self, id: Uuid) -> Result<Option<SosEvent>> {
        let row = sqlx::query_as::<_, SosEventRow>(
            r#"
            SELECT id, station_id, station_name, status, accepted_by, created_at, accepted_at, ended_at
            FROM sos_events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SosEventRow::into_event).transpose()
    }

    /// Conditional transition `pending -> accepted` in one statement.
    /// Zero rows updated means the guard did not match.
    pub async fn accept_sos_if_pending(
        &self,
        id: Uuid,
        accepted_by: &str,
        accepted_at: DateTime<Utc>,
    ) -> Result<Option<SosEvent>> {
        let row = sqlx::query_as::<_, SosEventRow>(
            r#"
            UPDATE sos_events
            SET status = 'accepted', accepted_by = $2, accepted_at = $3
            WHERE id = $1 AND status = 'pending'
            RETURNING id, station_id, station_name, status, accepted_by, created_at, accepted_at, ended_at
            "#,
        )
        .bind(id)
        .bind(accepted_by)
        .bind(accepted_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SosEventRow::into_event).transpose()
    }

    /// Conditional transition to `ended` for any non-terminal row.
    /// COALESCE keeps ended_at from moving if it was already set.
    pub async fn end_sos_if_active(
        &self,
        id: Uuid,
        ended_at: DateTime<Utc>,
    ) -> Result<Option<SosEvent>> {
        let row = sqlx::query_as::<_, SosEventRow>(
            r#"
            UPDATE sos_events
            SET status = 'ended', ended_at = COALESCE(ended_at, $2)
            WHERE id = $1 AND status <> 'ended'
            RETURNING id, station_id, station_name, status, accepted_by, created_at, accepted_at, ended_at
            "#,
        )
        .bind(id)
        .bind(ended_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SosEventRow::into_event).transpose()
    }

    pub async fn list_sos_by_status(
        &self,
        statuses: &[SosStatus],
        order: ListOrder,
        limit: Option<i64>,
    ) -> Result<Vec<SosEvent>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
        let order_sql = match order {
            ListOrder::CreatedAsc => "ASC",
            ListOrder::CreatedDesc => "DESC",
        };
        // uuid v7 ids tie-break rows created in the same instant
        let query = format!(
            r#"
            SELECT id, station_id, station_name, status, accepted_by, created_at, accepted_at, ended_at
            FROM sos_events
            WHERE status = ANY($1)
            ORDER BY created_at {order_sql}, id {order_sql}
            LIMIT $2
            "#
        );

        let rows = sqlx::query_as::<_, SosEventRow>(&query)
            .bind(&statuses)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(SosEventRow::into_event).collect()
    }
}

// Note: exercising these queries requires a database connection; unit tests
// for the guard semantics live against the in-memory store in mayday-core,
// and the row mapping is covered in models.rs.
