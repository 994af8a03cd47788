// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// This module provides a unified StorageBackend enum that can work with
// either PostgreSQL (production) or in-memory (dev mode) storage. The
// coordinator still consumes it through the SosStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use mayday_core::{
    CreateSos, InMemorySosStore, ListOrder, Result, SosError, SosEvent, SosStatus, SosStore,
};

use crate::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory store (dev mode)
    InMemory(Arc<InMemorySosStore>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL and make sure
    /// the schema exists.
    pub async fn postgres(database_url: &str) -> anyhow::Result<Self> {
        let db = Database::from_url(database_url).await?;
        db.ensure_schema().await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemorySosStore::new()))
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Get the PostgreSQL pool if using PostgreSQL backend
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(db) => Some(db.pool()),
            Self::InMemory(_) => None,
        }
    }
}

fn storage_err(e: anyhow::Error) -> SosError {
    SosError::storage(e.to_string())
}

#[async_trait]
impl SosStore for StorageBackend {
    async fn create(&self, input: CreateSos) -> Result<SosEvent> {
        match self {
            Self::Postgres(db) => db.create_sos(input).await.map_err(storage_err),
            Self::InMemory(db) => db.create(input).await,
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<SosEvent>> {
        match self {
            Self::Postgres(db) => db.get_sos(id).await.map_err(storage_err),
            Self::InMemory(db) => db.get(id).await,
        }
    }

    async fn accept_if_pending(
        &self,
        id: Uuid,
        accepted_by: &str,
        accepted_at: DateTime<Utc>,
    ) -> Result<Option<SosEvent>> {
        match self {
            Self::Postgres(db) => db
                .accept_sos_if_pending(id, accepted_by, accepted_at)
                .await
                .map_err(storage_err),
            Self::InMemory(db) => db.accept_if_pending(id, accepted_by, accepted_at).await,
        }
    }

    async fn end_if_active(&self, id: Uuid, ended_at: DateTime<Utc>) -> Result<Option<SosEvent>> {
        match self {
            Self::Postgres(db) => db.end_sos_if_active(id, ended_at).await.map_err(storage_err),
            Self::InMemory(db) => db.end_if_active(id, ended_at).await,
        }
    }

    async fn list_by_status(
        &self,
        statuses: &[SosStatus],
        order: ListOrder,
        limit: Option<i64>,
    ) -> Result<Vec<SosEvent>> {
        match self {
            Self::Postgres(db) => db
                .list_sos_by_status(statuses, order, limit)
                .await
                .map_err(storage_err),
            Self::InMemory(db) => db.list_by_status(statuses, order, limit).await,
        }
    }
}
