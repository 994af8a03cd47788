// Storage trait for SOS events
//
// The coordinator talks to durable storage through this trait so backends are
// pluggable:
// - Postgres for production (mayday-storage)
// - In-memory for dev mode and tests (memory module)
//
// The guarded operations are the concurrency-control surface: each one maps
// to a single atomic conditional update in the backend. There is deliberately
// no generic update method - exposing one would invite read-then-write call
// sites, reopening the race the guards exist to close.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::sos::{CreateSos, ListOrder, SosEvent, SosStatus};

#[async_trait]
pub trait SosStore: Send + Sync {
    /// Persist a new event with status `pending`.
    async fn create(&self, input: CreateSos) -> Result<SosEvent>;

    /// Fetch one event by id.
    async fn get(&self, id: Uuid) -> Result<Option<SosEvent>>;

    /// Atomically transition `pending -> accepted`, guarded on the current
    /// status being exactly `pending`.
    ///
    /// Returns the updated event, or `None` when the guard did not match
    /// (no such id, or the event is no longer pending). Exactly one of any
    /// number of concurrent callers for the same id observes `Some`.
    async fn accept_if_pending(
        &self,
        id: Uuid,
        accepted_by: &str,
        accepted_at: DateTime<Utc>,
    ) -> Result<Option<SosEvent>>;

    /// Atomically transition any non-terminal status to `ended`.
    ///
    /// Returns the updated event, or `None` when no transition happened
    /// (no such id, or the event already ended).
    async fn end_if_active(&self, id: Uuid, ended_at: DateTime<Utc>) -> Result<Option<SosEvent>>;

    /// List events whose status is one of `statuses`, ordered by creation
    /// time, optionally capped.
    async fn list_by_status(
        &self,
        statuses: &[SosStatus],
        order: ListOrder,
        limit: Option<i64>,
    ) -> Result<Vec<SosEvent>>;
}
