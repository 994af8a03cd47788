// In-memory SosStore for dev mode and tests
// Decision: parking_lot for thread-safe access
//
// The guard check and the mutation share one write-lock critical section,
// mirroring the single-statement guarded UPDATE the Postgres backend uses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::Result;
use crate::sos::{room_name_for, CreateSos, ListOrder, SosEvent, SosStatus};
use crate::traits::SosStore;

/// In-memory event store. All data is lost on restart.
#[derive(Default)]
pub struct InMemorySosStore {
    events: RwLock<HashMap<Uuid, SosEvent>>,
}

impl InMemorySosStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }
}

#[async_trait]
impl SosStore for InMemorySosStore {
    async fn create(&self, input: CreateSos) -> Result<SosEvent> {
        let id = Uuid::now_v7();
        let event = SosEvent {
            id,
            station_id: input.station_id,
            station_name: input.station_name,
            status: SosStatus::Pending,
            room_name: room_name_for(id),
            accepted_by: None,
            created_at: Self::now(),
            accepted_at: None,
            ended_at: None,
        };
        self.events.write().insert(id, event.clone());
        Ok(event)
    }

    async fn get(&self, id: Uuid) -> Result<Option<SosEvent>> {
        Ok(self.events.read().get(&id).cloned())
    }

    async fn accept_if_pending(
        &self,
        id: Uuid,
        accepted_by: &str,
        accepted_at: DateTime<Utc>,
    ) -> Result<Option<SosEvent>> {
        let mut events = self.events.write();
        match events.get_mut(&id) {
            Some(event) if event.status == SosStatus::Pending => {
                event.status = SosStatus::Accepted;
                event.accepted_by = Some(accepted_by.to_string());
                event.accepted_at = Some(accepted_at);
                Ok(Some(event.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn end_if_active(&self, id: Uuid, ended_at: DateTime<Utc>) -> Result<Option<SosEvent>> {
        let mut events = self.events.write();
        match events.get_mut(&id) {
            Some(event) if event.status != SosStatus::Ended => {
                event.status = SosStatus::Ended;
                if event.ended_at.is_none() {
                    event.ended_at = Some(ended_at);
                }
                Ok(Some(event.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_by_status(
        &self,
        statuses: &[SosStatus],
        order: ListOrder,
        limit: Option<i64>,
    ) -> Result<Vec<SosEvent>> {
        let mut matched: Vec<SosEvent> = self
            .events
            .read()
            .values()
            .filter(|event| statuses.contains(&event.status))
            .cloned()
            .collect();
        // uuid v7 ids tie-break events created in the same instant
        matched.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        if order == ListOrder::CreatedDesc {
            matched.reverse();
        }
        if let Some(limit) = limit {
            matched.truncate(limit.max(0) as usize);
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(station: &str) -> CreateSos {
        CreateSos {
            station_id: station.to_string(),
            station_name: format!("Station {station}"),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_room_name() {
        let store = InMemorySosStore::new();
        let event = store.create(input("ST001")).await.unwrap();
        assert_eq!(event.status, SosStatus::Pending);
        assert_eq!(event.room_name, room_name_for(event.id));
        assert!(event.accepted_by.is_none());
    }

    #[tokio::test]
    async fn test_accept_guard_only_matches_pending() {
        let store = InMemorySosStore::new();
        let event = store.create(input("ST001")).await.unwrap();

        let accepted = store
            .accept_if_pending(event.id, "admin1", Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(accepted.status, SosStatus::Accepted);
        assert_eq!(accepted.accepted_by.as_deref(), Some("admin1"));

        // Second attempt finds the guard unsatisfied
        let second = store
            .accept_if_pending(event.id, "admin2", Utc::now())
            .await
            .unwrap();
        assert!(second.is_none());
        // And the winner's fields are untouched
        let stored = store.get(event.id).await.unwrap().unwrap();
        assert_eq!(stored.accepted_by.as_deref(), Some("admin1"));
    }

    #[tokio::test]
    async fn test_accept_unknown_id_misses_guard() {
        let store = InMemorySosStore::new();
        let result = store
            .accept_if_pending(Uuid::now_v7(), "admin1", Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_end_keeps_first_ended_at() {
        let store = InMemorySosStore::new();
        let event = store.create(input("ST001")).await.unwrap();

        let first = store.end_if_active(event.id, Utc::now()).await.unwrap().unwrap();
        let first_ended_at = first.ended_at.unwrap();

        // Already terminal: the guard misses and the timestamp stays put
        let second = store.end_if_active(event.id, Utc::now()).await.unwrap();
        assert!(second.is_none());
        let stored = store.get(event.id).await.unwrap().unwrap();
        assert_eq!(stored.ended_at, Some(first_ended_at));
    }

    #[tokio::test]
    async fn test_list_orders_and_caps() {
        let store = InMemorySosStore::new();
        let first = store.create(input("ST001")).await.unwrap();
        let second = store.create(input("ST002")).await.unwrap();
        let third = store.create(input("ST003")).await.unwrap();
        store.end_if_active(third.id, Utc::now()).await.unwrap();

        let pending = store
            .list_by_status(&[SosStatus::Pending], ListOrder::CreatedAsc, None)
            .await
            .unwrap();
        assert_eq!(
            pending.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );

        let history = store
            .list_by_status(
                &[SosStatus::Accepted, SosStatus::Ended],
                ListOrder::CreatedDesc,
                Some(1),
            )
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, third.id);
    }
}
