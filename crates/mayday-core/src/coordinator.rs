// SOS lifecycle coordinator
//
// Owns the state machine: pending -> accepted -> ended, plus the direct
// pending -> ended edge (station cancels before any admin claims).
//
// Concurrency control lives entirely in the store's guarded updates; the
// coordinator adds no locking of its own. Broadcasts go out only after the
// durable write is confirmed, so a subscriber can never observe an accept
// that did not actually win the race. Publishing is non-blocking and its
// failures are logged, never surfaced - the durable write is the single
// point of truth for whether a transition happened.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{Result, SosError};
use crate::notifications::SosNotification;
use crate::notifier::Notifier;
use crate::sos::{CreateSos, ListOrder, SosEvent, SosStatus};
use crate::traits::SosStore;

/// How many accepted/ended events `list` returns at most.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Outcome of a successful `create`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SosCreated {
    pub id: Uuid,
    pub room_name: String,
}

/// Outcome of a successful `accept`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SosAccepted {
    pub room_name: String,
}

/// Snapshot returned by `list`
#[derive(Debug, Clone)]
pub struct SosBoard {
    /// Pending events, oldest first - the longest-waiting call leads.
    pub pending: Vec<SosEvent>,
    /// Accepted/ended events, newest first, capped at the history limit.
    pub history: Vec<SosEvent>,
}

pub struct SosCoordinator {
    store: Arc<dyn SosStore>,
    notifier: Arc<Notifier>,
    history_limit: i64,
}

impl SosCoordinator {
    pub fn new(store: Arc<dyn SosStore>, notifier: Arc<Notifier>) -> Self {
        Self {
            store,
            notifier,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: i64) -> Self {
        self.history_limit = limit;
        self
    }

    /// Raise a new SOS for a station.
    ///
    /// Persists the event as `pending` and broadcasts `sos.new` to the admin
    /// scope.
    pub async fn create(&self, input: CreateSos) -> Result<SosCreated> {
        let station_id = input.station_id.trim();
        let station_name = input.station_name.trim();
        if station_id.is_empty() {
            return Err(SosError::validation("station_id is required"));
        }
        if station_name.is_empty() {
            return Err(SosError::validation("station_name is required"));
        }

        let event = self
            .store
            .create(CreateSos {
                station_id: station_id.to_string(),
                station_name: station_name.to_string(),
            })
            .await?;
        tracing::info!(id = %event.id, station_id = %event.station_id, "sos created");

        self.notifier.publish_to_admins(&SosNotification::New {
            id: event.id,
            station_id: event.station_id.clone(),
            station_name: event.station_name.clone(),
            room_name: event.room_name.clone(),
            created_at: event.created_at,
        });

        Ok(SosCreated {
            id: event.id,
            room_name: event.room_name,
        })
    }

    /// Claim a pending SOS for an admin.
    ///
    /// The transition is a single conditional update guarded on the status
    /// being exactly `pending`; of any number of racing callers, exactly one
    /// gets the room name back and the rest get a conflict. The broadcast
    /// fires only after the store confirms the write.
    pub async fn accept(&self, id: Uuid, accepted_by: &str) -> Result<SosAccepted> {
        let accepted_by = accepted_by.trim();
        if accepted_by.is_empty() {
            return Err(SosError::validation("accepted_by is required"));
        }

        let Some(event) = self
            .store
            .accept_if_pending(id, accepted_by, Utc::now())
            .await?
        else {
            return Err(SosError::conflict(format!(
                "sos {id} is not pending - already claimed, already over, or unknown"
            )));
        };

        // accepted_by/accepted_at are populated iff the status is accepted
        let (Some(by), Some(at)) = (event.accepted_by.clone(), event.accepted_at) else {
            return Err(SosError::storage(
                "accepted event is missing accepted_by/accepted_at",
            ));
        };
        tracing::info!(id = %event.id, accepted_by = %by, "sos accepted");

        let notification = SosNotification::Accepted {
            id: event.id,
            station_id: event.station_id.clone(),
            station_name: event.station_name.clone(),
            accepted_by: by,
            room_name: event.room_name.clone(),
            accepted_at: at,
        };
        self.notifier.publish_to_admins(&notification);
        self.notifier.publish_to_event(event.id, &notification);

        Ok(SosAccepted {
            room_name: event.room_name,
        })
    }

    /// End an SOS.
    ///
    /// Works from `pending` (station aborts before anyone claims) and from
    /// `accepted`; ending an already-ended event is a no-op success and does
    /// not re-broadcast.
    pub async fn end(&self, id: Uuid) -> Result<()> {
        match self.store.end_if_active(id, Utc::now()).await? {
            Some(event) => {
                tracing::info!(id = %event.id, "sos ended");
                let notification = SosNotification::Ended { id: event.id };
                self.notifier.publish_to_admins(&notification);
                self.notifier.publish_to_event(event.id, &notification);
                self.notifier.retire_event(event.id);
                Ok(())
            }
            None => match self.store.get(id).await? {
                // Already terminal: repeat call succeeds without side effects
                Some(_) => Ok(()),
                None => Err(SosError::conflict(format!("sos {id} does not exist"))),
            },
        }
    }

    /// Fetch one event (used by the event-scope stream route).
    pub async fn get(&self, id: Uuid) -> Result<Option<SosEvent>> {
        self.store.get(id).await
    }

    /// Read-only board snapshot: no mutation, no broadcast.
    pub async fn list(&self) -> Result<SosBoard> {
        let pending = self
            .store
            .list_by_status(&[SosStatus::Pending], ListOrder::CreatedAsc, None)
            .await?;
        let history = self
            .store
            .list_by_status(
                &[SosStatus::Accepted, SosStatus::Ended],
                ListOrder::CreatedDesc,
                Some(self.history_limit),
            )
            .await?;
        Ok(SosBoard { pending, history })
    }
}
