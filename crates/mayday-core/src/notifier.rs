// Real-time fanout service
//
// Two notification scopes:
// - admin scope: every connected admin console sees every transition
// - event scope: one channel per event id, carrying accepted/ended only
//
// Publishing is a non-blocking channel send, so a slow or absent subscriber
// can never block or fail the transition that triggered it. Delivery is
// best-effort and at-most-once per connected subscriber; a subscriber that
// connects after a transition reconciles through the list operation.

use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::notifications::SosNotification;

/// Per-channel buffer; subscribers lagging past this many messages drop the
/// oldest rather than slow the publisher down.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Fanout service owning the broadcast channels for both scopes.
///
/// Constructed once at service boot and injected into the coordinator and the
/// streaming handlers; dropping it closes every channel.
pub struct Notifier {
    admins: broadcast::Sender<SosNotification>,
    events: RwLock<HashMap<Uuid, broadcast::Sender<SosNotification>>>,
    capacity: usize,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (admins, _) = broadcast::channel(capacity);
        Self {
            admins,
            events: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Subscribe to the admin-broadcast scope.
    pub fn subscribe_admins(&self) -> broadcast::Receiver<SosNotification> {
        self.admins.subscribe()
    }

    /// Subscribe to a single event's scope.
    pub fn subscribe_event(&self, id: Uuid) -> broadcast::Receiver<SosNotification> {
        let mut events = self.events.write();
        events
            .entry(id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish to every connected admin console.
    pub fn publish_to_admins(&self, notification: &SosNotification) {
        match self.admins.send(notification.clone()) {
            Ok(receivers) => tracing::debug!(
                event = notification.event_name(),
                receivers,
                "published to admin scope"
            ),
            // send only fails when nobody is subscribed
            Err(_) => tracing::debug!(
                event = notification.event_name(),
                "no admin subscribers connected"
            ),
        }
    }

    /// Publish to subscribers of one event id.
    pub fn publish_to_event(&self, id: Uuid, notification: &SosNotification) {
        let sender = self.events.read().get(&id).cloned();
        match sender {
            Some(sender) => {
                if sender.send(notification.clone()).is_err() {
                    tracing::debug!(%id, "no event-scope subscribers connected");
                }
            }
            None => tracing::debug!(%id, "no event-scope channel open"),
        }
    }

    /// Retire an event's channel once its lifecycle is over.
    ///
    /// Existing subscribers drain anything already buffered, then observe the
    /// channel closing.
    pub fn retire_event(&self, id: Uuid) {
        self.events.write().remove(&id);
    }

    /// Number of per-event channels currently open.
    pub fn open_event_scopes(&self) -> usize {
        self.events.read().len()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}
