// Real-time notification payloads
//
// One variant per lifecycle transition. The serialized form is the SSE wire
// payload; the event name returned by `event_name` is the SSE `event:` field
// admin consoles and station sessions key on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification published on an SOS lifecycle transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SosNotification {
    /// A station raised a new SOS (admin scope only)
    New {
        id: Uuid,
        station_id: String,
        station_name: String,
        room_name: String,
        created_at: DateTime<Utc>,
    },
    /// An admin claimed the SOS (admin scope and event scope)
    Accepted {
        id: Uuid,
        station_id: String,
        station_name: String,
        accepted_by: String,
        room_name: String,
        accepted_at: DateTime<Utc>,
    },
    /// The call is over (admin scope and event scope)
    Ended { id: Uuid },
}

impl SosNotification {
    /// SSE event name for this transition
    pub fn event_name(&self) -> &'static str {
        match self {
            SosNotification::New { .. } => "sos.new",
            SosNotification::Accepted { .. } => "sos.accepted",
            SosNotification::Ended { .. } => "sos.ended",
        }
    }

    /// Id of the event this notification concerns
    pub fn sos_id(&self) -> Uuid {
        match self {
            SosNotification::New { id, .. }
            | SosNotification::Accepted { id, .. }
            | SosNotification::Ended { id } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let ended = SosNotification::Ended { id: Uuid::now_v7() };
        assert_eq!(ended.event_name(), "sos.ended");
    }

    #[test]
    fn test_accepted_payload_shape() {
        let id = Uuid::now_v7();
        let notification = SosNotification::Accepted {
            id,
            station_id: "ST001".to_string(),
            station_name: "Station A".to_string(),
            accepted_by: "admin1".to_string(),
            room_name: format!("sos-room-{id}"),
            accepted_at: Utc::now(),
        };
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["type"], "accepted");
        assert_eq!(json["accepted_by"], "admin1");
        assert_eq!(json["room_name"], format!("sos-room-{id}"));
        assert_eq!(notification.sos_id(), id);
    }

    #[test]
    fn test_ended_payload_carries_only_id() {
        let id = Uuid::now_v7();
        let json = serde_json::to_value(SosNotification::Ended { id }).unwrap();
        assert_eq!(json["type"], "ended");
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
