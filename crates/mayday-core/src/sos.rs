// SOS event domain types
//
// These types represent the SosEvent entity and its status.
// Used by both the API and storage crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

const ROOM_NAME_PREFIX: &str = "sos-room";

/// Derive the media room name for an event id.
///
/// The room name is a pure function of the id: the coordinator, the session
/// broker, and every participant compute the same value independently, so it
/// is never persisted.
pub fn room_name_for(id: Uuid) -> String {
    format!("{ROOM_NAME_PREFIX}-{id}")
}

/// SOS event status
///
/// `pending -> accepted -> ended`, with a direct `pending -> ended` edge for
/// a station cancelling before any admin claims the call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SosStatus {
    Pending,
    Accepted,
    Ended,
}

impl SosStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SosStatus::Ended)
    }
}

impl std::fmt::Display for SosStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SosStatus::Pending => write!(f, "pending"),
            SosStatus::Accepted => write!(f, "accepted"),
            SosStatus::Ended => write!(f, "ended"),
        }
    }
}

impl std::str::FromStr for SosStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SosStatus::Pending),
            "accepted" => Ok(SosStatus::Accepted),
            "ended" => Ok(SosStatus::Ended),
            other => Err(anyhow::anyhow!("unknown sos status: {other}")),
        }
    }
}

/// SosEvent - a single emergency-call request tracked through its lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SosEvent {
    pub id: Uuid,
    pub station_id: String,
    pub station_name: String,
    pub status: SosStatus,
    /// Always `room_name_for(id)`; filled in at construction, not a stored column.
    pub room_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Input for creating an SOS event
#[derive(Debug, Clone)]
pub struct CreateSos {
    pub station_id: String,
    pub station_name: String,
}

/// Ordering for status-filtered listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    CreatedAsc,
    CreatedDesc,
}
