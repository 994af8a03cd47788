// Database models (internal rows, mapped to core entities at the boundary)

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use mayday_core::{room_name_for, SosEvent, SosStatus};

#[derive(Debug, Clone, FromRow)]
pub struct SosEventRow {
    pub id: Uuid,
    pub station_id: String,
    pub station_name: String,
    pub status: String,
    pub accepted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl SosEventRow {
    /// Map a row to the core entity, deriving the room name from the id.
    pub fn into_event(self) -> anyhow::Result<SosEvent> {
        let status = SosStatus::from_str(&self.status)?;
        Ok(SosEvent {
            id: self.id,
            room_name: room_name_for(self.id),
            station_id: self.station_id,
            station_name: self.station_name,
            status,
            accepted_by: self.accepted_by,
            created_at: self.created_at,
            accepted_at: self.accepted_at,
            ended_at: self.ended_at,
        })
    }
}
