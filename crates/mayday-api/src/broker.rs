// Media session token service
// Decision: HS256 with the shared media API secret, matching the access-token
// shape the media server verifies
//
// Issues short-lived credentials scoped to exactly one room. The room name is
// derived from the event id by everyone independently, so the broker needs no
// knowledge of the event beyond the room it is asked about.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Token lifetime; participants re-request on expiry.
const TOKEN_TTL_MINUTES: i64 = 10;

/// Participant role inside a media room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Admin,
    Station,
}

impl ParticipantRole {
    pub fn identity_prefix(&self) -> &'static str {
        match self {
            ParticipantRole::Admin => "admin",
            ParticipantRole::Station => "station",
        }
    }
}

/// Video grant claims (LiveKit access-token shape)
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoGrant {
    pub room: String,
    #[serde(rename = "roomJoin")]
    pub room_join: bool,
    #[serde(rename = "canPublish")]
    pub can_publish: bool,
    #[serde(rename = "canSubscribe")]
    pub can_subscribe: bool,
}

/// JWT claims for media session tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionTokenClaims {
    /// Issuer (the media API key)
    pub iss: String,
    /// Subject (role-prefixed participant identity)
    pub sub: String,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    pub video: VideoGrant,
}

/// Broker issuing media session credentials
#[derive(Clone)]
pub struct SessionBroker {
    api_key: String,
    encoding_key: EncodingKey,
}

impl SessionBroker {
    pub fn new(api_key: impl Into<String>, api_secret: &str) -> Self {
        Self {
            api_key: api_key.into(),
            encoding_key: EncodingKey::from_secret(api_secret.as_bytes()),
        }
    }

    /// Build from LIVEKIT_API_KEY / LIVEKIT_API_SECRET; None when either is
    /// unset (the token route then answers 503).
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("LIVEKIT_API_KEY").ok()?;
        let api_secret = std::env::var("LIVEKIT_API_SECRET").ok()?;
        Some(Self::new(api_key, &api_secret))
    }

    /// Issue a time-bounded credential for one identity in one room.
    pub fn issue(&self, room_name: &str, identity: &str, role: ParticipantRole) -> Result<String> {
        let now = Utc::now();
        let claims = SessionTokenClaims {
            iss: self.api_key.clone(),
            sub: format!("{}-{}", role.identity_prefix(), identity),
            nbf: now.timestamp(),
            exp: (now + Duration::minutes(TOKEN_TTL_MINUTES)).timestamp(),
            video: VideoGrant {
                room: room_name.to_string(),
                room_join: true,
                can_publish: true,
                can_subscribe: true,
            },
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode session token")
    }
}
