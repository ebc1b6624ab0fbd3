// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the broker, its adapters, and the gateway.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SightlineError;

/// Maximum length of a participant id in bytes.
pub const MAX_USER_ID_LEN: usize = 64;

/// Prefix shared by every room identity.
pub const ROOM_PREFIX: &str = "call_";

/// Separator between the two participant ids inside a room identity.
pub const ROOM_DELIMITER: char = '_';

/// Opaque participant identifier handed over by the identity layer.
///
/// Restricted to ASCII alphanumerics and `-` so that the room delimiter can
/// never appear inside an id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a raw id.
    pub fn parse(raw: &str) -> Result<Self, SightlineError> {
        if raw.is_empty() {
            return Err(SightlineError::InvalidArgument(
                "user id must not be empty".to_string(),
            ));
        }
        if raw.len() > MAX_USER_ID_LEN {
            return Err(SightlineError::InvalidArgument(format!(
                "user id must be at most {MAX_USER_ID_LEN} bytes, got {}",
                raw.len()
            )));
        }
        if let Some(bad) = raw.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-')) {
            return Err(SightlineError::InvalidArgument(format!(
                "user id contains unsupported character {bad:?}"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        UserId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Role of a participant as asserted by the identity layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A visually-impaired user looking for assistance.
    #[strum(to_string = "seeker", serialize = "blind")]
    #[serde(alias = "blind")]
    Seeker,
    /// A sighted helper who may be matched with seekers.
    #[strum(to_string = "volunteer")]
    Volunteer,
}

/// A verified `(id, role)` pair, immutable for the lifetime of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRef {
    pub id: UserId,
    pub role: Role,
}

impl ParticipantRef {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Volunteer entry in the external directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerRecord {
    pub user_id: UserId,
    /// Toggled by the volunteer; cleared the instant a reservation succeeds.
    pub is_available: bool,
    /// Given once at onboarding; a volunteer without consent is never matched.
    pub consent_given: bool,
    /// Spoken languages, surfaced to the seeker with the match.
    #[serde(default)]
    pub languages: Vec<String>,
}

impl VolunteerRecord {
    /// Whether this record may be reserved right now.
    pub fn is_eligible(&self) -> bool {
        self.is_available && self.consent_given
    }
}

/// Canonical key binding exactly two participants to one call session.
///
/// Canonical values are produced by the broker's room derivation. Values
/// arriving from clients are wrapped as-is and simply fail lookups when they
/// do not name a live room.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the two participant ids from a canonical room identity.
    ///
    /// Returns `None` when the value was not produced by room derivation.
    pub fn participants(&self) -> Option<(UserId, UserId)> {
        let rest = self.0.strip_prefix(ROOM_PREFIX)?;
        let (low, high) = rest.split_once(ROOM_DELIMITER)?;
        let low = UserId::parse(low).ok()?;
        let high = UserId::parse(high).ok()?;
        (low < high).then_some((low, high))
    }

    /// Whether `user` is one of the two participants encoded in this room.
    pub fn includes(&self, user: &UserId) -> bool {
        self.participants()
            .is_some_and(|(low, high)| &low == user || &high == user)
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Live states of a call. Ending a call deletes the session instead of
/// storing a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CallState {
    Ringing,
    Active,
}

/// A live call between a caller and a callee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSession {
    pub room_id: RoomId,
    pub caller_id: UserId,
    pub callee_id: UserId,
    pub state: CallState,
    pub created_at: DateTime<Utc>,
    /// Volunteers this call took out of the pool. Each is released on end.
    #[serde(default)]
    pub reserved_volunteers: Vec<UserId>,
}

impl CallSession {
    /// Whether `user` is the caller or the callee of this session.
    pub fn involves(&self, user: &UserId) -> bool {
        &self.caller_id == user || &self.callee_id == user
    }
}

/// Request to register a call in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCall {
    pub room_id: RoomId,
    pub caller_id: UserId,
    pub callee_id: UserId,
    /// Volunteer already reserved from the pool for this call, if any.
    pub reserved_volunteer: Option<UserId>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}
