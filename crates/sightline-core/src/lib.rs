// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Sightline call broker.
//!
//! This crate provides the domain types, the error taxonomy, and the adapter
//! traits behind which the volunteer directory and the call registry live.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SightlineError;
pub use types::{
    CallSession, CallState, HealthStatus, NewCall, ParticipantRef, Role, RoomId, UserId,
    VolunteerRecord,
};

pub use traits::{Adapter, CallRegistry, VolunteerDirectory};
