// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call registry trait: the live-session table and its state machine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SightlineError;
use crate::types::{CallSession, NewCall, RoomId, UserId};

/// Table of live call sessions keyed by room identity.
///
/// All operations must be linearizable per room. Implementations are free to
/// shard, but must never serialize unrelated rooms behind one lock.
#[async_trait]
pub trait CallRegistry: Send + Sync {
    /// Register a ringing call. If the room already has a live session its
    /// state and timestamp are kept; a reservation carried by `call` is still
    /// recorded on it.
    async fn create(&self, call: NewCall) -> Result<CallSession, SightlineError>;

    /// Transition `Ringing -> Active`. Answering an active call is a no-op.
    ///
    /// Fails with `NotFound` when no session exists and `Forbidden` when
    /// `callee_id` is not the session's callee.
    async fn answer(&self, room_id: &RoomId, callee_id: &UserId)
        -> Result<CallSession, SightlineError>;

    /// Record that `volunteer_id` was taken out of the pool for this call.
    /// `NotFound` if the session is gone.
    async fn add_reservation(
        &self,
        room_id: &RoomId,
        volunteer_id: &UserId,
    ) -> Result<CallSession, SightlineError>;

    /// Remove the session and return what was there. `NotFound` if absent.
    async fn end(&self, room_id: &RoomId) -> Result<CallSession, SightlineError>;

    /// Snapshot of one session.
    async fn get(&self, room_id: &RoomId) -> Result<Option<CallSession>, SightlineError>;

    /// Ringing sessions whose callee is `user_id`, oldest first. Pure read.
    async fn list_incoming(&self, user_id: &UserId) -> Result<Vec<CallSession>, SightlineError>;

    /// Remove ringing sessions created before `cutoff`, returning them.
    async fn evict_ringing_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CallSession>, SightlineError>;
}
