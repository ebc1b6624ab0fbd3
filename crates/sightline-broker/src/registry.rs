// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory call registry.
//!
//! Sessions live in a sharded [`DashMap`] keyed by room. Every mutation goes
//! through the entry API or `remove_if`, so each operation holds exactly one
//! shard lock and unrelated rooms on other shards never wait on each other.
//! The table is process-scoped: a restart drops every live call and clients
//! recover by redialing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use sightline_core::{
    CallRegistry, CallSession, CallState, NewCall, RoomId, SightlineError, UserId,
};

/// Live call sessions keyed by room identity.
#[derive(Default)]
pub struct InMemoryCallRegistry {
    sessions: DashMap<RoomId, CallSession>,
}

impl InMemoryCallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl CallRegistry for InMemoryCallRegistry {
    async fn create(&self, call: NewCall) -> Result<CallSession, SightlineError> {
        match self.sessions.entry(call.room_id.clone()) {
            Entry::Occupied(mut entry) => {
                let session = entry.get_mut();
                if let Some(volunteer_id) = call.reserved_volunteer
                    && !session.reserved_volunteers.contains(&volunteer_id)
                {
                    session.reserved_volunteers.push(volunteer_id);
                }
                debug!(room_id = %call.room_id, state = %session.state, "call already live");
                Ok(session.clone())
            }
            Entry::Vacant(entry) => {
                let session = CallSession {
                    room_id: call.room_id,
                    caller_id: call.caller_id,
                    callee_id: call.callee_id,
                    state: CallState::Ringing,
                    created_at: Utc::now(),
                    reserved_volunteers: call.reserved_volunteer.into_iter().collect(),
                };
                debug!(
                    room_id = %session.room_id,
                    caller_id = %session.caller_id,
                    callee_id = %session.callee_id,
                    "call ringing"
                );
                Ok(entry.insert(session).clone())
            }
        }
    }

    async fn answer(
        &self,
        room_id: &RoomId,
        callee_id: &UserId,
    ) -> Result<CallSession, SightlineError> {
        let mut session = self
            .sessions
            .get_mut(room_id)
            .ok_or_else(|| SightlineError::NotFound(format!("no live call in room {room_id}")))?;
        if &session.callee_id != callee_id {
            return Err(SightlineError::Forbidden(
                "only the callee may answer a call".to_string(),
            ));
        }
        if session.state == CallState::Ringing {
            session.state = CallState::Active;
            debug!(room_id = %room_id, "call answered");
        }
        Ok(session.clone())
    }

    async fn add_reservation(
        &self,
        room_id: &RoomId,
        volunteer_id: &UserId,
    ) -> Result<CallSession, SightlineError> {
        let mut session = self
            .sessions
            .get_mut(room_id)
            .ok_or_else(|| SightlineError::NotFound(format!("no live call in room {room_id}")))?;
        if !session.reserved_volunteers.contains(volunteer_id) {
            session.reserved_volunteers.push(volunteer_id.clone());
        }
        Ok(session.clone())
    }

    async fn end(&self, room_id: &RoomId) -> Result<CallSession, SightlineError> {
        self.sessions
            .remove(room_id)
            .map(|(_, session)| session)
            .ok_or_else(|| SightlineError::NotFound(format!("no live call in room {room_id}")))
    }

    async fn get(&self, room_id: &RoomId) -> Result<Option<CallSession>, SightlineError> {
        Ok(self.sessions.get(room_id).map(|s| s.value().clone()))
    }

    async fn list_incoming(&self, user_id: &UserId) -> Result<Vec<CallSession>, SightlineError> {
        let mut incoming: Vec<CallSession> = self
            .sessions
            .iter()
            .filter(|s| s.state == CallState::Ringing && &s.callee_id == user_id)
            .map(|s| s.value().clone())
            .collect();
        incoming.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.room_id.cmp(&b.room_id))
        });
        Ok(incoming)
    }

    async fn evict_ringing_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CallSession>, SightlineError> {
        let stale = |s: &CallSession| s.state == CallState::Ringing && s.created_at < cutoff;
        let candidates: Vec<RoomId> = self
            .sessions
            .iter()
            .filter(|s| stale(s.value()))
            .map(|s| s.key().clone())
            .collect();

        // Re-check under the shard lock; the call may have been answered since.
        Ok(candidates
            .iter()
            .filter_map(|room_id| self.sessions.remove_if(room_id, |_, s| stale(s)))
            .map(|(_, session)| session)
            .collect())
    }
}
