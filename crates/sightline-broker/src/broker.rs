// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The call orchestrator.
//!
//! Direct calls and volunteer matching share everything past the point where
//! the callee is known: room derivation, registration, and token minting.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

use sightline_core::{
    CallRegistry, CallSession, HealthStatus, NewCall, ParticipantRef, Role, RoomId,
    SightlineError, UserId, VolunteerRecord,
};

use crate::issuer::{MediaGrant, TokenIssuer};
use crate::pool::VolunteerPool;
use crate::room::derive_room_id;

/// The other side of a call, as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub user_id: UserId,
    /// Empty unless the peer is a volunteer with languages on record.
    pub languages: Vec<String>,
}

/// Result of placing a call.
#[derive(Debug, Clone)]
pub struct CallTicket {
    pub room_id: RoomId,
    pub grant: MediaGrant,
    pub peer: PeerInfo,
}

/// Result of answering a call.
#[derive(Debug, Clone)]
pub struct AnswerTicket {
    pub session: CallSession,
    pub grant: MediaGrant,
}

/// A ringing call as shown to its callee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCall {
    pub room_id: RoomId,
    pub caller_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<CallSession> for IncomingCall {
    fn from(session: CallSession) -> Self {
        Self {
            room_id: session.room_id,
            caller_id: session.caller_id,
            created_at: session.created_at,
        }
    }
}

/// Serves the call operations on behalf of verified participants.
pub struct SessionBroker {
    registry: Arc<dyn CallRegistry>,
    pool: VolunteerPool,
    tokens: TokenIssuer,
}

impl SessionBroker {
    pub fn new(registry: Arc<dyn CallRegistry>, pool: VolunteerPool, tokens: TokenIssuer) -> Self {
        Self {
            registry,
            pool,
            tokens,
        }
    }

    pub fn pool(&self) -> &VolunteerPool {
        &self.pool
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Ring a specific user.
    ///
    /// Calling someone who is already ringing or talking with the caller
    /// returns the existing room untouched, with a fresh token.
    pub async fn request_direct_call(
        &self,
        caller: &ParticipantRef,
        target: &UserId,
    ) -> Result<CallTicket, SightlineError> {
        let room_id = derive_room_id(&caller.id, target)?;
        let session = self
            .registry
            .create(NewCall {
                room_id: room_id.clone(),
                caller_id: caller.id.clone(),
                callee_id: target.clone(),
                reserved_volunteer: None,
            })
            .await?;
        let grant = self.tokens.issue(&caller.id, &room_id)?;

        // Languages are a nicety; a directory hiccup must not fail the call.
        let languages = match self.pool.lookup(target).await {
            Ok(record) => record.map(|r| r.languages).unwrap_or_default(),
            Err(e) => {
                warn!(user_id = %target, error = %e, "could not look up peer languages");
                Vec::new()
            }
        };

        info!(
            room_id = %room_id,
            caller_id = %caller.id,
            callee_id = %target,
            state = %session.state,
            "direct call placed"
        );
        Ok(CallTicket {
            room_id,
            grant,
            peer: PeerInfo {
                user_id: target.clone(),
                languages,
            },
        })
    }

    /// Match a seeker with any free volunteer.
    pub async fn request_any_volunteer(
        &self,
        seeker: &ParticipantRef,
    ) -> Result<CallTicket, SightlineError> {
        if seeker.role != Role::Seeker {
            return Err(SightlineError::Forbidden(
                "only seekers may request a volunteer".to_string(),
            ));
        }

        let Some(volunteer) = self.pool.reserve_any().await? else {
            info!(seeker_id = %seeker.id, "no volunteers available");
            return Err(SightlineError::NoVolunteerAvailable);
        };

        match self.ring_reserved(seeker, &volunteer).await {
            Ok(ticket) => {
                info!(
                    room_id = %ticket.room_id,
                    seeker_id = %seeker.id,
                    volunteer_id = %volunteer.user_id,
                    "volunteer matched"
                );
                Ok(ticket)
            }
            Err(e) => {
                // The volunteer never got a call; hand them back.
                self.pool.release(&volunteer.user_id).await;
                Err(e)
            }
        }
    }

    async fn ring_reserved(
        &self,
        seeker: &ParticipantRef,
        volunteer: &VolunteerRecord,
    ) -> Result<CallTicket, SightlineError> {
        let room_id = derive_room_id(&seeker.id, &volunteer.user_id)?;
        // Mint first so nothing needs undoing in the registry if it fails.
        let grant = self.tokens.issue(&seeker.id, &room_id)?;
        self.registry
            .create(NewCall {
                room_id: room_id.clone(),
                caller_id: seeker.id.clone(),
                callee_id: volunteer.user_id.clone(),
                reserved_volunteer: Some(volunteer.user_id.clone()),
            })
            .await?;
        Ok(CallTicket {
            room_id,
            grant,
            peer: PeerInfo {
                user_id: volunteer.user_id.clone(),
                languages: volunteer.languages.clone(),
            },
        })
    }

    /// Accept a ringing call. Only the callee may answer.
    ///
    /// Once the call is active, every participant who is still available in
    /// the volunteer directory is taken out of the pool and recorded on the
    /// session, so `end` hands them back. Answering again retries that step.
    pub async fn answer(
        &self,
        callee: &ParticipantRef,
        room_id: &RoomId,
    ) -> Result<AnswerTicket, SightlineError> {
        let mut session = self.registry.answer(room_id, &callee.id).await?;
        let participants = [session.caller_id.clone(), session.callee_id.clone()];
        for user_id in participants {
            if session.reserved_volunteers.contains(&user_id)
                || !self.pool.claim(&user_id).await?
            {
                continue;
            }
            session = match self.registry.add_reservation(room_id, &user_id).await {
                Ok(session) => session,
                Err(e) => {
                    // Hung up in the meantime; nobody else will release them.
                    self.pool.release(&user_id).await;
                    return Err(e);
                }
            };
        }

        let grant = self.tokens.issue(&callee.id, room_id)?;
        info!(room_id = %room_id, callee_id = %callee.id, "call active");
        Ok(AnswerTicket { session, grant })
    }

    /// Hang up. Always succeeds toward the caller.
    ///
    /// Returns the ended session, or `None` when there was nothing to end or
    /// the requester is not part of the room. A volunteer reserved for the
    /// call is released.
    pub async fn end(
        &self,
        requester: &ParticipantRef,
        room_id: &RoomId,
    ) -> Result<Option<CallSession>, SightlineError> {
        if !room_id.includes(&requester.id) {
            warn!(room_id = %room_id, user_id = %requester.id, "ignoring end from non-participant");
            return Ok(None);
        }

        let prior = match self.registry.end(room_id).await {
            Ok(prior) => prior,
            Err(SightlineError::NotFound(_)) => {
                debug!(room_id = %room_id, "end for call that is already gone");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        for volunteer_id in &prior.reserved_volunteers {
            self.pool.release(volunteer_id).await;
        }
        info!(room_id = %room_id, ended_by = %requester.id, state = %prior.state, "call ended");
        Ok(Some(prior))
    }

    /// Ringing calls addressed to `user_id`, oldest first.
    pub async fn poll(&self, user_id: &UserId) -> Result<Vec<IncomingCall>, SightlineError> {
        let incoming = self.registry.list_incoming(user_id).await?;
        Ok(incoming.into_iter().map(IncomingCall::from).collect())
    }

    /// Fresh join token for a participant of a live room.
    pub async fn refresh_token(
        &self,
        participant: &ParticipantRef,
        room_id: &RoomId,
    ) -> Result<MediaGrant, SightlineError> {
        let session = self
            .registry
            .get(room_id)
            .await?
            .ok_or_else(|| SightlineError::NotFound(format!("no live call in room {room_id}")))?;
        if !session.involves(&participant.id) {
            return Err(SightlineError::Forbidden(
                "only participants may join this room".to_string(),
            ));
        }
        self.tokens.issue(&participant.id, room_id)
    }

    /// Volunteer toggles their own availability.
    pub async fn set_availability(
        &self,
        volunteer: &ParticipantRef,
        available: bool,
    ) -> Result<(), SightlineError> {
        if volunteer.role != Role::Volunteer {
            return Err(SightlineError::Forbidden(
                "only volunteers have an availability flag".to_string(),
            ));
        }
        self.pool.set_availability(&volunteer.id, available).await
    }

    /// Drop calls that rang for longer than `timeout`, releasing reserved
    /// volunteers.
    pub async fn expire_ringing(
        &self,
        timeout: Duration,
    ) -> Result<Vec<CallSession>, SightlineError> {
        let timeout = TimeDelta::from_std(timeout)
            .map_err(|e| SightlineError::InvalidArgument(format!("ringing timeout: {e}")))?;
        let evicted = self.registry.evict_ringing_before(Utc::now() - timeout).await?;
        for session in &evicted {
            for volunteer_id in &session.reserved_volunteers {
                self.pool.release(volunteer_id).await;
            }
            info!(
                room_id = %session.room_id,
                caller_id = %session.caller_id,
                "unanswered call expired"
            );
        }
        Ok(evicted)
    }

    /// Health of the volunteer directory.
    pub async fn directory_health(&self) -> HealthStatus {
        match self.pool.directory().health_check().await {
            Ok(status) => status,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }
}
