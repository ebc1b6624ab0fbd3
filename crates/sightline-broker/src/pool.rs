// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volunteer availability and reservation.
//!
//! The pool owns no state of its own: the directory is the single source of
//! truth, and its conditional update is what makes reservation safe under
//! concurrent callers. The pool adds the retry policy and the "release never
//! fails the caller" rule.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use sightline_core::{SightlineError, UserId, VolunteerDirectory, VolunteerRecord};

/// Run `op`, retrying exactly once (no backoff) on a transient failure.
async fn retry_once<T, F, Fut>(what: &'static str, mut op: F) -> Result<T, SightlineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SightlineError>>,
{
    match op().await {
        Err(e) if e.is_transient() => {
            warn!(operation = what, error = %e, "volunteer directory call failed, retrying once");
            op().await
        }
        other => other,
    }
}

/// Reservation front-end over a [`VolunteerDirectory`].
#[derive(Clone)]
pub struct VolunteerPool {
    directory: Arc<dyn VolunteerDirectory>,
}

impl VolunteerPool {
    pub fn new(directory: Arc<dyn VolunteerDirectory>) -> Self {
        Self { directory }
    }

    /// The backing directory.
    pub fn directory(&self) -> &Arc<dyn VolunteerDirectory> {
        &self.directory
    }

    /// Reserve one available, consenting volunteer.
    ///
    /// `Ok(None)` is the ordinary "nobody is free" outcome, not an error.
    pub async fn reserve_any(&self) -> Result<Option<VolunteerRecord>, SightlineError> {
        let reserved = retry_once("reserve", || self.directory.reserve_available()).await?;
        if let Some(record) = &reserved {
            debug!(volunteer_id = %record.user_id, "volunteer reserved");
        }
        Ok(reserved)
    }

    /// Take a specific volunteer out of the pool for a call they joined
    /// directly. `Ok(false)` if they were already unavailable or are not a
    /// volunteer at all.
    pub async fn claim(&self, user_id: &UserId) -> Result<bool, SightlineError> {
        let claimed = retry_once("claim", || self.directory.claim(user_id)).await?;
        if claimed {
            debug!(volunteer_id = %user_id, "volunteer claimed for direct call");
        }
        Ok(claimed)
    }

    /// Make a volunteer available again after their call ended.
    ///
    /// Never fails: a missing record or an unreachable directory is logged
    /// and the caller carries on.
    pub async fn release(&self, user_id: &UserId) {
        match retry_once("release", || self.directory.set_available(user_id, true)).await {
            Ok(true) => debug!(volunteer_id = %user_id, "volunteer released"),
            Ok(false) => {
                warn!(volunteer_id = %user_id, "released volunteer has no directory record")
            }
            Err(e) => {
                warn!(volunteer_id = %user_id, error = %e, "failed to release volunteer")
            }
        }
    }

    /// Manual availability toggle. `NotFound` if the volunteer has no record.
    ///
    /// Independent of any call in progress: going unavailable mid-call does
    /// not end the call.
    pub async fn set_availability(
        &self,
        user_id: &UserId,
        available: bool,
    ) -> Result<(), SightlineError> {
        let found = retry_once("set_availability", || {
            self.directory.set_available(user_id, available)
        })
        .await?;
        if !found {
            return Err(SightlineError::NotFound(format!(
                "no volunteer record for {user_id}"
            )));
        }
        debug!(volunteer_id = %user_id, available, "volunteer availability updated");
        Ok(())
    }

    /// Fetch a volunteer record, if one exists.
    pub async fn lookup(
        &self,
        user_id: &UserId,
    ) -> Result<Option<VolunteerRecord>, SightlineError> {
        retry_once("lookup", || self.directory.get(user_id)).await
    }
}
