// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volunteer directory trait: the persisted source of volunteer availability.

use async_trait::async_trait;

use crate::error::SightlineError;
use crate::traits::adapter::Adapter;
use crate::types::{UserId, VolunteerRecord};

/// Persistent collection of [`VolunteerRecord`]s.
///
/// Implementations must make [`reserve_available`](Self::reserve_available)
/// a single conditional update: a record observed as available by one caller
/// can never be reserved by a second concurrent caller.
#[async_trait]
pub trait VolunteerDirectory: Adapter {
    /// Atomically pick one record with `is_available && consent_given` and
    /// clear its availability. `Ok(None)` means nobody is eligible.
    async fn reserve_available(&self) -> Result<Option<VolunteerRecord>, SightlineError>;

    /// Clear one volunteer's availability only if it is set, in a single
    /// conditional update. `true` when this call flipped it; `false` when the
    /// volunteer was already unavailable or has no record.
    async fn claim(&self, user_id: &UserId) -> Result<bool, SightlineError>;

    /// Set the availability flag. Returns `false` if no record exists.
    async fn set_available(&self, user_id: &UserId, available: bool)
        -> Result<bool, SightlineError>;

    /// Fetch one record.
    async fn get(&self, user_id: &UserId) -> Result<Option<VolunteerRecord>, SightlineError>;

    /// Insert or replace a record (onboarding and administration).
    async fn upsert(&self, record: &VolunteerRecord) -> Result<(), SightlineError>;

    /// All records, ordered by user id.
    async fn list(&self) -> Result<Vec<VolunteerRecord>, SightlineError>;
}
