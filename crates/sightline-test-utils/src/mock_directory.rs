// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory volunteer directory for deterministic testing.
//!
//! `MockDirectory` implements `VolunteerDirectory` over a mutex-guarded map.
//! Reservation holds the lock across check and update, which gives the same
//! guarantee as the SQLite conditional update.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use sightline_core::{
    Adapter, HealthStatus, SightlineError, UserId, VolunteerDirectory, VolunteerRecord,
};

/// In-memory volunteer directory.
///
/// Records are kept ordered by id, so reservation always picks the
/// lowest eligible id.
#[derive(Default)]
pub struct MockDirectory {
    records: Mutex<BTreeMap<UserId, VolunteerRecord>>,
    fail_next: AtomicUsize,
    reserve_calls: AtomicUsize,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory pre-loaded with the given records.
    pub fn with_records(records: impl IntoIterator<Item = VolunteerRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.user_id.clone(), r))
            .collect();
        Self {
            records: Mutex::new(map),
            ..Self::default()
        }
    }

    /// Make the next `n` operations fail with a storage error.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Number of `reserve_available` calls seen, including failed ones.
    pub fn reserve_calls(&self) -> usize {
        self.reserve_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of one record.
    pub async fn record(&self, user_id: &UserId) -> Option<VolunteerRecord> {
        self.records.lock().await.get(user_id).cloned()
    }

    fn injected_failure(&self) -> Result<(), SightlineError> {
        let remaining = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match remaining {
            Ok(_) => Err(SightlineError::storage("injected directory failure")),
            Err(_) => Ok(()),
        }
    }
}

#[async_trait]
impl Adapter for MockDirectory {
    fn name(&self) -> &str {
        "mock-directory"
    }

    async fn health_check(&self) -> Result<HealthStatus, SightlineError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl VolunteerDirectory for MockDirectory {
    async fn reserve_available(&self) -> Result<Option<VolunteerRecord>, SightlineError> {
        self.reserve_calls.fetch_add(1, Ordering::SeqCst);
        self.injected_failure()?;
        let mut records = self.records.lock().await;
        Ok(records.values_mut().find(|r| r.is_eligible()).map(|r| {
            r.is_available = false;
            r.clone()
        }))
    }

    async fn claim(&self, user_id: &UserId) -> Result<bool, SightlineError> {
        self.injected_failure()?;
        let mut records = self.records.lock().await;
        Ok(match records.get_mut(user_id) {
            Some(record) if record.is_available => {
                record.is_available = false;
                true
            }
            _ => false,
        })
    }

    async fn set_available(
        &self,
        user_id: &UserId,
        available: bool,
    ) -> Result<bool, SightlineError> {
        self.injected_failure()?;
        let mut records = self.records.lock().await;
        Ok(match records.get_mut(user_id) {
            Some(record) => {
                record.is_available = available;
                true
            }
            None => false,
        })
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<VolunteerRecord>, SightlineError> {
        self.injected_failure()?;
        Ok(self.records.lock().await.get(user_id).cloned())
    }

    async fn upsert(&self, record: &VolunteerRecord) -> Result<(), SightlineError> {
        self.injected_failure()?;
        self.records
            .lock()
            .await
            .insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<VolunteerRecord>, SightlineError> {
        self.injected_failure()?;
        Ok(self.records.lock().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{user, volunteer_record};

    #[tokio::test]
    async fn reserve_picks_lowest_eligible_id() {
        let dir = MockDirectory::with_records([
            volunteer_record("c", true, true),
            volunteer_record("a", true, false),
            volunteer_record("b", true, true),
        ]);

        let first = dir.reserve_available().await.unwrap().unwrap();
        assert_eq!(first.user_id, user("b"));
        let second = dir.reserve_available().await.unwrap().unwrap();
        assert_eq!(second.user_id, user("c"));
        assert!(dir.reserve_available().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let dir = MockDirectory::with_records([volunteer_record("v", true, true)]);
        dir.fail_next(1);

        assert!(dir.reserve_available().await.is_err());
        assert!(dir.reserve_available().await.unwrap().is_some());
        assert_eq!(dir.reserve_calls(), 2);
    }

    #[tokio::test]
    async fn set_available_on_unknown_id_reports_false() {
        let dir = MockDirectory::new();
        assert!(!dir.set_available(&user("ghost"), true).await.unwrap());
    }

    #[tokio::test]
    async fn claim_only_takes_available_volunteers() {
        let dir = MockDirectory::with_records([
            volunteer_record("free", true, false),
            volunteer_record("busy", false, true),
        ]);
        assert!(dir.claim(&user("free")).await.unwrap());
        assert!(!dir.claim(&user("free")).await.unwrap());
        assert!(!dir.claim(&user("busy")).await.unwrap());
        assert!(!dir.claim(&user("ghost")).await.unwrap());
    }
}
