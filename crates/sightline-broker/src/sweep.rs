// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background expiry of unanswered calls.
//!
//! Only spawned when a ringing timeout is configured. Without one, a ringing
//! call stays until either party ends it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::broker::SessionBroker;

/// Spawn the sweeper. It runs every `interval` until `cancel` fires.
pub fn spawn_ringing_sweeper(
    broker: Arc<SessionBroker>,
    timeout: Duration,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately; nothing can be stale yet.
        ticker.tick().await;
        info!(
            timeout_secs = timeout.as_secs(),
            interval_secs = interval.as_secs(),
            "ringing expiry sweeper started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match broker.expire_ringing(timeout).await {
                        Ok(expired) if !expired.is_empty() => {
                            debug!(count = expired.len(), "expired unanswered calls");
                        }
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "ringing expiry sweep failed"),
                    }
                }
            }
        }

        debug!("ringing expiry sweeper stopped");
    })
}
