// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process signals wired to a [`CancellationToken`].
//!
//! The HTTP server and the ringing sweeper both watch the returned token, so
//! one signal stops accepting calls and stops eviction together.

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Which signal ended the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Wait for SIGINT or, on unix, SIGTERM.
///
/// If the SIGTERM listener cannot be registered the broker keeps running and
/// only Ctrl+C stops it.
pub async fn wait_for_stop_signal() -> StopSignal {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "SIGTERM listener unavailable");
                let _ = tokio::signal::ctrl_c().await;
                return StopSignal::Interrupt;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => StopSignal::Interrupt,
            _ = terminate.recv() => StopSignal::Terminate,
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        StopSignal::Interrupt
    }
}

/// Spawn a watcher that cancels the returned token on the first stop signal.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            signal = wait_for_stop_signal() => {
                info!(%signal, "stopping broker");
                trigger.cancel();
            }
            // Someone else already asked for shutdown.
            _ = trigger.cancelled() => {}
        }
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_starts_live() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }

    #[tokio::test]
    async fn watcher_exits_on_external_cancel() {
        let token = install_signal_handler();
        token.cancel();
        tokio::task::yield_now().await;
        assert!(token.is_cancelled());
    }

    #[test]
    fn signal_names() {
        assert_eq!(StopSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(StopSignal::Terminate.to_string(), "SIGTERM");
    }
}
