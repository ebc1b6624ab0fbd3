// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sightline serve` command implementation.
//!
//! Opens the volunteer directory, assembles the session broker, starts the
//! optional ringing-expiry sweeper, and serves the HTTP gateway until a
//! shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use sightline_broker::{
    spawn_ringing_sweeper, InMemoryCallRegistry, SessionBroker, TokenIssuer, VolunteerPool,
};
use sightline_config::SightlineConfig;
use sightline_core::SightlineError;
use sightline_gateway::{start_server, AuthConfig, GatewayState, ServerConfig};
use sightline_storage::SqliteVolunteerDirectory;

use crate::shutdown;

/// Runs the broker until SIGINT/SIGTERM.
pub async fn run_serve(config: SightlineConfig) -> Result<(), SightlineError> {
    init_tracing(&config.service.log_level);

    let Some(bearer_token) = config.gateway.bearer_token.clone() else {
        return Err(SightlineError::Config(
            "gateway.bearer_token must be set; the gateway does not accept unauthenticated traffic"
                .to_string(),
        ));
    };
    let tokens = TokenIssuer::from_config(&config.media)?;

    let directory = Arc::new(SqliteVolunteerDirectory::new(config.storage.clone()));
    directory.initialize().await?;

    let broker = Arc::new(SessionBroker::new(
        Arc::new(InMemoryCallRegistry::new()),
        VolunteerPool::new(directory.clone()),
        tokens,
    ));

    let cancel = shutdown::install_signal_handler();

    let sweeper = config.broker.ringing_timeout_secs.map(|timeout| {
        spawn_ringing_sweeper(
            broker.clone(),
            Duration::from_secs(timeout),
            Duration::from_secs(config.broker.sweep_interval_secs),
            cancel.clone(),
        )
    });
    if sweeper.is_none() {
        info!("ringing calls never expire (broker.ringing_timeout_secs not set)");
    }

    info!(
        name = %config.service.name,
        app_id = config.media.app_id,
        database = %config.storage.database_path,
        "sightline starting"
    );

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    let state = GatewayState::new(broker, AuthConfig {
        bearer_token: Some(bearer_token),
    });
    let served = start_server(&server_config, state, cancel.clone()).await;

    // The server may also stop on its own (bind failure); stop the sweeper either way.
    cancel.cancel();
    if let Some(handle) = sweeper
        && let Err(e) = handle.await
    {
        warn!(error = %e, "ringing sweeper task failed");
    }
    if let Err(e) = directory.close().await {
        warn!(error = %e, "failed to checkpoint volunteer directory");
    }

    info!("sightline stopped");
    served
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sightline={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
