// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by all adapters.

use async_trait::async_trait;

use crate::error::SightlineError;
use crate::types::HealthStatus;

/// Base trait for every pluggable backend.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Short backend name, used in logs and health output.
    fn name(&self) -> &str;

    /// Reports whether the backend is reachable and usable.
    async fn health_check(&self) -> Result<HealthStatus, SightlineError>;
}
