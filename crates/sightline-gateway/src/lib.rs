// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Sightline call broker.
//!
//! Exposes the call operations under `/call/*` behind the identity-layer
//! middleware, plus an unauthenticated `/health` check.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use error::ApiError;
pub use server::{build_router, start_server, GatewayState, ServerConfig};
