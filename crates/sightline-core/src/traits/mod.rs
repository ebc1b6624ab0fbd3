// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the broker's external collaborators.
//!
//! Adapters extend the [`Adapter`] base trait and use `#[async_trait]` for
//! dynamic dispatch compatibility.

pub mod adapter;
pub mod directory;
pub mod registry;

pub use adapter::Adapter;
pub use directory::VolunteerDirectory;
pub use registry::CallRegistry;
