// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Sightline integration tests.
//!
//! Provides an in-memory volunteer directory and shared fixtures for fast,
//! deterministic tests without a database on disk.
//!
//! # Components
//!
//! - [`MockDirectory`] - In-memory volunteer directory with failure injection
//! - [`fixtures`] - Participants, records, and a ready-to-use configuration

pub mod fixtures;
pub mod mock_directory;

pub use mock_directory::MockDirectory;
