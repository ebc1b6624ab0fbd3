// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the volunteer directory.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. Reservation is a
//! single conditional `UPDATE`, so two concurrent callers can never be handed
//! the same volunteer.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteVolunteerDirectory;
pub use database::Database;
