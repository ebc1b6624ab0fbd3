// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session broker.
//!
//! Composes room derivation, volunteer reservation, the live call registry,
//! and join-token minting into the caller-facing call operations. The HTTP
//! gateway and the CLI both drive a [`SessionBroker`].

pub mod broker;
pub mod issuer;
pub mod pool;
pub mod registry;
pub mod room;
pub mod sweep;

pub use broker::{AnswerTicket, CallTicket, IncomingCall, PeerInfo, SessionBroker};
pub use issuer::{MediaGrant, TokenIssuer};
pub use pool::VolunteerPool;
pub use registry::InMemoryCallRegistry;
pub use room::derive_room_id;
pub use sweep::spawn_ringing_sweeper;
