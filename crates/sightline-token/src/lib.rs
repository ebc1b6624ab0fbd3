// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Join-token codec for the external media transport.
//!
//! Tokens are minted here and verified by the media provider without calling
//! back into the broker. [`open`] exists for verification tooling and tests.

pub mod crypto;
pub mod token04;

pub use token04::{
    mint, mint_at, open, peek_expire, EncryptMode, RoomGrant, TokenInfo, VERSION_FLAG,
};
