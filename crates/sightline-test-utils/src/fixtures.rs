// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures.

use sightline_config::SightlineConfig;
use sightline_core::{ParticipantRef, Role, UserId, VolunteerRecord};

/// Media tenant used by every test configuration.
pub const TEST_APP_ID: u32 = 1_739_272_706;

/// 32-byte media secret used by every test configuration.
pub const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";

/// Bearer token the test identity layer presents.
pub const TEST_BEARER: &str = "test-identity-layer";

/// Panics on an invalid id; fixtures are always valid.
pub fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap_or_else(|e| panic!("invalid fixture id {id:?}: {e}"))
}

pub fn seeker(id: &str) -> ParticipantRef {
    ParticipantRef::new(user(id), Role::Seeker)
}

pub fn volunteer(id: &str) -> ParticipantRef {
    ParticipantRef::new(user(id), Role::Volunteer)
}

/// A volunteer record with the given flags and English as the only language.
pub fn volunteer_record(id: &str, available: bool, consent: bool) -> VolunteerRecord {
    VolunteerRecord {
        user_id: user(id),
        is_available: available,
        consent_given: consent,
        languages: vec!["en".to_string()],
    }
}

/// Configuration with a media tenant, a bearer token, and no ringing timeout.
pub fn test_config() -> SightlineConfig {
    let mut config = SightlineConfig::default();
    config.gateway.bearer_token = Some(TEST_BEARER.to_string());
    config.media.app_id = TEST_APP_ID;
    config.media.server_secret = Some(TEST_SECRET.to_string());
    config.media.server_url = Some("wss://media.example.test/ws".to_string());
    config
}
