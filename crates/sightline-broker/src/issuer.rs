// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Join-token issuance for the configured media tenant.

use secrecy::{ExposeSecret, SecretString};

use sightline_config::model::MediaConfig;
use sightline_config::validation::SERVER_SECRET_LEN;
use sightline_core::{RoomId, SightlineError, UserId};
use sightline_token::RoomGrant;

/// Everything a client needs to join the media room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaGrant {
    pub token: String,
    pub app_id: u32,
    pub server_url: Option<String>,
    /// Unix seconds after which the media provider rejects the token.
    pub expires_at: i64,
}

/// Mints room-scoped join tokens with the tenant's secret.
pub struct TokenIssuer {
    app_id: u32,
    secret: SecretString,
    ttl_secs: u32,
    server_url: Option<String>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("app_id", &self.app_id)
            .field("secret", &"[redacted]")
            .field("ttl_secs", &self.ttl_secs)
            .field("server_url", &self.server_url)
            .finish()
    }
}

impl TokenIssuer {
    /// Build an issuer from the `[media]` section.
    ///
    /// Fails with `Config` when the tenant is not fully configured; the
    /// broker cannot serve calls without one.
    pub fn from_config(media: &MediaConfig) -> Result<Self, SightlineError> {
        if media.app_id == 0 {
            return Err(SightlineError::Config(
                "media.app_id must be set to issue join tokens".to_string(),
            ));
        }
        let secret = media.server_secret.as_deref().ok_or_else(|| {
            SightlineError::Config(
                "media.server_secret must be set to issue join tokens".to_string(),
            )
        })?;
        if secret.len() != SERVER_SECRET_LEN {
            return Err(SightlineError::Config(format!(
                "media.server_secret must be exactly {SERVER_SECRET_LEN} bytes"
            )));
        }
        Ok(Self {
            app_id: media.app_id,
            secret: SecretString::from(secret.to_string()),
            ttl_secs: media.token_ttl_secs,
            server_url: media.server_url.clone(),
        })
    }

    pub fn app_id(&self) -> u32 {
        self.app_id
    }

    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    /// Mint a token letting `subject` log into and publish in `room_id`.
    pub fn issue(&self, subject: &UserId, room_id: &RoomId) -> Result<MediaGrant, SightlineError> {
        let now = chrono::Utc::now().timestamp();
        let payload = RoomGrant::join_and_publish(room_id.as_str()).to_payload()?;
        let token = sightline_token::mint_at(
            now,
            self.app_id,
            subject.as_str(),
            self.secret.expose_secret().as_bytes(),
            self.ttl_secs,
            &payload,
        )?;
        Ok(MediaGrant {
            token,
            app_id: self.app_id,
            server_url: self.server_url.clone(),
            expires_at: now + i64::from(self.ttl_secs),
        })
    }

    /// Decrypt a token minted by this issuer. Used by verification tooling.
    pub fn inspect(&self, token: &str) -> Result<sightline_token::TokenInfo, SightlineError> {
        sightline_token::open(token, self.secret.expose_secret().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use sightline_test_utils::fixtures::{test_config, user, TEST_APP_ID};

    use super::*;

    #[test]
    fn issued_token_binds_subject_and_room() {
        let issuer = TokenIssuer::from_config(&test_config().media).unwrap();
        let room = RoomId::from("call_a_b");
        let grant = issuer.issue(&user("a"), &room).unwrap();

        assert!(grant.token.starts_with("04"));
        assert_eq!(grant.app_id, TEST_APP_ID);

        let info = issuer.inspect(&grant.token).unwrap();
        assert_eq!(info.user_id, "a");
        assert_eq!(info.expire, grant.expires_at);
        assert_eq!(info.expire, info.ctime + 3600);
        let payload: RoomGrant = serde_json::from_str(&info.payload).unwrap();
        assert_eq!(payload.room_id, "call_a_b");
        assert_eq!(payload.privilege.get("1"), Some(&1));
    }

    #[test]
    fn missing_tenant_is_a_config_error() {
        let mut media = test_config().media;
        media.server_secret = None;
        assert!(matches!(
            TokenIssuer::from_config(&media),
            Err(SightlineError::Config(_))
        ));

        let mut media = test_config().media;
        media.app_id = 0;
        assert!(matches!(
            TokenIssuer::from_config(&media),
            Err(SightlineError::Config(_))
        ));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let issuer = TokenIssuer::from_config(&test_config().media).unwrap();
        let rendered = format!("{issuer:?}");
        assert!(rendered.contains("[redacted]"));
        assert!(!rendered.contains("0123456789abcdef"));
    }
}
