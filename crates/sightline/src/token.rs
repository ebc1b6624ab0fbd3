// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sightline token` debugging commands.

use clap::Subcommand;

use sightline_broker::TokenIssuer;
use sightline_config::SightlineConfig;
use sightline_core::{RoomId, SightlineError, UserId};

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Mint a join token with the configured media tenant.
    Mint {
        /// Subject (user id) the token is issued to.
        subject: String,
        /// Room the token grants access to.
        #[arg(long)]
        room: String,
    },
    /// Show a token's expiry and, if the secret is configured, its record.
    Inspect { token: String },
}

pub fn run(config: &SightlineConfig, command: TokenCommand) -> Result<(), SightlineError> {
    match command {
        TokenCommand::Mint { subject, room } => {
            let issuer = TokenIssuer::from_config(&config.media)?;
            let grant = issuer.issue(&UserId::parse(&subject)?, &RoomId::from(room))?;
            println!("{}", grant.token);
            eprintln!("expires at {}", format_unix(grant.expires_at));
        }
        TokenCommand::Inspect { token } => {
            println!("{}", inspect(config, &token)?);
        }
    }
    Ok(())
}

fn format_unix(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

/// Human-readable description of a token.
///
/// The expiry is readable without the secret; the record needs it.
fn inspect(config: &SightlineConfig, token: &str) -> Result<String, SightlineError> {
    let expire = sightline_token::peek_expire(token)?;
    let mut out = format!("expires: {}", format_unix(expire));

    match TokenIssuer::from_config(&config.media) {
        Ok(issuer) => {
            let info = issuer.inspect(token)?;
            let record = serde_json::to_string_pretty(&info)
                .map_err(|e| SightlineError::Internal(e.to_string()))?;
            out.push('\n');
            out.push_str(&record);
        }
        Err(_) => out.push_str("\n(media secret not configured; record not decrypted)"),
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use sightline_test_utils::fixtures::{test_config, user};

    use super::*;

    #[test]
    fn inspect_decrypts_with_configured_secret() {
        let config = test_config();
        let issuer = TokenIssuer::from_config(&config.media).unwrap();
        let grant = issuer.issue(&user("s1"), &RoomId::from("call_s1_v1")).unwrap();

        let out = inspect(&config, &grant.token).unwrap();
        assert!(out.starts_with("expires: "));
        assert!(out.contains("\"user_id\": \"s1\""));
        assert!(out.contains("call_s1_v1"));
    }

    #[test]
    fn inspect_without_secret_shows_expiry_only() {
        let config = test_config();
        let issuer = TokenIssuer::from_config(&config.media).unwrap();
        let grant = issuer.issue(&user("s1"), &RoomId::from("call_s1_v1")).unwrap();

        let mut bare = test_config();
        bare.media.server_secret = None;
        let out = inspect(&bare, &grant.token).unwrap();
        assert!(out.contains("record not decrypted"));
    }

    #[test]
    fn inspect_rejects_garbage() {
        assert!(inspect(&test_config(), "not-a-token").is_err());
    }
}
