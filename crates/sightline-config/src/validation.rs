// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as secret lengths, non-zero lifetimes, and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::SightlineConfig;

/// Required length of the media server secret in bytes.
pub const SERVER_SECRET_LEN: usize = 32;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SightlineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "gateway.bearer_token must not be blank when set".to_string(),
        });
    }

    if config.media.token_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "media.token_ttl_secs must be greater than 0".to_string(),
        });
    }

    if let Some(secret) = &config.media.server_secret {
        if secret.len() != SERVER_SECRET_LEN {
            errors.push(ConfigError::Validation {
                message: format!(
                    "media.server_secret must be exactly {SERVER_SECRET_LEN} bytes, got {}",
                    secret.len()
                ),
            });
        }
        if config.media.app_id == 0 {
            errors.push(ConfigError::Validation {
                message: "media.app_id must be set when media.server_secret is set".to_string(),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.broker.ringing_timeout_secs == Some(0) {
        errors.push(ConfigError::Validation {
            message: "broker.ringing_timeout_secs must be greater than 0 when set".to_string(),
        });
    }

    if config.broker.sweep_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "broker.sweep_interval_secs must be greater than 0".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = SightlineConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn short_secret_fails_validation() {
        let mut config = SightlineConfig::default();
        config.media.app_id = 42;
        config.media.server_secret = Some("a".repeat(31));
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "server_secret"));
    }

    #[test]
    fn secret_without_app_id_fails_validation() {
        let mut config = SightlineConfig::default();
        config.media.server_secret = Some("a".repeat(32));
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "media.app_id"));
    }

    #[test]
    fn zero_ttl_fails_validation() {
        let mut config = SightlineConfig::default();
        config.media.token_ttl_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "token_ttl_secs"));
    }

    #[test]
    fn zero_ringing_timeout_fails_validation() {
        let mut config = SightlineConfig::default();
        config.broker.ringing_timeout_secs = Some(0);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "ringing_timeout_secs"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = SightlineConfig::default();
        config.gateway.host = " ".to_string();
        config.storage.database_path = String::new();
        config.broker.sweep_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = SightlineConfig::default();
        config.gateway.host = "0.0.0.0".to_string();
        config.gateway.bearer_token = Some("proxy".to_string());
        config.media.app_id = 1_234_567;
        config.media.server_secret = Some("0123456789abcdef0123456789abcdef".to_string());
        config.broker.ringing_timeout_secs = Some(60);
        assert!(validate_config(&config).is_ok());
    }
}
