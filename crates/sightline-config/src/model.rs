// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Sightline call broker.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Sightline configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SightlineConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Media transport tenant and token settings.
    #[serde(default)]
    pub media: MediaConfig,

    /// Volunteer directory storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Call lifecycle policy.
    #[serde(default)]
    pub broker: BrokerConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "sightline".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret presented by the identity layer on every forwarded request.
    /// The gateway refuses to start without one.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

/// Media transport tenant configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Tenant id assigned by the media provider. `0` means unset.
    #[serde(default)]
    pub app_id: u32,

    /// 32-byte server secret shared with the media provider.
    #[serde(default)]
    pub server_secret: Option<String>,

    /// Lifetime of minted join tokens in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u32,

    /// Media endpoint returned to clients alongside their token.
    #[serde(default)]
    pub server_url: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            app_id: 0,
            server_secret: None,
            token_ttl_secs: default_token_ttl_secs(),
            server_url: None,
        }
    }
}

impl std::fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaConfig")
            .field("app_id", &self.app_id)
            .field(
                "server_secret",
                &self.server_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("server_url", &self.server_url)
            .finish()
    }
}

fn default_token_ttl_secs() -> u32 {
    3600
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file holding the volunteer directory.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("sightline").join("sightline.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("sightline.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Call lifecycle policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerConfig {
    /// Evict calls still ringing after this many seconds. `None` keeps them
    /// until either party ends the call.
    #[serde(default)]
    pub ringing_timeout_secs: Option<u64>,

    /// How often the expiry sweep runs when a ringing timeout is set.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            ringing_timeout_secs: None,
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SightlineConfig::default();
        assert_eq!(config.service.name, "sightline");
        assert_eq!(config.gateway.port, 4000);
        assert_eq!(config.media.token_ttl_secs, 3600);
        assert!(config.broker.ringing_timeout_secs.is_none());
        assert_eq!(config.broker.sweep_interval_secs, 5);
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = SightlineConfig::default();
        config.gateway.bearer_token = Some("proxy-secret".to_string());
        config.media.server_secret = Some("0123456789abcdef0123456789abcdef".to_string());

        let debug = format!("{config:?}");
        assert!(!debug.contains("proxy-secret"));
        assert!(!debug.contains("0123456789abcdef"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn unknown_section_key_is_rejected() {
        let toml_str = r#"
[media]
app_id = 7
sercet = "typo"
"#;
        assert!(toml::from_str::<SightlineConfig>(toml_str).is_err());
    }
}
