// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./sightline.toml` > `~/.config/sightline/sightline.toml` >
//! `/etc/sightline/sightline.toml` with environment variable overrides via `SIGHTLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SightlineConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sightline/sightline.toml` (system-wide)
/// 3. `~/.config/sightline/sightline.toml` (user XDG config)
/// 4. `./sightline.toml` (local directory)
/// 5. `SIGHTLINE_*` environment variables
pub fn load_config() -> Result<SightlineConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SightlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SightlineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SightlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SightlineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/sightline/sightline.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("sightline").join("sightline.toml"));
    }
    paths.push(PathBuf::from("sightline.toml"));
    paths
}

/// Build the layered Figment behind [`load_config`].
pub fn build_figment() -> Figment {
    search_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(SightlineConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: keys such as
/// `SIGHTLINE_MEDIA_SERVER_SECRET` must map to `media.server_secret`,
/// not `media.server.secret`.
fn env_provider() -> Env {
    Env::prefixed("SIGHTLINE_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("service_", "service.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("media_", "media.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("broker_", "broker.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn from_str_merges_over_defaults() {
        let config = load_config_from_str(
            r#"
[media]
app_id = 1234
"#,
        )
        .unwrap();
        assert_eq!(config.media.app_id, 1234);
        assert_eq!(config.media.token_ttl_secs, 3600);
        assert_eq!(config.gateway.host, "127.0.0.1");
    }

    #[test]
    fn env_overrides_underscore_keys() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "sightline.toml",
                r#"
[media]
app_id = 1
token_ttl_secs = 60
"#,
            )?;
            jail.set_env("SIGHTLINE_MEDIA_TOKEN_TTL_SECS", "900");
            jail.set_env("SIGHTLINE_GATEWAY_BEARER_TOKEN", "from-env");
            jail.set_env("SIGHTLINE_BROKER_RINGING_TIMEOUT_SECS", "45");

            let config = load_config_from_path(Path::new("sightline.toml"))?;
            assert_eq!(config.media.app_id, 1);
            assert_eq!(config.media.token_ttl_secs, 900);
            assert_eq!(config.gateway.bearer_token.as_deref(), Some("from-env"));
            assert_eq!(config.broker.ringing_timeout_secs, Some(45));
            Ok(())
        });
    }
}
