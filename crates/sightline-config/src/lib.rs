// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broker configuration: a layered TOML model with `SIGHTLINE_*` overrides.
//!
//! Unknown keys are rejected and reported with a closest-match suggestion;
//! semantic checks (secret length, lifetimes, paths) run after loading and
//! report every problem at once.
//!
//! # Usage
//!
//! ```no_run
//! use sightline_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("listening on {}:{}", config.gateway.host, config.gateway.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::SightlineConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid `SightlineConfig` or every diagnostic found.
pub fn load_and_validate() -> Result<SightlineConfig, Vec<ConfigError>> {
    checked(loader::load_config(), existing_sources)
}

/// Load configuration from an explicit file path and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<SightlineConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<SightlineConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validate a loaded config, or turn the load error into diagnostics. Sources
/// are only read when there is an error to point into.
fn checked(
    loaded: Result<SightlineConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<SightlineConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

fn existing_sources() -> Vec<(String, String)> {
    loader::search_paths()
        .iter()
        .filter_map(|path| read_source(path))
        .collect()
}

/// Read a config file, keyed the way figment reports its path.
fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    let shown = if path.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    };
    Some((shown.display().to_string(), content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_config_with_invalid_secret_reports_validation_error() {
        let errors = load_and_validate_str(
            r#"
[media]
app_id = 9
server_secret = "too-short"
"#,
        )
        .unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message } if message.contains("server_secret")
        )));
    }

    #[test]
    fn str_config_with_wrong_type_reports_invalid_type() {
        let errors = load_and_validate_str(
            r#"
[gateway]
port = "not-a-port"
"#,
        )
        .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))));
    }
}
