// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment load failures into miette diagnostics.
//!
//! Unknown keys get a source span (when the offending file can be found) and
//! a closest-match suggestion scored with Jaro-Winkler.

#![allow(unused_assignments)] // emitted by the miette Diagnostic derive

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Scores at or below this are not worth suggesting.
const MIN_SIMILARITY: f64 = 0.75;

/// One problem found while loading or validating `sightline.toml`.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a known setting")]
    #[diagnostic(
        code(sightline::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("unknown key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(sightline::config::invalid_type), help("use a value of type {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("`{key}` is required")]
    #[diagnostic(
        code(sightline::config::missing_key),
        help("set `{key}` in sightline.toml or through a SIGHTLINE_ variable")
    )]
    MissingKey { key: String },

    /// Value parsed but breaks a semantic rule.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(sightline::config::validation))]
    Validation { message: String },

    #[error("could not load configuration: {0}")]
    #[diagnostic(code(sightline::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? (expected one of: {valid_keys})"),
        None => format!("expected one of: {valid_keys}"),
    }
}

/// Split a figment error chain into one diagnostic per failure.
///
/// `toml_sources` pairs each file path figment may report with that file's
/// content, so unknown keys can be underlined.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(key, expected) => {
                let (span, src) = locate_key(&error, key, toml_sources).unzip();
                ConfigError::UnknownKey {
                    key: key.clone(),
                    suggestion: suggest_key(key, *expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(key) => ConfigError::MissingKey {
                key: dotted(&error.path, key),
            },
            Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                detail: format!("got {found}"),
                expected: expected.to_string(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

fn dotted(path: &[String], key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{key}", path.join("."))
    }
}

fn locate_key(
    error: &figment::error::Error,
    key: &str,
    toml_sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let figment::Source::File(file) = error.metadata.as_ref()?.source.as_ref()? else {
        return None;
    };
    let file = file.display().to_string();
    let (name, content) = toml_sources.iter().find(|(path, _)| *path == file)?;
    let offset = find_key_offset(content, &error.path, key)?;
    Some((
        SourceSpan::new(offset.into(), key.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `key` as an assignment inside the `[section]` named by
/// `path[0]`, or anywhere in the file for top-level keys.
pub fn find_key_offset(content: &str, path: &[String], key: &str) -> Option<usize> {
    let start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut line_start = start;
    for line in content[start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];
        if let Some(after) = rest.strip_prefix(key)
            && after.trim_start().starts_with('=')
        {
            return Some(line_start + indent);
        }
        line_start += line.len();
    }
    None
}

/// Closest entry of `valid_keys` to `unknown`, if any is similar enough.
pub fn suggest_key<S: AsRef<str>>(unknown: &str, valid_keys: &[S]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key.as_ref()), key.as_ref()))
        .filter(|(score, _)| *score > MIN_SIMILARITY)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr with miette's graphical report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEDIA_KEYS: &[&str] = &["app_id", "server_secret", "token_ttl_secs", "server_url"];

    #[test]
    fn typo_in_ttl_is_recognized() {
        assert_eq!(
            suggest_key("token_tl_secs", MEDIA_KEYS).as_deref(),
            Some("token_ttl_secs")
        );
    }

    #[test]
    fn transposed_letters_in_secret_are_recognized() {
        assert_eq!(
            suggest_key("server_sercet", MEDIA_KEYS).as_deref(),
            Some("server_secret")
        );
    }

    #[test]
    fn unrelated_key_gets_no_suggestion() {
        assert_eq!(suggest_key("zzzzzz", &["host", "port", "bearer_token"]), None);
    }

    #[test]
    fn key_offset_is_found_under_its_section() {
        let content = "[service]\nprot = 1\n[gateway]\n  prot = 4000\n";
        let o = find_key_offset(content, &["gateway".to_string()], "prot").unwrap();
        assert_eq!(&content[o..o + 4], "prot");
        assert!(o > content.find("[gateway]").unwrap());
    }

    #[test]
    fn key_prefix_does_not_match_longer_key() {
        let content = "[media]\napp_id_extra = 1\n";
        assert_eq!(find_key_offset(content, &["media".to_string()], "app_id"), None);
    }

    #[test]
    fn unknown_key_from_str_produces_suggestion() {
        let err = crate::loader::load_config_from_str("[media]\nap_id = 3\n").unwrap_err();
        let errors = figment_to_config_errors(err, &[]);
        assert!(errors.iter().any(|e| match e {
            ConfigError::UnknownKey {
                key,
                suggestion: Some(s),
                ..
            } => key == "ap_id" && s == "app_id",
            _ => false,
        }));
    }
}
