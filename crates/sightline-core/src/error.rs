// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Sightline call broker.

use thiserror::Error;

/// The primary error type used across the broker, its adapters, and the gateway.
///
/// Variants follow the broker's error taxonomy; the gateway maps each one to
/// exactly one HTTP status code.
#[derive(Debug, Error)]
pub enum SightlineError {
    /// Malformed input: empty ids, bad token parameters, unparseable bodies.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The caller's role does not permit the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A room, session, or volunteer record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// No volunteer is both available and consenting right now.
    ///
    /// Not a system fault; surfaced to the user as a plain "try again later".
    #[error("no volunteers available")]
    NoVolunteerAvailable,

    /// Missing or invalid identity handed over by the identity layer.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Configuration errors (invalid TOML, missing secrets, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Volunteer directory or database failure.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SightlineError {
    /// Whether a single immediate retry may succeed.
    ///
    /// Only failures talking to an external collaborator qualify; domain
    /// outcomes such as `NotFound` are final.
    pub fn is_transient(&self) -> bool {
        matches!(self, SightlineError::Storage { .. } | SightlineError::Internal(_))
    }

    /// Convenience constructor for storage errors from any error source.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        SightlineError::Storage {
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_only_for_collaborator_failures() {
        assert!(SightlineError::storage("db locked").is_transient());
        assert!(SightlineError::Internal("boom".into()).is_transient());

        assert!(!SightlineError::NoVolunteerAvailable.is_transient());
        assert!(!SightlineError::NotFound("room".into()).is_transient());
        assert!(!SightlineError::InvalidArgument("x".into()).is_transient());
        assert!(!SightlineError::Forbidden("x".into()).is_transient());
        assert!(!SightlineError::Unauthenticated("x".into()).is_transient());
    }

    #[test]
    fn no_volunteer_message_is_user_facing() {
        assert_eq!(
            SightlineError::NoVolunteerAvailable.to_string(),
            "no volunteers available"
        );
    }
}
