// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity middleware for the gateway.
//!
//! The external identity layer verifies end users and forwards each request
//! with `Authorization: Bearer <shared token>`, `X-User-Id`, and
//! `X-User-Role`. The middleware checks the shared token and turns the two
//! headers into a [`ParticipantRef`] request extension.
//!
//! When no bearer token is configured, all requests are rejected (fail-closed).

use std::str::FromStr;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use sightline_core::{ParticipantRef, Role, SightlineError, UserId};

use crate::error::ApiError;

/// Header carrying the verified user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the verified role (`seeker`, `blind`, or `volunteer`).
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared secret the identity layer presents. `None` rejects everything.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Resolve the participant a request acts for.
fn identify(auth: &AuthConfig, request: &Request) -> Result<ParticipantRef, SightlineError> {
    let Some(expected) = auth.bearer_token.as_deref() else {
        tracing::error!("gateway has no bearer token configured -- rejecting request");
        return Err(SightlineError::Unauthenticated(
            "identity layer not configured".to_string(),
        ));
    };

    let presented = header(request, "authorization").and_then(|v| v.strip_prefix("Bearer "));
    if presented != Some(expected) {
        return Err(SightlineError::Unauthenticated(
            "missing or invalid bearer token".to_string(),
        ));
    }

    let id = header(request, USER_ID_HEADER)
        .ok_or_else(|| SightlineError::Unauthenticated("missing X-User-Id".to_string()))?;
    let id = UserId::parse(id)
        .map_err(|e| SightlineError::Unauthenticated(format!("invalid X-User-Id: {e}")))?;

    let role = header(request, USER_ROLE_HEADER)
        .ok_or_else(|| SightlineError::Unauthenticated("missing X-User-Role".to_string()))?;
    let role = Role::from_str(role.trim())
        .map_err(|_| SightlineError::Unauthenticated(format!("unknown role `{role}`")))?;

    Ok(ParticipantRef::new(id, role))
}

/// Middleware that attaches the verified [`ParticipantRef`] to the request.
pub async fn identity_middleware(
    State(auth): State<AuthConfig>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let participant = identify(&auth, &request)?;
    tracing::trace!(user_id = %participant.id, role = %participant.role, "request identified");
    request.extensions_mut().insert(participant);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn auth(token: Option<&str>) -> AuthConfig {
        AuthConfig {
            bearer_token: token.map(str::to_string),
        }
    }

    fn request(headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder().uri("/call/incoming");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn debug_redacts_token() {
        let debug = format!("{:?}", auth(Some("secret-token")));
        assert!(debug.contains("[redacted]"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn unconfigured_token_fails_closed() {
        let req = request(&[
            ("authorization", "Bearer anything"),
            (USER_ID_HEADER, "u1"),
            (USER_ROLE_HEADER, "seeker"),
        ]);
        assert!(matches!(
            identify(&auth(None), &req),
            Err(SightlineError::Unauthenticated(_))
        ));
    }

    #[test]
    fn wrong_token_is_rejected() {
        let req = request(&[
            ("authorization", "Bearer nope"),
            (USER_ID_HEADER, "u1"),
            (USER_ROLE_HEADER, "seeker"),
        ]);
        assert!(identify(&auth(Some("right")), &req).is_err());
    }

    #[test]
    fn legacy_blind_role_maps_to_seeker() {
        let req = request(&[
            ("authorization", "Bearer right"),
            (USER_ID_HEADER, "65f1c2aa"),
            (USER_ROLE_HEADER, "blind"),
        ]);
        let participant = identify(&auth(Some("right")), &req).unwrap();
        assert_eq!(participant.role, Role::Seeker);
        assert_eq!(participant.id.as_str(), "65f1c2aa");
    }

    #[test]
    fn malformed_identity_headers_are_rejected() {
        for headers in [
            vec![("authorization", "Bearer right"), (USER_ROLE_HEADER, "seeker")],
            vec![
                ("authorization", "Bearer right"),
                (USER_ID_HEADER, "has_underscore"),
                (USER_ROLE_HEADER, "seeker"),
            ],
            vec![
                ("authorization", "Bearer right"),
                (USER_ID_HEADER, "u1"),
                (USER_ROLE_HEADER, "admin"),
            ],
        ] {
            let req = request(&headers);
            assert!(matches!(
                identify(&auth(Some("right")), &req),
                Err(SightlineError::Unauthenticated(_))
            ));
        }
    }
}
