// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from broker errors to HTTP responses.
//!
//! Client errors carry `{"message": ...}`. Server errors carry only
//! `{"error": "internal server error"}`; the detail goes to the log.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use sightline_core::SightlineError;

/// Body of a 4xx response.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Body of a 5xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

/// A broker error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub SightlineError);

impl From<SightlineError> for ApiError {
    fn from(err: SightlineError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(SightlineError::InvalidArgument(rejection.body_text()))
    }
}

/// Status code for each error kind.
pub fn status_for(err: &SightlineError) -> StatusCode {
    match err {
        SightlineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        SightlineError::Forbidden(_) => StatusCode::FORBIDDEN,
        SightlineError::NotFound(_) | SightlineError::NoVolunteerAvailable => StatusCode::NOT_FOUND,
        SightlineError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        SightlineError::Config(_)
        | SightlineError::Storage { .. }
        | SightlineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = match self.0 {
            SightlineError::NoVolunteerAvailable => "No volunteers available".to_string(),
            SightlineError::InvalidArgument(m)
            | SightlineError::Forbidden(m)
            | SightlineError::NotFound(m)
            | SightlineError::Unauthenticated(m) => m,
            err => {
                tracing::error!(error = %err, "request failed");
                return (
                    status,
                    Json(ErrorBody {
                        error: "internal server error",
                    }),
                )
                    .into_response();
            }
        };
        (status, Json(MessageBody { message })).into_response()
    }
}
