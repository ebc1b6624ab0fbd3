// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the call API.
//!
//! Field names follow what existing mobile clients send and expect
//! (`roomID`, `targetUserId`, `incomingCalls`, `appID`).

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use sightline_broker::{CallTicket, IncomingCall, MediaGrant};
use sightline_core::{HealthStatus, ParticipantRef, RoomId, SightlineError, UserId};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for POST /call/direct.
#[derive(Debug, Deserialize)]
pub struct DirectCallRequest {
    #[serde(rename = "targetUserId")]
    pub target_user_id: String,
}

/// Request body for POST /call/answer, /call/end, and /call/token.
#[derive(Debug, Deserialize)]
pub struct RoomRequest {
    #[serde(rename = "roomID")]
    pub room_id: String,
}

/// Request body for POST /call/availability.
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

/// Join credentials, flattened into every response that hands out a token.
#[derive(Debug, Serialize)]
pub struct JoinInfo {
    #[serde(rename = "roomID")]
    pub room_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub token: String,
    #[serde(rename = "appID")]
    pub app_id: u32,
    #[serde(rename = "serverUrl", skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// Unix seconds.
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
}

impl JoinInfo {
    fn new(room_id: &RoomId, user_id: &UserId, grant: MediaGrant) -> Self {
        Self {
            room_id: room_id.to_string(),
            user_id: user_id.to_string(),
            token: grant.token,
            app_id: grant.app_id,
            server_url: grant.server_url,
            expires_at: grant.expires_at,
        }
    }
}

/// The other side of a placed call.
#[derive(Debug, Serialize)]
pub struct PeerBody {
    pub id: String,
    pub languages: Vec<String>,
}

/// Response body for POST /call/direct and POST /call/volunteer.
#[derive(Debug, Serialize)]
pub struct CallResponse {
    #[serde(flatten)]
    pub join: JoinInfo,
    pub peer: PeerBody,
}

impl CallResponse {
    fn new(caller: &UserId, ticket: CallTicket) -> Self {
        Self {
            join: JoinInfo::new(&ticket.room_id, caller, ticket.grant),
            peer: PeerBody {
                id: ticket.peer.user_id.to_string(),
                languages: ticket.peer.languages,
            },
        }
    }
}

/// Response body for POST /call/answer.
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub ok: bool,
    pub state: String,
    #[serde(flatten)]
    pub join: JoinInfo,
}

/// Response body for POST /call/end and POST /call/availability.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct CallerBody {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct IncomingCallBody {
    #[serde(rename = "roomID")]
    pub room_id: String,
    pub caller: CallerBody,
    /// Unix milliseconds at which the call started ringing.
    pub timestamp: i64,
}

impl From<IncomingCall> for IncomingCallBody {
    fn from(call: IncomingCall) -> Self {
        Self {
            room_id: call.room_id.to_string(),
            caller: CallerBody {
                id: call.caller_id.to_string(),
            },
            timestamp: call.created_at.timestamp_millis(),
        }
    }
}

/// Response body for GET /call/incoming.
#[derive(Debug, Serialize)]
pub struct IncomingResponse {
    #[serde(rename = "incomingCalls")]
    pub incoming_calls: Vec<IncomingCallBody>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

fn room_from(raw: String) -> Result<RoomId, SightlineError> {
    if raw.trim().is_empty() {
        return Err(SightlineError::InvalidArgument("roomID required".to_string()));
    }
    Ok(RoomId::from(raw))
}

/// POST /call/direct
pub async fn post_direct_call(
    State(state): State<GatewayState>,
    Extension(me): Extension<ParticipantRef>,
    payload: Result<Json<DirectCallRequest>, JsonRejection>,
) -> Result<Json<CallResponse>, ApiError> {
    let Json(body) = payload?;
    let target = UserId::parse(&body.target_user_id)
        .map_err(|e| SightlineError::InvalidArgument(format!("targetUserId: {e}")))?;
    let ticket = state.broker.request_direct_call(&me, &target).await?;
    Ok(Json(CallResponse::new(&me.id, ticket)))
}

/// POST /call/volunteer
pub async fn post_request_volunteer(
    State(state): State<GatewayState>,
    Extension(me): Extension<ParticipantRef>,
) -> Result<Json<CallResponse>, ApiError> {
    let ticket = state.broker.request_any_volunteer(&me).await?;
    Ok(Json(CallResponse::new(&me.id, ticket)))
}

/// GET /call/incoming
///
/// Polled every few seconds by callees. Pure read.
pub async fn get_incoming(
    State(state): State<GatewayState>,
    Extension(me): Extension<ParticipantRef>,
) -> Result<Json<IncomingResponse>, ApiError> {
    let incoming = state.broker.poll(&me.id).await?;
    Ok(Json(IncomingResponse {
        incoming_calls: incoming.into_iter().map(IncomingCallBody::from).collect(),
    }))
}

/// POST /call/answer
pub async fn post_answer(
    State(state): State<GatewayState>,
    Extension(me): Extension<ParticipantRef>,
    payload: Result<Json<RoomRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let Json(body) = payload?;
    let room_id = room_from(body.room_id)?;
    let ticket = state.broker.answer(&me, &room_id).await?;
    Ok(Json(AnswerResponse {
        ok: true,
        state: ticket.session.state.to_string(),
        join: JoinInfo::new(&room_id, &me.id, ticket.grant),
    }))
}

/// POST /call/end
///
/// Always `{ok: true}` for a well-formed request, whether or not a call
/// was live.
pub async fn post_end(
    State(state): State<GatewayState>,
    Extension(me): Extension<ParticipantRef>,
    payload: Result<Json<RoomRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(body) = payload?;
    let room_id = room_from(body.room_id)?;
    state.broker.end(&me, &room_id).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// POST /call/token
pub async fn post_token(
    State(state): State<GatewayState>,
    Extension(me): Extension<ParticipantRef>,
    payload: Result<Json<RoomRequest>, JsonRejection>,
) -> Result<Json<JoinInfo>, ApiError> {
    let Json(body) = payload?;
    let room_id = room_from(body.room_id)?;
    let grant = state.broker.refresh_token(&me, &room_id).await?;
    Ok(Json(JoinInfo::new(&room_id, &me.id, grant)))
}

/// POST /call/availability
pub async fn post_availability(
    State(state): State<GatewayState>,
    Extension(me): Extension<ParticipantRef>,
    payload: Result<Json<AvailabilityRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(body) = payload?;
    state.broker.set_availability(&me, body.available).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// GET /health
///
/// Unauthenticated. A broken volunteer directory degrades the service but
/// direct calls still work, so the check stays 200.
pub async fn get_health(State(state): State<GatewayState>) -> (StatusCode, Json<HealthResponse>) {
    let status = match state.broker.directory_health().await {
        HealthStatus::Healthy => "ok",
        HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => {
            tracing::warn!(reason = %reason, "volunteer directory unhealthy");
            "degraded"
        }
    };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.start_time.elapsed().as_secs(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_info_uses_client_field_names() {
        let info = JoinInfo {
            room_id: "call_a_b".into(),
            user_id: "a".into(),
            token: "04abc".into(),
            app_id: 7,
            server_url: None,
            expires_at: 100,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["roomID"], "call_a_b");
        assert_eq!(json["userID"], "a");
        assert_eq!(json["appID"], 7);
        assert!(json.get("serverUrl").is_none());
    }

    #[test]
    fn room_request_reads_room_id() {
        let req: RoomRequest = serde_json::from_str(r#"{"roomID":"call_a_b"}"#).unwrap();
        assert_eq!(req.room_id, "call_a_b");
        assert!(room_from(" ".to_string()).is_err());
    }

    #[test]
    fn direct_call_request_reads_target() {
        let req: DirectCallRequest =
            serde_json::from_str(r#"{"targetUserId":"65f1c2aa"}"#).unwrap();
        assert_eq!(req.target_user_id, "65f1c2aa");
    }
}
