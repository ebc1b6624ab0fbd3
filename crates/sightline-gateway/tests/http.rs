// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP-level tests driving the router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use sightline_broker::{InMemoryCallRegistry, SessionBroker, TokenIssuer, VolunteerPool};
use sightline_gateway::{build_router, AuthConfig, GatewayState};
use sightline_test_utils::fixtures::{test_config, volunteer_record, TEST_APP_ID, TEST_BEARER};
use sightline_test_utils::MockDirectory;

struct TestApp {
    router: Router,
    broker: Arc<SessionBroker>,
    directory: Arc<MockDirectory>,
}

fn app(records: Vec<sightline_core::VolunteerRecord>) -> TestApp {
    let directory = Arc::new(MockDirectory::with_records(records));
    let broker = Arc::new(SessionBroker::new(
        Arc::new(InMemoryCallRegistry::new()),
        VolunteerPool::new(directory.clone()),
        TokenIssuer::from_config(&test_config().media).unwrap(),
    ));
    let state = GatewayState::new(
        broker.clone(),
        AuthConfig {
            bearer_token: Some(TEST_BEARER.to_string()),
        },
    );
    TestApp {
        router: build_router(state),
        broker,
        directory,
    }
}

fn request(
    method: &str,
    uri: &str,
    user: Option<(&str, &str)>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {TEST_BEARER}"));
    if let Some((id, role)) = user {
        builder = builder.header("x-user-id", id).header("x-user-role", role);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn health_needs_no_identity() {
    let app = app(vec![]);
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn call_routes_require_identity() {
    let app = app(vec![]);

    let (status, _) = send(&app, request("GET", "/call/incoming", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/call/incoming")
        .header("authorization", "Bearer wrong")
        .header("x-user-id", "s1")
        .header("x-user-role", "seeker")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn volunteer_flow_over_http() {
    let app = app(vec![volunteer_record("v1", true, true)]);

    let (status, body) = send(
        &app,
        request("POST", "/call/volunteer", Some(("s1", "blind")), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roomID"], "call_s1_v1");
    assert_eq!(body["userID"], "s1");
    assert_eq!(body["appID"], TEST_APP_ID);
    assert_eq!(body["peer"]["id"], "v1");
    assert_eq!(body["peer"]["languages"], json!(["en"]));
    let token = body["token"].as_str().unwrap();
    assert_eq!(app.broker.tokens().inspect(token).unwrap().user_id, "s1");

    let (status, body) = send(
        &app,
        request("GET", "/call/incoming", Some(("v1", "volunteer")), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let calls = body["incomingCalls"].as_array().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["roomID"], "call_s1_v1");
    assert_eq!(calls[0]["caller"]["id"], "s1");
    assert!(calls[0]["timestamp"].is_i64());

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/call/answer",
            Some(("v1", "volunteer")),
            Some(json!({"roomID": "call_s1_v1"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["state"], "active");
    assert_eq!(body["userID"], "v1");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/call/end",
            Some(("s1", "seeker")),
            Some(json!({"roomID": "call_s1_v1"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (_, body) = send(
        &app,
        request("GET", "/call/incoming", Some(("v1", "volunteer")), None),
    )
    .await;
    assert_eq!(body["incomingCalls"], json!([]));
    assert!(app
        .directory
        .record(&sightline_test_utils::fixtures::user("v1"))
        .await
        .unwrap()
        .is_available);
}

#[tokio::test]
async fn no_volunteer_is_404_with_message() {
    let app = app(vec![volunteer_record("v1", true, false)]);
    let (status, body) = send(
        &app,
        request("POST", "/call/volunteer", Some(("s1", "seeker")), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "No volunteers available"}));
}

#[tokio::test]
async fn volunteers_may_not_request_volunteers() {
    let app = app(vec![volunteer_record("v1", true, true)]);
    let (status, _) = send(
        &app,
        request("POST", "/call/volunteer", Some(("v2", "volunteer")), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn directory_outage_is_opaque_500() {
    let app = app(vec![volunteer_record("v1", true, true)]);
    app.directory.fail_next(2);
    let (status, body) = send(
        &app,
        request("POST", "/call/volunteer", Some(("s1", "seeker")), None),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "internal server error"}));
}

#[tokio::test]
async fn direct_call_validates_target() {
    let app = app(vec![]);

    let (status, _) = send(
        &app,
        request("POST", "/call/direct", Some(("s1", "seeker")), Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/call/direct",
            Some(("s1", "seeker")),
            Some(json!({"targetUserId": "s1"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/call/direct",
            Some(("s1", "seeker")),
            Some(json!({"targetUserId": "s2"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roomID"], "call_s1_s2");
    assert_eq!(body["serverUrl"], "wss://media.example.test/ws");
}

#[tokio::test]
async fn answer_unknown_room_is_404_and_end_is_always_ok() {
    let app = app(vec![]);
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/call/answer",
            Some(("s2", "seeker")),
            Some(json!({"roomID": "call_s1_s2"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/call/end",
            Some(("s2", "seeker")),
            Some(json!({"roomID": "call_s1_s2"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn token_refresh_and_availability() {
    let app = app(vec![volunteer_record("v1", false, true)]);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/call/availability",
            Some(("v1", "volunteer")),
            Some(json!({"available": true})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/call/availability",
            Some(("ghost", "volunteer")),
            Some(json!({"available": true})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(
        &app,
        request("POST", "/call/volunteer", Some(("s1", "seeker")), None),
    )
    .await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/call/token",
            Some(("v1", "volunteer")),
            Some(json!({"roomID": "call_s1_v1"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userID"], "v1");

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/call/token",
            Some(("s9", "seeker")),
            Some(json!({"roomID": "call_s1_v1"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
