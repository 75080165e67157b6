// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Router tests, driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod staff_route_tests;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use presence_persistence::Persistence;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::{AppState, SessionStore, build_router};

pub const TEST_ACCESS_KEY: &str = "test-access-key";

/// Helper to create test app state with in-memory persistence.
pub fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        sessions: Arc::new(Mutex::new(SessionStore::new())),
        access_key: Arc::new(String::from(TEST_ACCESS_KEY)),
    }
}

pub fn create_test_app() -> Router {
    build_router(create_test_app_state())
}

/// Sends a request and returns the status and JSON body (`Null` when the
/// body is not JSON).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status: StatusCode = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn staff_request(method: &str, uri: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {TEST_ACCESS_KEY}"));
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn create_test_form(name: &str, contact: &str, first_time: bool) -> Value {
    serde_json::json!({
        "name": name,
        "given_names": "aya",
        "sex": "female",
        "birth_date": "1995-09-02",
        "contact": contact,
        "residence": "marcory",
        "first_time": first_time,
    })
}

/// Opens a session and returns its key.
pub async fn open_session(app: &Router) -> String {
    let (status, body) = send(app, empty_request("POST", "/sessions")).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_key"].as_str().unwrap().to_string()
}

/// Checks someone in through a fresh session and returns the identifier.
pub async fn check_in_through_session(
    app: &Router,
    name: &str,
    contact: &str,
    first_time: bool,
) -> String {
    let key: String = open_session(app).await;
    let (status, body) = send(
        app,
        json_request(
            "POST",
            &format!("/sessions/{key}/check_in"),
            &create_test_form(name, contact, first_time),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["check_in"]["identifier"].as_str().unwrap().to_string()
}
