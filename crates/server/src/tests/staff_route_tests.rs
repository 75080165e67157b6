// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;

use super::{
    check_in_through_session, create_test_app, empty_request, json_request, open_session, send,
    staff_request,
};

#[tokio::test]
async fn test_staff_routes_require_access_key() {
    let app: Router = create_test_app();

    let (status, _) = send(&app, empty_request("GET", "/visitors")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong_key: Request<Body> = Request::builder()
        .method("GET")
        .uri("/visitors")
        .header("Authorization", "Bearer not-the-key")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, wrong_key).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let not_bearer: Request<Body> = Request::builder()
        .method("POST")
        .uri("/visitors/TEMP001/promote")
        .header("Authorization", "Basic abc")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, not_bearer).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_visitors() {
    let app: Router = create_test_app();
    check_in_through_session(&app, "traore", "0102030405", true).await;
    check_in_through_session(&app, "kone", "0203040506", false).await;

    let (status, body) = send(&app, staff_request("GET", "/visitors", None)).await;

    assert_eq!(status, StatusCode::OK);
    let visitors = body["visitors"].as_array().unwrap();
    assert_eq!(visitors.len(), 1);
    assert_eq!(visitors[0]["identifier"], "TEMP001");
    assert_eq!(visitors[0]["name"], "TRAORE");
    assert_eq!(visitors[0]["contact"], "+2250102030405");
    assert_eq!(visitors[0]["wants_to_stay"], false);
}

#[tokio::test]
async fn test_list_visitors_rejects_bad_date() {
    let app: Router = create_test_app();

    let (status, _) = send(
        &app,
        staff_request("GET", "/visitors?first_attendance=yesterday", None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_promote_visitor_and_history() {
    let app: Router = create_test_app();
    check_in_through_session(&app, "traore", "0102030405", true).await;

    let (status, body) = send(
        &app,
        staff_request("POST", "/visitors/TEMP001/promote", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["new_identifier"], "MEMBER00001");
    assert_eq!(body["records_moved"], 1);

    let (status, body) = send(
        &app,
        staff_request("GET", "/persons/MEMBER00001/attendance", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "MEMBER");
    assert_eq!(body["records"][0]["wants_to_stay"], true);

    let (status, _) = send(
        &app,
        staff_request("POST", "/visitors/TEMP001/promote", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        staff_request("POST", "/visitors/MEMBER00001/promote", None),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_session_conversions() {
    let app: Router = create_test_app();
    check_in_through_session(&app, "traore", "0102030405", true).await;
    let key: String = open_session(&app).await;

    // Selections are only accepted on the visitor page.
    let (status, _) = send(
        &app,
        staff_request(
            "POST",
            &format!("/sessions/{key}/visitors/TEMP001/selection"),
            Some(&json!({ "wants_to_stay": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(
        &app,
        json_request(
            "POST",
            &format!("/sessions/{key}/navigate"),
            &json!({ "page": "new_visitors" }),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        staff_request(
            "POST",
            &format!("/sessions/{key}/visitors/TEMP001/selection"),
            Some(&json!({ "wants_to_stay": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selections"]["TEMP001"], true);

    let (_, listed) = send(
        &app,
        staff_request("GET", &format!("/visitors?session={key}"), None),
    )
    .await;
    assert_eq!(listed["visitors"][0]["wants_to_stay"], true);

    let (status, body) = send(
        &app,
        staff_request("POST", &format!("/sessions/{key}/conversions"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["conversions"]["converted"][0]["new_identifier"],
        "MEMBER00001"
    );
    assert!(body["session"]["selections"].as_object().unwrap().is_empty());

    let (status, _) = send(
        &app,
        staff_request("POST", &format!("/sessions/{key}/conversions"), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
