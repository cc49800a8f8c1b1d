//! Integration tests for joining, heartbeating, leaving, and promotion.

mod helpers;

use axum::http::StatusCode;
use chrono::Duration;

#[tokio::test]
async fn test_join_rejects_bad_credentials() {
    let app = helpers::TestApp::new(2).await;
    app.register("S-1").await;

    let response = app
        .request(
            "POST",
            "/api/queue/join",
            Some(serde_json::json!({
                "registrationNumber": "S-1",
                "votingKey": "not-the-key",
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body["error"],
        "Invalid registration number or voting key"
    );
}

#[tokio::test]
async fn test_join_requires_both_fields() {
    let app = helpers::TestApp::new(2).await;

    let response = app
        .request(
            "POST",
            "/api/queue/join",
            Some(serde_json::json!({ "registrationNumber": "S-1" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_join_fills_capacity_then_queues() {
    let app = helpers::TestApp::new(2).await;
    for id in ["S-1", "S-2", "S-3"] {
        app.register(id).await;
    }

    assert_eq!(app.join("S-1").await.body["status"], "active");
    assert_eq!(app.join("S-2").await.body["status"], "active");

    let third = app.join("S-3").await;
    assert_eq!(third.status, StatusCode::OK);
    assert_eq!(third.body["status"], "queued");
    assert_eq!(third.body["position"], 1);

    let status = app.request("GET", "/api/queue/status", None).await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["capacity"], 2);
    assert_eq!(status.body["active"], 2);
    assert_eq!(status.body["available"], 0);
    assert_eq!(status.body["queued"], 1);
    assert_eq!(status.body["headPosition"], 1);
}

#[tokio::test]
async fn test_rejoin_returns_existing_token() {
    let app = helpers::TestApp::new(1).await;
    app.register("S-1").await;
    app.register("S-2").await;

    let active = app.join("S-1").await;
    let again = app.join("S-1").await;
    assert_eq!(again.body["status"], "active");
    assert_eq!(again.token(), active.token());

    let queued = app.join("S-2").await;
    let requeued = app.join("S-2").await;
    assert_eq!(requeued.body["status"], "queued");
    assert_eq!(requeued.body["position"], queued.body["position"]);
    assert_eq!(requeued.token(), queued.token());
}

#[tokio::test]
async fn test_heartbeat_requires_token() {
    let app = helpers::TestApp::new(1).await;

    let response = app
        .request("POST", "/api/queue/heartbeat", Some(serde_json::json!({})))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Session token required");
}

#[tokio::test]
async fn test_heartbeat_unknown_token() {
    let app = helpers::TestApp::new(1).await;

    let response = app.post_token("/api/queue/heartbeat", "no-such-token").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Session not found or expired");
    assert_eq!(response.body["sessionValid"], false);
}

#[tokio::test]
async fn test_heartbeat_reports_standing() {
    let app = helpers::TestApp::new(1).await;
    app.register("S-1").await;
    app.register("S-2").await;

    let active = app.join("S-1").await.token();
    let queued = app.join("S-2").await.token();

    let response = app.post_token("/api/queue/heartbeat", &active).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "active");
    assert_eq!(response.body["sessionValid"], true);

    let response = app.post_token("/api/queue/heartbeat", &queued).await;
    assert_eq!(response.body["status"], "queued");
    assert_eq!(response.body["position"], 1);
    assert_eq!(response.body["sessionValid"], true);
}

#[tokio::test]
async fn test_expired_holder_is_replaced_by_live_waiter() {
    let app = helpers::TestApp::new(1).await;
    app.register("S-1").await;
    app.register("S-2").await;

    let holder = app.join("S-1").await.token();
    let waiter = app.join("S-2").await.token();

    // Only the waiter keeps heartbeating.
    app.clock.advance(Duration::seconds(200));
    assert_eq!(
        app.post_token("/api/queue/heartbeat", &waiter).await.status,
        StatusCode::OK
    );
    app.clock.advance(Duration::seconds(150));

    let manage = app.request("POST", "/api/queue/manage", None).await;
    assert_eq!(manage.status, StatusCode::OK);
    assert_eq!(manage.body["success"], true);
    assert_eq!(manage.body["promoted"], 1);
    assert!(manage.body["timestamp"].is_string());

    let response = app.post_token("/api/queue/heartbeat", &waiter).await;
    assert_eq!(response.body["status"], "active");

    let response = app.post_token("/api/queue/heartbeat", &holder).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["sessionValid"], false);
}

#[tokio::test]
async fn test_leave_frees_slot() {
    let app = helpers::TestApp::new(1).await;
    app.register("S-1").await;
    app.register("S-2").await;

    let holder = app.join("S-1").await.token();
    let waiter = app.join("S-2").await.token();

    let response = app.post_token("/api/queue/leave", &holder).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["released"], "session");

    let again = app.post_token("/api/queue/leave", &holder).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let manage = app.request("POST", "/api/queue/manage", None).await;
    assert_eq!(manage.body["promoted"], 1);

    let response = app.post_token("/api/queue/heartbeat", &waiter).await;
    assert_eq!(response.body["status"], "active");
}

#[tokio::test]
async fn test_manage_with_nothing_to_do() {
    let app = helpers::TestApp::new(3).await;

    let manage = app.request("POST", "/api/queue/manage", None).await;

    assert_eq!(manage.status, StatusCode::OK);
    assert_eq!(manage.body["success"], true);
    assert_eq!(manage.body["promoted"], 0);
}
