use axum::http::StatusCode;
use serde_json::json;

use crate::common::{TestClient, TestStateBuilder, TestUser};

fn client() -> (TestClient, TestUser) {
    let state = TestStateBuilder::new().build_lazy();
    let user = TestUser::new(&state.cookie_key);
    (TestClient::new(state), user)
}

#[tokio::test]
async fn test_health() {
    let (client, _) = client();
    client.get("/health").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (client, _) = client();
    client
        .get("/does/not/exist")
        .await
        .assert_error(StatusCode::NOT_FOUND, "not_found");
}

#[tokio::test]
async fn test_unknown_domain_is_rejected() {
    let (client, user) = client();

    client
        .get_as("/review/grammar/next", &user)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "validation_error");
    client
        .get_as("/review/grammar", &user)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "validation_error");
    client
        .post_json_as(
            "/practice/grammar/attempts",
            &json!({ "itemId": uuid::Uuid::new_v4(), "correct": true }),
            &user,
        )
        .await
        .assert_error(StatusCode::BAD_REQUEST, "validation_error");
}

#[tokio::test]
async fn test_page_limit_bounds() {
    let (client, user) = client();

    for uri in [
        "/review/word?limit=0",
        "/review/word?limit=101",
        "/review/word?limit=abc",
        "/review/word?offset=-1",
    ] {
        client
            .get_as(uri, &user)
            .await
            .assert_error(StatusCode::BAD_REQUEST, "validation_error");
    }
}

#[tokio::test]
async fn test_malformed_exclude_list() {
    let (client, user) = client();
    client
        .get_as("/review/word/next?exclude=not-a-uuid", &user)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "validation_error");
}

#[tokio::test]
async fn test_mastered_requires_uuid_item_id() {
    let (client, user) = client();
    client
        .post_as("/review/word/42/mastered", &user)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "validation_error");
}

#[tokio::test]
async fn test_stats_range_validation() {
    let (client, user) = client();

    for uri in [
        "/stats?range=year",
        "/stats?range=custom&start=2025-03-01T00:00:00Z",
        "/stats?range=custom&start=2025-03-08T00:00:00Z&end=2025-03-01T00:00:00Z",
        "/stats?range=custom&start=yesterday&end=today",
    ] {
        client
            .get_as(uri, &user)
            .await
            .assert_error(StatusCode::BAD_REQUEST, "validation_error");
    }
}

#[tokio::test]
async fn test_history_limit_validation() {
    let (client, user) = client();
    client
        .get_as("/checkin/history?limit=0", &user)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "validation_error");
}

#[tokio::test]
async fn test_attempt_body_validation() {
    let (client, user) = client();

    client
        .post_json_as("/practice/word/attempts", &json!({ "correct": true }), &user)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "validation_error");

    let far_future = chrono::Utc::now() + chrono::TimeDelta::hours(1);
    client
        .post_json_as(
            "/practice/word/attempts",
            &json!({
                "itemId": uuid::Uuid::new_v4(),
                "correct": false,
                "occurredAt": far_future,
            }),
            &user,
        )
        .await
        .assert_error(StatusCode::BAD_REQUEST, "validation_error");
}

#[tokio::test]
async fn test_invalid_set_reference() {
    let (client, _) = client();
    client
        .get("/sets/Not_A_Slug/groups")
        .await
        .assert_error(StatusCode::BAD_REQUEST, "validation_error");
}
