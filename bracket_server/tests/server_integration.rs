//! Integration tests for the HTTP API.
//!
//! Every test builds the router over a fresh in-memory store and drives it
//! with `oneshot`, so no database or socket is needed.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bracket_server::api::{AppState, create_router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For `oneshot` method

fn app() -> Router {
    create_router(AppState::in_memory())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Open tournament with `count` registered users, returns (tournament id, participant ids)
async fn open_tournament(app: &Router, capacity: u32, count: usize) -> (String, Vec<String>) {
    let (status, tournament) = send(
        app,
        "POST",
        "/api/v1/tournaments",
        Some(json!({ "name": "Friday Cup", "max_participants": capacity })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tournament["status"], "draft");
    let id = tournament["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        "POST",
        &format!("/api/v1/tournaments/{id}/status"),
        Some(json!({ "status": "registration_open" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut participants = Vec::new();
    for n in 0..count {
        let (status, participant) = send(
            app,
            "POST",
            &format!("/api/v1/tournaments/{id}/participants"),
            Some(json!({ "kind": "user", "id": format!("player-{n}") })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(participant["position"], n as u64 + 1);
        participants.push(participant["id"].as_str().unwrap().to_string());
    }

    (id, participants)
}

async fn matches(app: &Router, tournament_id: &str) -> Vec<Value> {
    let (status, body) = send(
        app,
        "GET",
        &format!("/api/v1/tournaments/{tournament_id}/matches"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().clone()
}

fn find<'a>(matches: &'a [Value], round: u64, number: u64) -> &'a Value {
    matches
        .iter()
        .find(|m| m["round"] == round && m["match_number"] == number)
        .unwrap()
}

async fn report(app: &Router, m: &Value, winner: &Value) -> (StatusCode, Value) {
    send(
        app,
        "PUT",
        &format!("/api/v1/matches/{}/result", m["id"].as_str().unwrap()),
        Some(json!({ "winner_id": winner, "score1": 2, "score2": 1 })),
    )
    .await
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = app();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

// ============================================================================
// Tournament Tests
// ============================================================================

#[tokio::test]
async fn test_create_tournament_validation() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/tournaments",
        Some(json!({ "name": "  ", "max_participants": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("name"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/tournaments",
        Some(json!({ "name": "Cup", "max_participants": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_tournament_is_404() {
    let app = app();
    let missing = uuid::Uuid::new_v4();

    for (method, uri) in [
        ("GET", format!("/api/v1/tournaments/{missing}")),
        ("GET", format!("/api/v1/tournaments/{missing}/participants")),
        ("GET", format!("/api/v1/tournaments/{missing}/matches")),
        ("POST", format!("/api/v1/tournaments/{missing}/generate-matches")),
    ] {
        let (status, body) = send(&app, method, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_registration_rules() {
    let app = app();
    let (id, participants) = open_tournament(&app, 2, 2).await;

    // Full
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/participants"),
        Some(json!({ "kind": "user", "id": "late" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Withdraw frees the seat, but the same entrant can't register twice
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/tournaments/{id}/participants/{}", participants[1]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/participants"),
        Some(json!({ "kind": "user", "id": "player-0" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/tournaments/{id}/participants/{}", participants[1]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, tournament) = send(&app, "GET", &format!("/api/v1/tournaments/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tournament["current_participants"], 1);
}

#[tokio::test]
async fn test_invalid_status_transition() {
    let app = app();
    let (id, _) = open_tournament(&app, 4, 0).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/status"),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// ============================================================================
// Bracket Tests
// ============================================================================

#[tokio::test]
async fn test_five_player_bracket_to_champion() {
    let app = app();
    let (id, participants) = open_tournament(&app, 8, 5).await;

    let (status, summary) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/generate-matches"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(summary["total_rounds"], 3);
    assert_eq!(summary["bye_participant"], participants[4].as_str());

    let all = matches(&app, &id).await;
    assert_eq!(all.iter().filter(|m| m["round"] == 1).count(), 2);

    // The bye participant is already waiting in the final
    let final_match = find(&all, 3, 1);
    assert_eq!(final_match["participant2_id"], participants[4].as_str());

    let r1m1 = find(&all, 1, 1).clone();
    let r1m2 = find(&all, 1, 2).clone();
    let (status, body) = report(&app, &r1m1, &r1m1["participant1_id"]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["match"]["status"], "completed");
    assert!(body["champion_id"].is_null());
    let (status, _) = report(&app, &r1m2, &r1m2["participant2_id"]).await;
    assert_eq!(status, StatusCode::OK);

    let all = matches(&app, &id).await;
    let r2m1 = find(&all, 2, 1).clone();
    assert_eq!(r2m1["participant1_id"], r1m1["participant1_id"]);
    assert_eq!(r2m1["participant2_id"], r1m2["participant2_id"]);

    let (status, _) = report(&app, &r2m1, &r2m1["participant1_id"]).await;
    assert_eq!(status, StatusCode::OK);

    let all = matches(&app, &id).await;
    let final_match = find(&all, 3, 1).clone();
    assert_eq!(final_match["participant1_id"], r1m1["participant1_id"]);

    let (status, body) = report(&app, &final_match, &final_match["participant2_id"]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["champion_id"], participants[4].as_str());

    let (_, tournament) = send(&app, "GET", &format!("/api/v1/tournaments/{id}"), None).await;
    assert_eq!(tournament["status"], "completed");
    assert_eq!(tournament["champion_id"], participants[4].as_str());
}

#[tokio::test]
async fn test_generate_rejections() {
    let app = app();

    let (lonely, _) = open_tournament(&app, 4, 1).await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{lonely}/generate-matches"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Not enough players to generate a bracket");
    assert!(matches(&app, &lonely).await.is_empty());

    let (id, _) = open_tournament(&app, 4, 4).await;
    let uri = format!("/api/v1/tournaments/{id}/generate-matches");
    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(matches(&app, &id).await.len(), 3);
}

#[tokio::test]
async fn test_report_rejections_leave_match_unchanged() {
    let app = app();
    let (id, participants) = open_tournament(&app, 4, 4).await;
    send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/generate-matches"),
        None,
    )
    .await;

    let all = matches(&app, &id).await;
    let r1m1 = find(&all, 1, 1).clone();

    // Participant from the other match
    let (status, _) = report(&app, &r1m1, &json!(participants[2])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Negative score
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/matches/{}/result", r1m1["id"].as_str().unwrap()),
        Some(json!({ "winner_id": r1m1["participant1_id"], "score1": -1, "score2": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Waiting for opponents
    let final_match = find(&all, 2, 1).clone();
    let (status, _) = report(&app, &final_match, &json!(participants[0])).await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(matches(&app, &id).await, all);

    let (status, _) = report(&app, &r1m1, &r1m1["participant1_id"]).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = report(&app, &r1m1, &r1m1["participant2_id"]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already completed"));

    let missing = json!({ "id": uuid::Uuid::new_v4().to_string() });
    let (status, _) = report(&app, &missing, &json!(participants[0])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_start_match() {
    let app = app();
    let (id, _) = open_tournament(&app, 4, 4).await;
    send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/generate-matches"),
        None,
    )
    .await;
    let all = matches(&app, &id).await;

    let r1m1 = find(&all, 1, 1);
    let (status, started) = send(
        &app,
        "POST",
        &format!("/api/v1/matches/{}/start", r1m1["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"], "in_progress");
    assert!(started["started_at"].is_string());

    let final_match = find(&all, 2, 1);
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/matches/{}/start", final_match["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_tournament() {
    let app = app();
    let (id, _) = open_tournament(&app, 4, 4).await;
    send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/generate-matches"),
        None,
    )
    .await;

    let uri = format!("/api/v1/tournaments/{id}/cancel");
    let (status, body) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cancelled_matches"], 3);

    let all = matches(&app, &id).await;
    assert!(all.iter().all(|m| m["status"] == "cancelled"));

    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_status_route_cancel_stops_the_final() {
    let app = app();
    let (id, players) = open_tournament(&app, 2, 2).await;
    send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/generate-matches"),
        None,
    )
    .await;
    let final_match = find(&matches(&app, &id).await, 1, 1).clone();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/status"),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(find(&matches(&app, &id).await, 1, 1)["status"], "cancelled");

    let (status, _) = report(&app, &final_match, &json!(players[0])).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, tournament) = send(&app, "GET", &format!("/api/v1/tournaments/{id}"), None).await;
    assert_eq!(tournament["status"], "cancelled");
    assert_eq!(tournament["champion_id"], Value::Null);
}

#[tokio::test]
async fn test_registration_after_generation_is_conflict() {
    let app = app();
    let (id, _) = open_tournament(&app, 8, 4).await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/generate-matches"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/participants"),
        Some(json!({ "kind": "user", "id": "late-entrant" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Bracket already generated"));

    let (_, tournament) = send(&app, "GET", &format!("/api/v1/tournaments/{id}"), None).await;
    assert_eq!(tournament["current_participants"], 4);
}

#[tokio::test]
async fn test_cancel_before_generation() {
    let app = app();
    let (id, _) = open_tournament(&app, 4, 2).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/cancel"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cancelled_matches"], 0);
}

#[tokio::test]
async fn test_rebuild_on_consistent_bracket_writes_nothing() {
    let app = app();
    let (id, _) = open_tournament(&app, 8, 6).await;
    send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/generate-matches"),
        None,
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/rebuild"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots_written"], 0);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{missing}/rebuild"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
