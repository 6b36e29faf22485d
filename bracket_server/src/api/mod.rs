//! HTTP API for the bracket server.
//!
//! # Modules
//!
//! - [`tournaments`]: Tournament lifecycle and participant registration
//! - [`brackets`]: Bracket generation, match results and repairs
//! - [`errors`]: Error to status code mapping
//! - [`request_id`]: Request correlation, access log and request metrics
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health
//! POST   /api/v1/tournaments
//! GET    /api/v1/tournaments/{id}
//! POST   /api/v1/tournaments/{id}/status
//! POST   /api/v1/tournaments/{id}/participants
//! GET    /api/v1/tournaments/{id}/participants
//! DELETE /api/v1/tournaments/{id}/participants/{participant_id}
//! POST   /api/v1/tournaments/{id}/generate-matches
//! GET    /api/v1/tournaments/{id}/matches
//! POST   /api/v1/tournaments/{id}/cancel
//! POST   /api/v1/tournaments/{id}/rebuild
//! POST   /api/v1/matches/{id}/start
//! PUT    /api/v1/matches/{id}/result
//! ```
//!
//! No route authenticates the caller. Organizer checks belong in front of
//! this service.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use bracket_server::api::{AppState, create_router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_router(AppState::in_memory());
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod brackets;
pub mod errors;
pub mod request_id;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
};
use bracket_engine::{
    BracketEngine, TournamentManager,
    db::{Database, MemoryStore},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Engine and manager share one store. `database` is only set for the
/// PostgreSQL backend and feeds the health check.
#[derive(Clone)]
pub struct AppState {
    pub engine: BracketEngine,
    pub tournaments: TournamentManager,
    pub database: Option<Database>,
}

impl AppState {
    /// State backed by a fresh in-process store
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            engine: BracketEngine::new(store.clone()),
            tournaments: TournamentManager::new(store),
            database: None,
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(database: Database) -> Self {
        let store = Arc::new(database.store());
        Self {
            engine: BracketEngine::new(store.clone()),
            tournaments: TournamentManager::new(store),
            database: Some(database),
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    let tournament_routes = Router::new()
        .route("/tournaments", post(tournaments::create_tournament))
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{tournament_id}/status",
            post(tournaments::set_status),
        )
        .route(
            "/tournaments/{tournament_id}/participants",
            post(tournaments::register_participant).get(tournaments::list_participants),
        )
        .route(
            "/tournaments/{tournament_id}/participants/{participant_id}",
            delete(tournaments::withdraw_participant),
        );

    let bracket_routes = Router::new()
        .route(
            "/tournaments/{tournament_id}/generate-matches",
            post(brackets::generate_matches),
        )
        .route(
            "/tournaments/{tournament_id}/matches",
            get(brackets::list_matches),
        )
        .route(
            "/tournaments/{tournament_id}/cancel",
            post(brackets::cancel_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/rebuild",
            post(brackets::rebuild_advancement),
        )
        .route("/matches/{match_id}/start", post(brackets::start_match))
        .route(
            "/matches/{match_id}/result",
            post(brackets::report_result).put(brackets::report_result),
        );

    Router::new().merge(tournament_routes).merge(bracket_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store is reachable, `503 Service Unavailable`
/// otherwise. The in-memory backend is always healthy.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","store":"postgres","database":true,"timestamp":"2025-11-22T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (store, db_healthy) = match &state.database {
        Some(database) => ("postgres", database.health_check().await.is_ok()),
        None => ("memory", true),
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store,
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
