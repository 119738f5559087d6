//! HTTP surface of the session coordinator
//!
//! Three operations, JSON camelCase bodies:
//!
//! - `POST   /api/viewer-session`        register/heartbeat → active count
//! - `DELETE /api/viewer-session`        explicit unregister
//! - `POST   /api/viewer-session/beacon` best-effort unregister (page-hide)
//! - `GET    /api/viewer-session/stats`  diagnostics snapshot
//!
//! The beacon route tolerates malformed bodies and always succeeds: beacon
//! senders cannot retry, and timeout eviction is the correctness backstop.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::debug;

use super::store::{SessionStore, StoreStats};

/// Shared state for all coordinator routes
#[derive(Clone)]
pub struct CoordinatorState {
    pub store: Arc<SessionStore>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBody {
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub active_sessions: usize,
}

pub fn router(state: CoordinatorState) -> Router {
    Router::new()
        .route(
            "/api/viewer-session",
            post(register_session).delete(unregister_session),
        )
        .route("/api/viewer-session/beacon", post(beacon_unregister))
        .route("/api/viewer-session/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn register_session(
    State(state): State<CoordinatorState>,
    Json(body): Json<SessionBody>,
) -> Json<RegisterResponse> {
    let active_sessions = state.store.register(&body.session_id);
    Json(RegisterResponse { active_sessions })
}

async fn unregister_session(
    State(state): State<CoordinatorState>,
    Json(body): Json<SessionBody>,
) -> StatusCode {
    state.store.unregister(&body.session_id);
    StatusCode::NO_CONTENT
}

/// Fire-and-forget unregister.
///
/// Beacon deliveries arrive with arbitrary content types and may be
/// truncated; parse what we can and report success regardless.
async fn beacon_unregister(State(state): State<CoordinatorState>, body: String) -> StatusCode {
    match serde_json::from_str::<SessionBody>(&body) {
        Ok(parsed) => state.store.unregister(&parsed.session_id),
        Err(e) => debug!("unparseable beacon body ignored: {e}"),
    }
    StatusCode::NO_CONTENT
}

async fn stats(State(state): State<CoordinatorState>) -> Json<StoreStats> {
    Json(state.store.stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> CoordinatorState {
        CoordinatorState {
            store: Arc::new(SessionStore::new(Duration::from_secs(60))),
        }
    }

    fn body(id: &str) -> Json<SessionBody> {
        Json(SessionBody {
            session_id: id.to_string(),
        })
    }

    #[tokio::test]
    async fn register_returns_active_count() {
        let state = state();
        let Json(first) = register_session(State(state.clone()), body("a")).await;
        assert_eq!(first.active_sessions, 1);

        let Json(second) = register_session(State(state.clone()), body("b")).await;
        assert_eq!(second.active_sessions, 2);

        // Heartbeat for an existing session does not grow the count
        let Json(refresh) = register_session(State(state), body("a")).await;
        assert_eq!(refresh.active_sessions, 2);
    }

    #[tokio::test]
    async fn unregister_always_succeeds() {
        let state = state();
        register_session(State(state.clone()), body("a")).await;

        let status = unregister_session(State(state.clone()), body("a")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let status = unregister_session(State(state.clone()), body("a")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        assert_eq!(state.store.active_sessions(), 0);
    }

    #[tokio::test]
    async fn beacon_removes_session() {
        let state = state();
        register_session(State(state.clone()), body("a")).await;

        let status = beacon_unregister(
            State(state.clone()),
            r#"{"sessionId":"a"}"#.to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.store.active_sessions(), 0);
    }

    #[tokio::test]
    async fn beacon_tolerates_garbage() {
        let state = state();
        register_session(State(state.clone()), body("a")).await;

        let status = beacon_unregister(State(state.clone()), "not json".to_string()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        // Unparseable beacon leaves the session for timeout eviction
        assert_eq!(state.store.active_sessions(), 1);
    }

    #[tokio::test]
    async fn stats_snapshot() {
        let state = state();
        register_session(State(state.clone()), body("a")).await;

        let Json(stats) = stats(State(state)).await;
        assert_eq!(stats.active_sessions, 1);
        assert_eq!(stats.registered_total, 1);
    }
}
