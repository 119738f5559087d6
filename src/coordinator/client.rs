//! Client side of the session coordinator protocol
//!
//! Wraps the HTTP calls a mounted viewer makes: register/heartbeat,
//! explicit unregister, and the fire-and-forget beacon used on unmount.
//! Availability of the coordinator is never assumed: every failure path
//! collapses into [`LoadSignal::Unknown`] or is silently dropped, so a dead
//! coordinator can only ever make clients more conservative.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::strategy::LoadSignal;

/// Admission signalling as seen by one viewer
///
/// Trait seam so the viewer mount can be exercised against a mock
/// coordinator in tests.
#[async_trait]
pub trait AdmissionClient: Send + Sync {
    /// Register (or heartbeat) this session and observe current load.
    ///
    /// The returned count excludes the caller's own session. Any transport
    /// failure or timeout yields [`LoadSignal::Unknown`]; this call never
    /// errors.
    async fn register(&self, session_id: &str) -> LoadSignal;

    /// Explicitly remove this session. Best-effort; never errors.
    async fn unregister(&self, session_id: &str);

    /// Fire-and-forget unregister for unmount/page-hide paths.
    ///
    /// Returns immediately; delivery is not awaited and not retried. The
    /// coordinator's timeout eviction is the backstop when this is lost.
    fn beacon_unregister(&self, session_id: &str);
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    active_sessions: usize,
}

/// HTTP client for a remote coordinator endpoint
pub struct CoordinatorClient {
    http: reqwest::Client,
    session_url: String,
    beacon_url: String,
}

impl CoordinatorClient {
    /// Build a client against `base_url` (no trailing slash) with a bounded
    /// per-request timeout. The timeout is what guarantees the mount
    /// sequence never waits indefinitely on the coordinator.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            session_url: format!("{base_url}/api/viewer-session"),
            beacon_url: format!("{base_url}/api/viewer-session/beacon"),
        })
    }
}

#[async_trait]
impl AdmissionClient for CoordinatorClient {
    async fn register(&self, session_id: &str) -> LoadSignal {
        let result = self
            .http
            .post(&self.session_url)
            .json(&json!({ "sessionId": session_id }))
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("coordinator unreachable, treating load as unknown: {e}");
                return LoadSignal::Unknown;
            }
        };

        match response.json::<RegisterResponse>().await {
            // The response count includes this session; the selector wants
            // the load the rest of the world puts on the renderer
            Ok(body) => LoadSignal::Known(body.active_sessions.saturating_sub(1)),
            Err(e) => {
                warn!("coordinator response unreadable, treating load as unknown: {e}");
                LoadSignal::Unknown
            }
        }
    }

    async fn unregister(&self, session_id: &str) {
        let result = self
            .http
            .delete(&self.session_url)
            .json(&json!({ "sessionId": session_id }))
            .send()
            .await;

        if let Err(e) = result {
            debug!("unregister delivery failed (eviction will reclaim): {e}");
        }
    }

    fn beacon_unregister(&self, session_id: &str) {
        let http = self.http.clone();
        let url = self.beacon_url.clone();
        let body = json!({ "sessionId": session_id }).to_string();

        // Unmount paths may run during teardown with no runtime left;
        // losing the beacon is fine, eviction is the backstop
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("no runtime for beacon delivery (eviction will reclaim)");
            return;
        };

        handle.spawn(async move {
            if let Err(e) = http.post(&url).body(body).send().await {
                debug!("beacon delivery failed (eviction will reclaim): {e}");
            }
        });
    }
}
