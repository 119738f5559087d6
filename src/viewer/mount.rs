//! Viewer mount state machine
//!
//! Owns one viewer instance end to end: probe capability, resolve
//! settings, consult the coordinator, select a strategy, instantiate the
//! backend, and run the heartbeat while mounted.
//!
//! Phases: `Detecting → {Ready | Error}`. `Ready` is terminal for the
//! mount's lifetime unless the consumer explicitly triggers `retry`, which
//! re-enters `Detecting` and re-runs the whole pipeline (capability is
//! re-probed, since conditions may have changed). `Error` is reachable only
//! from `Detecting` and also offers `retry`.
//!
//! The coordinator register call doubles as the load read; it is the
//! store's only read operation. The mount registers while detecting,
//! receives the active count, and keeps the registration only when the
//! selected strategy actually consumes the shared renderer; otherwise it
//! unregisters straight away so the count stays honest.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use super::backend::{backend_for, BackendError, ModelAssets, ViewerBackend};
use super::controls::ControlSurface;
use super::heartbeat::{self, HeartbeatHandle};
use crate::capabilities::{CapabilityInfo, GraphicsProbe};
use crate::coordinator::AdmissionClient;
use crate::settings::resolve;
use crate::strategy::{select, LoadSignal, RenderStrategy};

/// Mount lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountPhase {
    /// Pipeline running: probing, consulting the coordinator, loading
    Detecting,
    /// Backend loaded; viewer is live
    Ready,
    /// Initial asset load failed; retryable
    Error,
}

/// Knobs the embedding layer provides
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    /// Heartbeat re-register interval
    pub heartbeat_interval: Duration,
    /// Active-session threshold above which new clients go remote
    pub admission_threshold: usize,
    /// Base URL for the CDN embed backend
    pub embed_base_url: String,
}

type ProbeFn = Box<dyn Fn() -> CapabilityInfo + Send + Sync>;

/// One mounted viewer instance
///
/// Owns exactly one [`CapabilityInfo`], one session id, and one current
/// strategy decision. There is no global registry of viewers; the only
/// shared state in the system is the server-side session store.
pub struct ViewerMount {
    assets: ModelAssets,
    options: ViewerOptions,
    client: Arc<dyn AdmissionClient>,
    probe: ProbeFn,

    session_id: String,
    phase: MountPhase,
    capability: Option<CapabilityInfo>,
    decision: Option<RenderStrategy>,
    backend: Option<Box<dyn ViewerBackend>>,
    controls: Option<ControlSurface>,
    heartbeat: Option<HeartbeatHandle>,
    registered: bool,
    last_error: Option<BackendError>,
}

impl ViewerMount {
    pub fn new(
        assets: ModelAssets,
        options: ViewerOptions,
        client: Arc<dyn AdmissionClient>,
    ) -> Self {
        Self {
            assets,
            options,
            client,
            probe: Box::new(GraphicsProbe::probe),
            session_id: Uuid::new_v4().to_string(),
            phase: MountPhase::Detecting,
            capability: None,
            decision: None,
            backend: None,
            controls: None,
            heartbeat: None,
            registered: false,
            last_error: None,
        }
    }

    /// Replace the capability probe (test seam).
    pub fn with_probe(mut self, probe: impl Fn() -> CapabilityInfo + Send + Sync + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Run the mount pipeline to `Ready` or `Error`.
    pub async fn mount(&mut self) -> MountPhase {
        self.run_pipeline().await;
        self.phase
    }

    /// Explicit user-triggered retry: back to `Detecting`, full pipeline.
    pub async fn retry(&mut self) -> MountPhase {
        info!(session_id = %self.session_id, "viewer retry requested");
        self.run_pipeline().await;
        self.phase
    }

    /// Tear the viewer down. Stops the heartbeat and fires a best-effort
    /// unregister. Safe to call multiple times; never fails.
    pub fn unmount(&mut self) {
        self.heartbeat = None;
        if self.registered {
            self.client.beacon_unregister(&self.session_id);
            self.registered = false;
        }
        self.backend = None;
        self.controls = None;
    }

    pub fn phase(&self) -> MountPhase {
        self.phase
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Capability from the most recent probe
    pub fn capability(&self) -> Option<&CapabilityInfo> {
        self.capability.as_ref()
    }

    /// Strategy behind the current phase
    pub fn strategy(&self) -> Option<RenderStrategy> {
        self.decision
    }

    /// Active backend, available in `Ready`
    pub fn backend(&self) -> Option<&dyn ViewerBackend> {
        self.backend.as_deref()
    }

    /// Control surface, available in `Ready`
    pub fn controls(&self) -> Option<&ControlSurface> {
        self.controls.as_ref()
    }

    pub fn controls_mut(&mut self) -> Option<&mut ControlSurface> {
        self.controls.as_mut()
    }

    /// Error behind the `Error` phase
    pub fn last_error(&self) -> Option<&BackendError> {
        self.last_error.as_ref()
    }

    async fn run_pipeline(&mut self) {
        self.phase = MountPhase::Detecting;
        self.last_error = None;
        self.backend = None;
        self.controls = None;
        self.teardown_session().await;

        let capability = (self.probe)();
        let settings = resolve(capability.tier);

        // The register call is the load read; skip it entirely when no
        // graphics capability exists (load is irrelevant for rule 1)
        let load = if capability.tier.is_renderable() {
            let signal = self.client.register(&self.session_id).await;
            if matches!(signal, LoadSignal::Known(_)) {
                self.registered = true;
            }
            signal
        } else {
            LoadSignal::Unknown
        };

        let decision = select(capability.tier, load, self.options.admission_threshold);

        let mut backend = backend_for(
            decision,
            &self.assets,
            settings,
            capability.tier,
            &self.options.embed_base_url,
        );

        match backend.load().await {
            Ok(()) => {
                if decision.uses_shared_renderer() {
                    self.heartbeat = Some(heartbeat::spawn(
                        self.client.clone(),
                        self.session_id.clone(),
                        self.options.heartbeat_interval,
                    ));
                } else if self.registered {
                    // Registered for the load read but not consuming the
                    // shared renderer: give the slot back immediately
                    self.client.unregister(&self.session_id).await;
                    self.registered = false;
                }

                info!(
                    session_id = %self.session_id,
                    tier = %capability.tier,
                    strategy = %decision,
                    backend = backend.name(),
                    "viewer ready"
                );

                self.controls = Some(backend.control_surface());
                self.capability = Some(capability);
                self.decision = Some(decision);
                self.backend = Some(backend);
                self.phase = MountPhase::Ready;
            }
            Err(e) => {
                warn!(
                    session_id = %self.session_id,
                    strategy = %decision,
                    "viewer asset load failed: {e}"
                );
                self.teardown_session().await;
                self.capability = Some(capability);
                self.decision = Some(decision);
                self.last_error = Some(e);
                self.phase = MountPhase::Error;
            }
        }
    }

    /// Leave any previous session behind: stop the heartbeat, unregister.
    async fn teardown_session(&mut self) {
        self.heartbeat = None;
        if self.registered {
            self.client.unregister(&self.session_id).await;
            self.registered = false;
        }
    }
}

impl Drop for ViewerMount {
    fn drop(&mut self) {
        self.unmount();
    }
}
