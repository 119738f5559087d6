//! # splatgate
//!
//! Adaptive Gaussian-splat viewer orchestration: decide at mount time which
//! rendering strategy a client and the current load can sustain, and
//! coordinate that decision across concurrently-connected viewers so the
//! shared self-hosted splat renderer is never overloaded.
//!
//! # Architecture
//!
//! ```text
//! splatgate
//!   ├─> Capability Prober (graphics stack → tier, never fails)
//!   ├─> Settings Resolver (tier → quality profile, pure lookup)
//!   ├─> Session Coordinator (active-session store + HTTP surface)
//!   ├─> Strategy Selector (tier × load → strategy, pure)
//!   └─> Viewer Mount (state machine, backends, heartbeat, controls)
//! ```
//!
//! # Pipeline
//!
//! probe → resolve settings → register/read load → select strategy →
//! mount backend → heartbeat while mounted → beacon unregister on unmount.
//!
//! Uncertainty always resolves conservatively: a failed probe is
//! `Tier::None` (static fallback), an unreachable coordinator is unknown
//! load (CDN embed). Nothing in this crate surfaces a failure to the page
//! layer as an unhandled error.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Capability probing and tier classification
pub mod capabilities;

/// Configuration loading and validation
pub mod config;

/// Session coordination: store, HTTP routes, client
pub mod coordinator;

/// Quality settings resolution
pub mod settings;

/// Render strategy selection
pub mod strategy;

/// Logging setup and startup diagnostics
pub mod telemetry;

/// Viewer mount, backends, and control surface
pub mod viewer;

pub use capabilities::{CapabilityInfo, GraphicsProbe, Tier};
pub use coordinator::{AdmissionClient, CoordinatorClient, SessionStore};
pub use settings::{resolve, QualitySettings};
pub use strategy::{select, LoadSignal, RenderStrategy};
pub use viewer::{ModelAssets, MountPhase, ViewerMount, ViewerOptions};
