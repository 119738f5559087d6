//! Viewer mount and control surface
//!
//! Given model asset references, this module runs the full adaptive
//! pipeline (probe, settings, admission, strategy, backend) and hands the
//! page layer a mounted viewer with a uniform control surface, whatever
//! concrete renderer ended up behind it.

mod backend;
mod controls;
mod heartbeat;
mod mount;

pub use backend::{
    backend_for, BackendError, LocalSplatBackend, ModelAssets, RemoteEmbedBackend,
    StaticImageBackend, ViewerBackend,
};
pub use controls::{ControlSurface, QualityBadge};
pub use heartbeat::HeartbeatHandle;
pub use mount::{MountPhase, ViewerMount, ViewerOptions};
