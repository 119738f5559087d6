//! Capability detection for the splat viewer
//!
//! Probes the local graphics stack once per mount, classifies it into an
//! ordered [`Tier`], and reports the result for diagnostics.
//!
//! The probe is the first stage of the viewer pipeline and has one hard
//! contract: it never fails. Missing context, unreadable driver strings, or
//! a panicking introspection path all resolve to [`Tier::None`], which the
//! strategy selector maps to the static fallback.

mod diagnostics;
mod probe;
mod state;

pub use diagnostics::{run_diagnostics, CapabilityReport};
pub use probe::{ContextInfo, GraphicsInspector, GraphicsProbe, ProbeError, SystemInspector};
pub use state::{CapabilityInfo, Tier};
