//! Capability state definitions
//!
//! Data structures describing a client's probed rendering capability.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rendering capability tier
///
/// Ordered classification of what a client's graphics stack can sustain.
/// Higher values indicate better capability. `None` means splat rendering
/// cannot be attempted at all and the static fallback must be used.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Full-quality local splat rendering is sustainable
    High = 3,
    /// Reduced-quality local rendering is sustainable
    Medium = 2,
    /// Only a heavily reduced local render is sustainable
    Low = 1,
    /// No usable graphics context; splat rendering must not be attempted
    #[default]
    None = 0,
}

impl Tier {
    /// Can any splat rendering path be attempted at this tier?
    pub fn is_renderable(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::None => "None",
        }
    }

    /// Clamp this tier to at most `ceiling`.
    ///
    /// Used for signals that can only ever lower a classification (handheld
    /// form factor, low device memory), never raise it.
    pub fn capped_at(self, ceiling: Tier) -> Tier {
        self.min(ceiling)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Probed capability of the local graphics stack
///
/// Created once per process (or per explicit retry) by
/// [`GraphicsProbe::probe`](crate::capabilities::GraphicsProbe::probe) and
/// immutable thereafter. The renderer identity is diagnostic only; every
/// decision downstream keys off `tier` and `is_handheld`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityInfo {
    /// Classified rendering tier
    pub tier: Tier,

    /// Opaque GPU/driver identification string, for diagnostics only
    pub renderer_identity: String,

    /// Battery/thermally constrained form factor
    ///
    /// Handheld devices are capped below [`Tier::High`] regardless of raw
    /// signals: sustained high-tier splat rendering throttles on them.
    pub is_handheld: bool,

    /// When the probe ran
    pub probed_at: DateTime<Utc>,
}

impl CapabilityInfo {
    /// The fail-safe classification: no context, no rendering.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            tier: Tier::None,
            renderer_identity: format!("unavailable: {reason}"),
            is_handheld: false,
            probed_at: Utc::now(),
        }
    }
}
