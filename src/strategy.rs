//! Render strategy selection
//!
//! Combines the client's capability tier with the shared renderer's current
//! load into a strategy decision. Pure and synchronous; retries and
//! timeouts belong to the caller.
//!
//! Rule order encodes the key design decision: shared-resource protection
//! takes priority over individual client capability. A high-end client does
//! not get local rendering when the self-hosted renderer is saturated.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capabilities::Tier;

/// What the viewer mount should instantiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderStrategy {
    /// Local splat renderer at the full quality profile
    LocalFull,
    /// Local splat renderer at a reduced quality profile
    LocalReduced,
    /// CDN-embedded remote renderer; adds no load to the shared backend
    RemoteCdn,
    /// Static poster image with an explanatory note
    StaticFallback,
}

impl RenderStrategy {
    /// Does this strategy consume capacity on the shared self-hosted renderer?
    pub fn uses_shared_renderer(&self) -> bool {
        matches!(self, Self::LocalFull | Self::LocalReduced)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LocalFull => "local-full",
            Self::LocalReduced => "local-reduced",
            Self::RemoteCdn => "remote-cdn",
            Self::StaticFallback => "static-fallback",
        }
    }
}

impl fmt::Display for RenderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Shared-renderer load as observed by a client
///
/// `Unknown` is produced whenever the coordinator is unreachable or times
/// out; it must fail safe toward not adding load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSignal {
    /// Active session count reported by the coordinator (self excluded)
    Known(usize),
    /// Coordinator unreachable or timed out
    Unknown,
}

/// Select the rendering strategy for one mounting viewer.
///
/// Rules, evaluated in order:
/// 1. `Tier::None` → static fallback, unconditionally. No graphics
///    capability exists; load is irrelevant.
/// 2. Load unknown → remote CDN. Fail safe toward not adding load to the
///    self-hosted renderer.
/// 3. Load at or above `threshold` → remote CDN regardless of tier; a
///    capable client still yields to load.
/// 4. Otherwise tier decides: `High` → local full, `Medium`/`Low` → local
///    reduced.
pub fn select(tier: Tier, load: LoadSignal, threshold: usize) -> RenderStrategy {
    let decision = match (tier, load) {
        (Tier::None, _) => RenderStrategy::StaticFallback,
        (_, LoadSignal::Unknown) => RenderStrategy::RemoteCdn,
        (_, LoadSignal::Known(active)) if active >= threshold => RenderStrategy::RemoteCdn,
        (Tier::High, _) => RenderStrategy::LocalFull,
        (Tier::Medium | Tier::Low, _) => RenderStrategy::LocalReduced,
    };

    debug!(%tier, ?load, threshold, %decision, "render strategy selected");
    decision
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: usize = 5;

    #[test]
    fn none_tier_is_unconditionally_static() {
        for load in [
            LoadSignal::Known(0),
            LoadSignal::Known(100),
            LoadSignal::Unknown,
        ] {
            assert_eq!(
                select(Tier::None, load, THRESHOLD),
                RenderStrategy::StaticFallback
            );
        }
    }

    #[test]
    fn unknown_load_fails_safe_to_remote() {
        for tier in [Tier::High, Tier::Medium, Tier::Low] {
            assert_eq!(
                select(tier, LoadSignal::Unknown, THRESHOLD),
                RenderStrategy::RemoteCdn
            );
        }
    }

    #[test]
    fn admission_ordering_at_threshold_boundary() {
        // threshold - 1 admits, threshold redirects, for every renderable tier
        assert_eq!(
            select(Tier::High, LoadSignal::Known(THRESHOLD - 1), THRESHOLD),
            RenderStrategy::LocalFull
        );
        assert_eq!(
            select(Tier::High, LoadSignal::Known(THRESHOLD), THRESHOLD),
            RenderStrategy::RemoteCdn
        );
        assert_eq!(
            select(Tier::Low, LoadSignal::Known(THRESHOLD - 1), THRESHOLD),
            RenderStrategy::LocalReduced
        );
        assert_eq!(
            select(Tier::Low, LoadSignal::Known(THRESHOLD), THRESHOLD),
            RenderStrategy::RemoteCdn
        );
    }

    #[test]
    fn saturation_overrides_capability() {
        assert_eq!(
            select(Tier::High, LoadSignal::Known(THRESHOLD + 10), THRESHOLD),
            RenderStrategy::RemoteCdn
        );
    }

    #[test]
    fn tier_decides_below_threshold() {
        assert_eq!(
            select(Tier::High, LoadSignal::Known(0), THRESHOLD),
            RenderStrategy::LocalFull
        );
        assert_eq!(
            select(Tier::Medium, LoadSignal::Known(0), THRESHOLD),
            RenderStrategy::LocalReduced
        );
        assert_eq!(
            select(Tier::Low, LoadSignal::Known(0), THRESHOLD),
            RenderStrategy::LocalReduced
        );
    }

    #[test]
    fn shared_renderer_usage() {
        assert!(RenderStrategy::LocalFull.uses_shared_renderer());
        assert!(RenderStrategy::LocalReduced.uses_shared_renderer());
        assert!(!RenderStrategy::RemoteCdn.uses_shared_renderer());
        assert!(!RenderStrategy::StaticFallback.uses_shared_renderer());
    }
}
