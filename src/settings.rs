//! Quality settings resolution
//!
//! Maps a capability [`Tier`] to the concrete rendering profile the local
//! splat renderer is configured with. This is a total lookup over the four
//! tiers; it has no failure modes and no independent lifecycle: settings
//! are always recomputed from the tier, never mutated.

use serde::{Deserialize, Serialize};

use crate::capabilities::Tier;

/// Rendering profile derived from a capability tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualitySettings {
    /// Whether a GPU rendering path may be attempted at all
    ///
    /// `false` only for [`Tier::None`]; the viewer mount interprets it as
    /// "do not construct a local renderer".
    pub attempt_gpu: bool,

    /// Maximum splat count the renderer may draw per frame
    pub point_budget: u32,

    /// Render target scale relative to the display surface
    pub resolution_scale: f32,

    /// Per-splat antialiasing pass
    pub splat_antialiasing: bool,

    /// Depth-of-field and vignette post effects
    pub post_effects: bool,
}

const HIGH: QualitySettings = QualitySettings {
    attempt_gpu: true,
    point_budget: 4_000_000,
    resolution_scale: 1.0,
    splat_antialiasing: true,
    post_effects: true,
};

const MEDIUM: QualitySettings = QualitySettings {
    attempt_gpu: true,
    point_budget: 1_500_000,
    resolution_scale: 0.75,
    splat_antialiasing: true,
    post_effects: false,
};

const LOW: QualitySettings = QualitySettings {
    attempt_gpu: true,
    point_budget: 500_000,
    resolution_scale: 0.5,
    splat_antialiasing: false,
    post_effects: false,
};

const NONE: QualitySettings = QualitySettings {
    attempt_gpu: false,
    point_budget: 0,
    resolution_scale: 0.0,
    splat_antialiasing: false,
    post_effects: false,
};

/// Resolve the settings profile for a tier.
pub fn resolve(tier: Tier) -> QualitySettings {
    match tier {
        Tier::High => HIGH,
        Tier::Medium => MEDIUM,
        Tier::Low => LOW,
        Tier::None => NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_over_all_tiers() {
        for tier in [Tier::High, Tier::Medium, Tier::Low, Tier::None] {
            let settings = resolve(tier);
            assert_eq!(settings.attempt_gpu, tier.is_renderable());
        }
    }

    #[test]
    fn none_disables_gpu_path() {
        let settings = resolve(Tier::None);
        assert!(!settings.attempt_gpu);
        assert_eq!(settings.point_budget, 0);
    }

    #[test]
    fn budgets_grow_with_tier() {
        assert!(resolve(Tier::High).point_budget > resolve(Tier::Medium).point_budget);
        assert!(resolve(Tier::Medium).point_budget > resolve(Tier::Low).point_budget);
        assert!(resolve(Tier::Low).point_budget > resolve(Tier::None).point_budget);
    }
}
