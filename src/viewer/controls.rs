//! Uniform viewer control surface
//!
//! Whatever backend is active (local renderer, CDN embed, or static
//! poster), the page layer gets the same control surface: a fullscreen
//! toggle, a quality/mode badge, and interaction affordances.

use serde::{Deserialize, Serialize};

use crate::capabilities::Tier;
use crate::strategy::RenderStrategy;

/// Badge describing how the model is currently rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityBadge {
    /// Short user-facing label, e.g. "Full quality"
    pub label: String,
    /// Capability tier behind the decision
    pub tier: Tier,
    /// Active strategy
    pub strategy: RenderStrategy,
}

/// Control surface exposed to the page layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSurface {
    /// Quality/mode badge
    pub badge: QualityBadge,
    /// Orbit/zoom affordances; empty for non-interactive strategies
    pub interaction_hints: Vec<String>,
    /// Explanatory note shown with the static fallback
    pub fallback_note: Option<String>,
    fullscreen: bool,
}

impl ControlSurface {
    pub fn new(strategy: RenderStrategy, tier: Tier) -> Self {
        let label = match strategy {
            RenderStrategy::LocalFull => "Full quality".to_string(),
            RenderStrategy::LocalReduced => "Reduced quality".to_string(),
            RenderStrategy::RemoteCdn => "Streamed".to_string(),
            RenderStrategy::StaticFallback => "Preview image".to_string(),
        };

        let interaction_hints = if strategy == RenderStrategy::StaticFallback {
            Vec::new()
        } else {
            vec![
                "Drag to orbit".to_string(),
                "Scroll to zoom".to_string(),
                "Double-click to reset the view".to_string(),
            ]
        };

        let fallback_note = (strategy == RenderStrategy::StaticFallback).then(|| {
            "This device cannot render the interactive 3D model; showing a preview image instead."
                .to_string()
        });

        Self {
            badge: QualityBadge {
                label,
                tier,
                strategy,
            },
            interaction_hints,
            fallback_note,
            fullscreen: false,
        }
    }

    /// Toggle fullscreen; returns the new state.
    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
}
