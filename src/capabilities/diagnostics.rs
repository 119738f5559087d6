//! Diagnostic reporting for capability detection
//!
//! Renders the local probe result plus the settings it resolves to, for the
//! `--show-capabilities` and `--diagnose` maintenance modes.

use serde::{Deserialize, Serialize};

use crate::capabilities::{CapabilityInfo, Tier};
use crate::settings::{resolve, QualitySettings};

/// Report over the local graphics stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityReport {
    /// Probe result
    pub capability: CapabilityInfo,
    /// Settings the probed tier resolves to
    pub settings: QualitySettings,
    /// Human-readable observations
    pub notes: Vec<String>,
}

pub fn run_diagnostics(capability: CapabilityInfo) -> CapabilityReport {
    let settings = resolve(capability.tier);
    let mut notes = Vec::new();

    match capability.tier {
        Tier::None => notes.push(
            "No usable graphics context: viewers on this client always take the static fallback"
                .into(),
        ),
        Tier::Low => notes.push("Low tier: local rendering runs at a reduced point budget".into()),
        Tier::Medium => {
            notes.push("Medium tier: local rendering runs at a reduced point budget".into())
        }
        Tier::High => notes.push("High tier: full-quality local rendering is sustainable".into()),
    }

    if capability.is_handheld {
        notes.push("Handheld form factor detected: tier is capped below High".into());
    }

    CapabilityReport {
        capability,
        settings,
        notes,
    }
}

impl CapabilityReport {
    pub fn format_text(&self) -> String {
        let mut out = String::new();

        out.push_str("=== Capability Report ===\n\n");
        out.push_str(&format!("  Tier:       {}\n", self.capability.tier));
        out.push_str(&format!(
            "  Renderer:   {}\n",
            self.capability.renderer_identity
        ));
        out.push_str(&format!("  Handheld:   {}\n", self.capability.is_handheld));
        out.push_str(&format!("  Probed at:  {}\n\n", self.capability.probed_at));

        out.push_str("  Resolved settings:\n");
        out.push_str(&format!(
            "    attempt gpu:      {}\n",
            self.settings.attempt_gpu
        ));
        out.push_str(&format!(
            "    point budget:     {}\n",
            self.settings.point_budget
        ));
        out.push_str(&format!(
            "    resolution scale: {:.2}\n",
            self.settings.resolution_scale
        ));
        out.push_str(&format!(
            "    antialiasing:     {}\n\n",
            self.settings.splat_antialiasing
        ));

        for note in &self.notes {
            out.push_str(&format!("  * {note}\n"));
        }

        out
    }
}
