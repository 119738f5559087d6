//! Graphics capability probe
//!
//! Inspects the local graphics stack once and classifies it into a [`Tier`].
//! The probe is synchronous, runs at viewer mount time, and must never
//! panic or block beyond context acquisition: every internal failure
//! degrades to [`Tier::None`] so the caller can always proceed to a
//! fallback.
//!
//! Classification bias: an unrecognized renderer string is treated as
//! `Medium` at best, never `High`. Over-promising capability causes visible
//! stutter, which is worse than under-promising.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::process::Command;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use super::state::{CapabilityInfo, Tier};

/// Error during graphics introspection
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No graphics context can be obtained at all
    #[error("no graphics context obtainable: {0}")]
    ContextUnavailable(String),

    /// Context exists but introspection failed
    #[error("introspection failed: {0}")]
    Introspection(String),

    /// IO error while reading system state
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw facts read from a short-lived graphics context
#[derive(Debug, Clone)]
pub struct ContextInfo {
    /// Renderer string as reported by the driver
    pub renderer: String,
    /// Vendor string as reported by the driver
    pub vendor: String,
}

/// Source of raw capability signals
///
/// Seam between classification (pure, tested exhaustively) and the
/// environment (commands, sysfs, env vars). Production code uses
/// [`SystemInspector`]; tests substitute mocks.
pub trait GraphicsInspector {
    /// Obtain a short-lived graphics context and read its identity.
    ///
    /// The context must be released before returning; it is only used for
    /// inspection, never for rendering.
    fn acquire_context(&self) -> Result<ContextInfo, ProbeError>;

    /// Total device memory in whole gigabytes, if known.
    fn device_memory_gb(&self) -> Option<u64>;

    /// Logical CPU core count, if known.
    fn logical_cores(&self) -> Option<usize>;

    /// Battery/thermally constrained form factor.
    fn is_handheld(&self) -> bool;
}

/// Inspector backed by the real system
///
/// Context identity comes from `glxinfo`, falling back to `lspci` when the
/// DRI device node exists but `glxinfo` is unavailable. Memory comes from
/// `/proc/meminfo`, form factor from the DMI chassis type.
pub struct SystemInspector;

impl GraphicsInspector for SystemInspector {
    fn acquire_context(&self) -> Result<ContextInfo, ProbeError> {
        if std::env::var("WAYLAND_DISPLAY").is_err() && std::env::var("DISPLAY").is_err() {
            return Err(ProbeError::ContextUnavailable(
                "no display server (DISPLAY/WAYLAND_DISPLAY unset)".into(),
            ));
        }

        if let Ok(output) = run_command("glxinfo", &["-B"]) {
            if let Some(info) = parse_glxinfo(&output) {
                return Ok(info);
            }
        }

        if !Path::new("/dev/dri").exists() {
            return Err(ProbeError::ContextUnavailable("no /dev/dri".into()));
        }

        // DRI node exists but glxinfo gave nothing usable; identify via lspci
        if let Ok(output) = run_command("lspci", &[]) {
            for line in output.lines() {
                if line.contains("VGA") || line.contains("3D") || line.contains("Display") {
                    return Ok(ContextInfo {
                        renderer: line.trim().to_string(),
                        vendor: String::new(),
                    });
                }
            }
        }

        Err(ProbeError::Introspection(
            "context available but renderer identity unreadable".into(),
        ))
    }

    fn device_memory_gb(&self) -> Option<u64> {
        let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
        for line in meminfo.lines() {
            if let Some(rest) = line.strip_prefix("MemTotal:") {
                let kb: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
                return Some(kb / (1024 * 1024));
            }
        }
        None
    }

    fn logical_cores(&self) -> Option<usize> {
        std::thread::available_parallelism().ok().map(|n| n.get())
    }

    fn is_handheld(&self) -> bool {
        // DMI chassis types: 8 portable, 9 laptop, 10 notebook, 11 handheld,
        // 30 tablet, 31 convertible, 32 detachable
        if let Ok(chassis) = std::fs::read_to_string("/sys/class/dmi/id/chassis_type") {
            if let Ok(code) = chassis.trim().parse::<u32>() {
                return matches!(code, 8 | 9 | 10 | 11 | 30 | 31 | 32);
            }
        }
        false
    }
}

fn run_command(cmd: &str, args: &[&str]) -> Result<String, std::io::Error> {
    let output = Command::new(cmd).args(args).output()?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(std::io::Error::other(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ))
    }
}

fn parse_glxinfo(output: &str) -> Option<ContextInfo> {
    let mut renderer = None;
    let mut vendor = String::new();

    for line in output.lines() {
        if line.contains("OpenGL renderer string:") {
            renderer = line.split(':').nth(1).map(|s| s.trim().to_string());
        }
        if line.contains("OpenGL vendor string:") {
            if let Some(v) = line.split(':').nth(1) {
                vendor = v.trim().to_string();
            }
        }
    }

    renderer.map(|renderer| ContextInfo { renderer, vendor })
}

/// Renderer signature classes, from the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RendererClass {
    /// Software rasterizer or virtual GPU; context works but is CPU-bound
    SoftwareOrVirtual,
    /// Known low-end mobile/integrated signature
    KnownLowEnd,
    /// Known desktop-class signature
    KnownHighEnd,
    /// Anything else; biased down, never trusted as high-end
    Unknown,
}

const SOFTWARE_OR_VIRTUAL: &[&str] = &[
    "llvmpipe", "softpipe", "swrast", "virtio", "qxl", "cirrus", "bochs",
];

const KNOWN_LOW_END: &[&str] = &["mali", "adreno", "videocore", "powervr", "gma"];

const KNOWN_HIGH_END: &[&str] = &[
    "geforce rtx",
    "geforce gtx",
    "radeon rx",
    "radeon pro",
    "apple m",
    "arc a",
];

fn classify_renderer(renderer: &str) -> RendererClass {
    let lower = renderer.to_lowercase();
    if SOFTWARE_OR_VIRTUAL.iter().any(|sig| lower.contains(sig)) {
        return RendererClass::SoftwareOrVirtual;
    }
    if KNOWN_LOW_END.iter().any(|sig| lower.contains(sig)) {
        return RendererClass::KnownLowEnd;
    }
    if KNOWN_HIGH_END.iter().any(|sig| lower.contains(sig)) {
        return RendererClass::KnownHighEnd;
    }
    RendererClass::Unknown
}

/// Classify a context into a tier.
///
/// Monotone in every signal: improving a signal (better renderer class, more
/// memory, more cores, non-handheld) never lowers the result. Each weak
/// signal contributes a ceiling; the final tier is the base class capped by
/// all ceilings.
fn classify(
    ctx: &ContextInfo,
    memory_gb: Option<u64>,
    cores: Option<usize>,
    handheld: bool,
) -> Tier {
    let base = match classify_renderer(&ctx.renderer) {
        RendererClass::SoftwareOrVirtual | RendererClass::KnownLowEnd => Tier::Low,
        RendererClass::KnownHighEnd => Tier::High,
        RendererClass::Unknown => Tier::Medium,
    };

    let mut tier = base;

    match memory_gb {
        Some(gb) if gb < 4 => tier = tier.capped_at(Tier::Low),
        Some(gb) if gb < 8 => tier = tier.capped_at(Tier::Medium),
        _ => {}
    }

    if let Some(n) = cores {
        if n < 4 {
            tier = tier.capped_at(Tier::Medium);
        }
    }

    if handheld {
        tier = tier.capped_at(Tier::Medium);
    }

    tier
}

/// The capability prober
///
/// `probe()` is the single public entry point; it is total and infallible.
pub struct GraphicsProbe;

impl GraphicsProbe {
    /// Probe the local graphics stack.
    ///
    /// Never panics. Any internal failure, including a panic inside the
    /// inspector, resolves to [`Tier::None`].
    pub fn probe() -> CapabilityInfo {
        Self::probe_with(&SystemInspector)
    }

    /// Probe through an explicit inspector (test seam).
    pub fn probe_with(inspector: &dyn GraphicsInspector) -> CapabilityInfo {
        match catch_unwind(AssertUnwindSafe(|| Self::probe_inner(inspector))) {
            Ok(info) => info,
            Err(_) => {
                warn!("capability probe panicked, degrading to tier None");
                CapabilityInfo::unavailable("probe panicked")
            }
        }
    }

    fn probe_inner(inspector: &dyn GraphicsInspector) -> CapabilityInfo {
        let ctx = match inspector.acquire_context() {
            Ok(ctx) => ctx,
            Err(e) => {
                debug!("graphics context unavailable: {e}");
                return CapabilityInfo::unavailable(&e.to_string());
            }
        };

        let memory_gb = inspector.device_memory_gb();
        let cores = inspector.logical_cores();
        let handheld = inspector.is_handheld();

        let tier = classify(&ctx, memory_gb, cores, handheld);

        debug!(
            renderer = %ctx.renderer,
            ?memory_gb,
            ?cores,
            handheld,
            %tier,
            "capability probe complete"
        );

        let renderer_identity = if ctx.vendor.is_empty() {
            ctx.renderer
        } else {
            format!("{} / {}", ctx.vendor, ctx.renderer)
        };

        CapabilityInfo {
            tier,
            renderer_identity,
            is_handheld: handheld,
            probed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockInspector {
        renderer: Option<&'static str>,
        memory_gb: Option<u64>,
        cores: Option<usize>,
        handheld: bool,
    }

    impl MockInspector {
        fn with_renderer(renderer: &'static str) -> Self {
            Self {
                renderer: Some(renderer),
                memory_gb: Some(16),
                cores: Some(8),
                handheld: false,
            }
        }
    }

    impl GraphicsInspector for MockInspector {
        fn acquire_context(&self) -> Result<ContextInfo, ProbeError> {
            match self.renderer {
                Some(r) => Ok(ContextInfo {
                    renderer: r.to_string(),
                    vendor: "Mock".to_string(),
                }),
                None => Err(ProbeError::ContextUnavailable("mock: no context".into())),
            }
        }

        fn device_memory_gb(&self) -> Option<u64> {
            self.memory_gb
        }

        fn logical_cores(&self) -> Option<usize> {
            self.cores
        }

        fn is_handheld(&self) -> bool {
            self.handheld
        }
    }

    struct PanickingInspector;

    impl GraphicsInspector for PanickingInspector {
        fn acquire_context(&self) -> Result<ContextInfo, ProbeError> {
            panic!("introspection API blew up");
        }

        fn device_memory_gb(&self) -> Option<u64> {
            None
        }

        fn logical_cores(&self) -> Option<usize> {
            None
        }

        fn is_handheld(&self) -> bool {
            false
        }
    }

    #[test]
    fn no_context_resolves_to_none() {
        let inspector = MockInspector {
            renderer: None,
            memory_gb: Some(32),
            cores: Some(16),
            handheld: false,
        };
        let info = GraphicsProbe::probe_with(&inspector);
        assert_eq!(info.tier, Tier::None);
    }

    #[test]
    fn internal_panic_resolves_to_none() {
        // The fail-safe contract: no panic escapes probe_with
        let info = GraphicsProbe::probe_with(&PanickingInspector);
        assert_eq!(info.tier, Tier::None);
        assert!(!info.is_handheld);
    }

    #[test]
    fn known_high_end_is_high() {
        let info = GraphicsProbe::probe_with(&MockInspector::with_renderer(
            "NVIDIA GeForce RTX 4070/PCIe/SSE2",
        ));
        assert_eq!(info.tier, Tier::High);
    }

    #[test]
    fn unknown_renderer_is_at_most_medium() {
        let info = GraphicsProbe::probe_with(&MockInspector::with_renderer(
            "Frobnicator 9000 Ultra Graphics",
        ));
        assert_eq!(info.tier, Tier::Medium);
    }

    #[test]
    fn software_rasterizer_is_low() {
        let info =
            GraphicsProbe::probe_with(&MockInspector::with_renderer("llvmpipe (LLVM 17.0.6)"));
        assert_eq!(info.tier, Tier::Low);
    }

    #[test]
    fn handheld_caps_below_high() {
        let mut inspector = MockInspector::with_renderer("NVIDIA GeForce RTX 4090 Laptop GPU");
        inspector.handheld = true;
        let info = GraphicsProbe::probe_with(&inspector);
        assert_eq!(info.tier, Tier::Medium);
        assert!(info.is_handheld);
    }

    #[test]
    fn low_memory_caps_tier() {
        let mut inspector = MockInspector::with_renderer("AMD Radeon RX 7800 XT");
        inspector.memory_gb = Some(2);
        let info = GraphicsProbe::probe_with(&inspector);
        assert_eq!(info.tier, Tier::Low);
    }

    #[test]
    fn monotonic_in_memory() {
        // More device memory must never resolve to a lower tier
        let renderers = [
            "NVIDIA GeForce RTX 4070",
            "Frobnicator 9000",
            "Mali-G78",
            "llvmpipe",
        ];
        for renderer in renderers {
            let mut weaker = MockInspector::with_renderer(renderer);
            weaker.memory_gb = Some(2);
            let mut stronger = MockInspector::with_renderer(renderer);
            stronger.memory_gb = Some(32);

            let weak_tier = GraphicsProbe::probe_with(&weaker).tier;
            let strong_tier = GraphicsProbe::probe_with(&stronger).tier;
            assert!(
                strong_tier >= weak_tier,
                "{renderer}: {strong_tier} < {weak_tier}"
            );
        }
    }

    #[test]
    fn monotonic_in_renderer_class() {
        // A known high-end string must classify >= an unknown string,
        // all other signals held equal
        let known = GraphicsProbe::probe_with(&MockInspector::with_renderer("GeForce GTX 1080"));
        let unknown = GraphicsProbe::probe_with(&MockInspector::with_renderer("Mystery GPU"));
        assert!(known.tier >= unknown.tier);
    }

    #[test]
    fn identity_carries_vendor_and_renderer() {
        let info = GraphicsProbe::probe_with(&MockInspector::with_renderer("GeForce GTX 1080"));
        assert!(info.renderer_identity.contains("Mock"));
        assert!(info.renderer_identity.contains("GeForce"));
    }
}
