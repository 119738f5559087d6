//! Viewer backends
//!
//! One backend per render strategy, behind a common trait. The mount
//! instantiates exactly one of these after selection; `load` performs the
//! initial asset preparation that can fail and put the mount into its
//! retryable error state. Rendering itself (draw calls, shaders) lives
//! outside this crate; a backend's job ends at a validated, described
//! render target.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use super::controls::ControlSurface;
use crate::capabilities::Tier;
use crate::settings::QualitySettings;
use crate::strategy::RenderStrategy;

/// Error preparing a backend's asset
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Required asset reference was not provided
    #[error("missing {kind} asset reference")]
    MissingAsset {
        /// Which reference is missing ("splat", "poster")
        kind: &'static str,
    },

    /// Asset reference has an unusable shape
    #[error("unsupported {kind} asset reference: {reference}")]
    UnsupportedAsset {
        kind: &'static str,
        reference: String,
    },
}

/// Model references handed in by the page layer
///
/// Purely data: a full/reduced asset pair for local rendering, a poster for
/// the static fallback, and optional display metadata.
#[derive(Debug, Clone, Default)]
pub struct ModelAssets {
    /// Full-quality splat asset
    pub full: String,
    /// Reduced-quality splat asset
    pub reduced: String,
    /// Static poster image
    pub poster: String,
    /// Display title
    pub title: Option<String>,
    /// Display description
    pub description: Option<String>,
}

const SPLAT_EXTENSIONS: &[&str] = &["splat", "ksplat", "spz", "ply"];
const POSTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "avif"];

fn validate_ref(
    reference: &str,
    kind: &'static str,
    extensions: &[&str],
) -> Result<(), BackendError> {
    if reference.trim().is_empty() {
        return Err(BackendError::MissingAsset { kind });
    }

    let path = reference.split(['?', '#']).next().unwrap_or(reference);
    let ext = path.rsplit('.').next().unwrap_or("").to_lowercase();
    if !extensions.contains(&ext.as_str()) {
        return Err(BackendError::UnsupportedAsset {
            kind,
            reference: reference.to_string(),
        });
    }

    Ok(())
}

/// A concrete renderer behind the uniform control surface
#[async_trait]
pub trait ViewerBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn strategy(&self) -> RenderStrategy;

    /// Prepare the backend's asset. Failures here surface as the mount's
    /// retryable error state.
    async fn load(&mut self) -> Result<(), BackendError>;

    fn control_surface(&self) -> ControlSurface;
}

/// Local splat renderer descriptor (self-hosted, shared resource)
pub struct LocalSplatBackend {
    asset: String,
    settings: QualitySettings,
    tier: Tier,
    strategy: RenderStrategy,
}

impl LocalSplatBackend {
    /// Pick the full or reduced asset per the strategy.
    pub fn new(
        assets: &ModelAssets,
        settings: QualitySettings,
        tier: Tier,
        strategy: RenderStrategy,
    ) -> Self {
        let asset = if strategy == RenderStrategy::LocalFull {
            assets.full.clone()
        } else {
            assets.reduced.clone()
        };
        Self {
            asset,
            settings,
            tier,
            strategy,
        }
    }

    /// Asset the renderer was configured with
    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn settings(&self) -> QualitySettings {
        self.settings
    }
}

#[async_trait]
impl ViewerBackend for LocalSplatBackend {
    fn name(&self) -> &'static str {
        "local-splat"
    }

    fn strategy(&self) -> RenderStrategy {
        self.strategy
    }

    async fn load(&mut self) -> Result<(), BackendError> {
        validate_ref(&self.asset, "splat", SPLAT_EXTENSIONS)?;
        debug!(
            asset = %self.asset,
            point_budget = self.settings.point_budget,
            "local splat backend prepared"
        );
        Ok(())
    }

    fn control_surface(&self) -> ControlSurface {
        ControlSurface::new(self.strategy, self.tier)
    }
}

/// CDN-embedded remote renderer
pub struct RemoteEmbedBackend {
    asset: String,
    embed_base_url: String,
    embed_url: Option<String>,
    tier: Tier,
}

impl RemoteEmbedBackend {
    pub fn new(assets: &ModelAssets, embed_base_url: &str, tier: Tier) -> Self {
        Self {
            asset: assets.full.clone(),
            embed_base_url: embed_base_url.trim_end_matches('/').to_string(),
            embed_url: None,
            tier,
        }
    }

    /// Embed URL, available after a successful `load`
    pub fn embed_url(&self) -> Option<&str> {
        self.embed_url.as_deref()
    }
}

#[async_trait]
impl ViewerBackend for RemoteEmbedBackend {
    fn name(&self) -> &'static str {
        "remote-embed"
    }

    fn strategy(&self) -> RenderStrategy {
        RenderStrategy::RemoteCdn
    }

    async fn load(&mut self) -> Result<(), BackendError> {
        validate_ref(&self.asset, "splat", SPLAT_EXTENSIONS)?;
        if self.embed_base_url.is_empty() {
            return Err(BackendError::MissingAsset { kind: "embed-base" });
        }
        let url = format!("{}?src={}", self.embed_base_url, self.asset);
        debug!(embed_url = %url, "remote embed backend prepared");
        self.embed_url = Some(url);
        Ok(())
    }

    fn control_surface(&self) -> ControlSurface {
        ControlSurface::new(RenderStrategy::RemoteCdn, self.tier)
    }
}

/// Static poster image fallback
///
/// Not an error path: this is the defined terminal strategy for clients
/// that cannot render splats, shown as a normal reduced experience.
pub struct StaticImageBackend {
    poster: String,
    tier: Tier,
}

impl StaticImageBackend {
    pub fn new(assets: &ModelAssets, tier: Tier) -> Self {
        Self {
            poster: assets.poster.clone(),
            tier,
        }
    }

    pub fn poster(&self) -> &str {
        &self.poster
    }
}

#[async_trait]
impl ViewerBackend for StaticImageBackend {
    fn name(&self) -> &'static str {
        "static-image"
    }

    fn strategy(&self) -> RenderStrategy {
        RenderStrategy::StaticFallback
    }

    async fn load(&mut self) -> Result<(), BackendError> {
        validate_ref(&self.poster, "poster", POSTER_EXTENSIONS)
    }

    fn control_surface(&self) -> ControlSurface {
        ControlSurface::new(RenderStrategy::StaticFallback, self.tier)
    }
}

/// Instantiate the backend for a strategy decision.
pub fn backend_for(
    decision: RenderStrategy,
    assets: &ModelAssets,
    settings: QualitySettings,
    tier: Tier,
    embed_base_url: &str,
) -> Box<dyn ViewerBackend> {
    match decision {
        RenderStrategy::LocalFull | RenderStrategy::LocalReduced => {
            Box::new(LocalSplatBackend::new(assets, settings, tier, decision))
        }
        RenderStrategy::RemoteCdn => Box::new(RemoteEmbedBackend::new(assets, embed_base_url, tier)),
        RenderStrategy::StaticFallback => Box::new(StaticImageBackend::new(assets, tier)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::resolve;

    fn assets() -> ModelAssets {
        ModelAssets {
            full: "models/atrium-full.splat".into(),
            reduced: "models/atrium-reduced.splat".into(),
            poster: "models/atrium.webp".into(),
            title: Some("Atrium".into()),
            description: None,
        }
    }

    #[tokio::test]
    async fn local_full_uses_full_asset() {
        let mut backend = LocalSplatBackend::new(
            &assets(),
            resolve(Tier::High),
            Tier::High,
            RenderStrategy::LocalFull,
        );
        backend.load().await.unwrap();
        assert_eq!(backend.asset(), "models/atrium-full.splat");
    }

    #[tokio::test]
    async fn local_reduced_uses_reduced_asset() {
        let mut backend = LocalSplatBackend::new(
            &assets(),
            resolve(Tier::Low),
            Tier::Low,
            RenderStrategy::LocalReduced,
        );
        backend.load().await.unwrap();
        assert_eq!(backend.asset(), "models/atrium-reduced.splat");
    }

    #[tokio::test]
    async fn missing_asset_fails_load() {
        let mut empty = assets();
        empty.full.clear();
        let mut backend = LocalSplatBackend::new(
            &empty,
            resolve(Tier::High),
            Tier::High,
            RenderStrategy::LocalFull,
        );
        assert!(matches!(
            backend.load().await,
            Err(BackendError::MissingAsset { kind: "splat" })
        ));
    }

    #[tokio::test]
    async fn unsupported_extension_fails_load() {
        let mut odd = assets();
        odd.full = "models/atrium.glb".into();
        let mut backend = LocalSplatBackend::new(
            &odd,
            resolve(Tier::High),
            Tier::High,
            RenderStrategy::LocalFull,
        );
        assert!(matches!(
            backend.load().await,
            Err(BackendError::UnsupportedAsset { .. })
        ));
    }

    #[tokio::test]
    async fn remote_embed_builds_url() {
        let mut backend =
            RemoteEmbedBackend::new(&assets(), "https://cdn.example.com/embed/", Tier::Medium);
        backend.load().await.unwrap();
        assert_eq!(
            backend.embed_url(),
            Some("https://cdn.example.com/embed?src=models/atrium-full.splat")
        );
    }

    #[tokio::test]
    async fn static_backend_validates_poster() {
        let mut backend = StaticImageBackend::new(&assets(), Tier::None);
        backend.load().await.unwrap();

        let mut missing = assets();
        missing.poster.clear();
        let mut backend = StaticImageBackend::new(&missing, Tier::None);
        assert!(backend.load().await.is_err());
    }

    #[tokio::test]
    async fn query_strings_do_not_break_extension_checks() {
        let mut with_query = assets();
        with_query.full = "https://host/models/a.splat?v=3".into();
        let mut backend = LocalSplatBackend::new(
            &with_query,
            resolve(Tier::High),
            Tier::High,
            RenderStrategy::LocalFull,
        );
        backend.load().await.unwrap();
    }

    #[test]
    fn backend_for_covers_all_strategies() {
        let assets = assets();
        for (decision, expected) in [
            (RenderStrategy::LocalFull, "local-splat"),
            (RenderStrategy::LocalReduced, "local-splat"),
            (RenderStrategy::RemoteCdn, "remote-embed"),
            (RenderStrategy::StaticFallback, "static-image"),
        ] {
            let backend = backend_for(
                decision,
                &assets,
                resolve(Tier::Medium),
                Tier::Medium,
                "https://cdn.example.com",
            );
            assert_eq!(backend.name(), expected);
        }
    }
}
