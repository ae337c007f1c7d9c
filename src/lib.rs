pub mod api;
pub mod cache;
pub mod config;
pub mod drive;
pub mod render;
pub mod resolve;
pub mod validate;

pub use api::{AccessChecker, ApiError, DriveApi, MediaSource};
pub use cache::{SharedCache, TtlCache};
pub use config::{get_config, save_config, Config};
pub use drive::{classify, resolve_candidates, MediaFile, MediaKind, MediaReference, SourceType};
pub use render::{CollectionKind, LoadEvent, LoadState, MediaCollection, MediaView};
pub use resolve::{MediaResolver, ResolveError};
pub use validate::{AccessIssue, AccessibilityResult, DebouncedValidator, ValidationState, Validator};

use api::ResolveResponse;

/// Everything a front end needs to turn pasted links into displayable media.
///
/// Caches are created here, once, and live as long as the pipeline does.
pub struct MediaPipeline {
    config: Config,
    api: DriveApi,
    access_cache: SharedCache<AccessibilityResult>,
    listing_cache: SharedCache<ResolveResponse>,
}

impl MediaPipeline {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let api = DriveApi::new(&config.api)?;
        tracing::debug!(check_url = %api.check_url(), resolve_url = %api.resolve_url(), "Media pipeline ready");
        Ok(Self {
            access_cache: TtlCache::shared(config.cache.clone()),
            listing_cache: TtlCache::shared(config.cache.clone()),
            config,
            api,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ============ CLASSIFY COMMANDS ============

    pub fn classify_url(&self, url: &str) -> MediaReference {
        classify(url)
    }

    pub fn candidate_urls(&self, url: &str, kind: MediaKind) -> Vec<String> {
        let url = url.trim();
        resolve_candidates(&classify(url), url, kind)
    }

    // ============ VALIDATION COMMANDS ============

    pub fn validator(&self) -> Validator<DriveApi> {
        Validator::new(self.api.clone()).with_cache(self.access_cache.clone())
    }

    pub async fn check_access(&self, url: &str) -> AccessibilityResult {
        self.validator().validate(&classify(url)).await
    }

    /// Validator for a text field, debounced by `validation.debounce_ms`.
    pub fn debounced_validator(&self, runtime: tokio::runtime::Handle) -> DebouncedValidator<DriveApi> {
        DebouncedValidator::new(self.validator(), self.config.validation.debounce(), runtime)
    }

    // ============ VIEWER COMMANDS ============

    pub fn resolver(&self) -> MediaResolver<DriveApi> {
        MediaResolver::new(self.api.clone()).with_cache(self.listing_cache.clone())
    }

    pub async fn open_media(&self, url: &str, kind: Option<MediaKind>) -> Result<MediaCollection, ResolveError> {
        self.resolver().open(url, kind).await
    }

    // ============ CACHE COMMANDS ============

    pub fn clear_caches(&self) {
        if let Ok(mut cache) = self.access_cache.lock() {
            cache.clear();
        }
        if let Ok(mut cache) = self.listing_cache.lock() {
            cache.clear();
        }
    }
}
