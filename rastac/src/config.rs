//! Engine configuration.
//!
//! All endpoints and tuning knobs live here with their defaults as
//! constants, so hosts can construct a config once and hand it to the
//! layer manager.

use std::time::Duration;

/// Default base URL of the local tiler serving the `cog` and `stac`
/// backends.
pub const DEFAULT_TILER_BASE_URL: &str = "http://localhost:8000";

/// Default base URL of the provider's own multi-asset tile API.
pub const DEFAULT_VENDOR_TILE_API: &str = "https://planetarycomputer.microsoft.com/api/data/v1";

/// Default signing endpoint base; the collection class is appended as the
/// final path segment.
pub const DEFAULT_SIGNING_API: &str = "https://planetarycomputer.microsoft.com/api/sas/v1/token";

/// Default cap on concurrently rendered layers.
pub const DEFAULT_MAX_LAYERS: usize = 3;

/// Default fractional padding applied around an item's bounds when
/// fitting the camera.
pub const DEFAULT_FIT_PADDING: f64 = 0.10;

/// Default signing-token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(45 * 60);

/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the tile engine and layer manager.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the tiler serving `cog` and `stac` backends.
    pub tiler_base_url: String,
    /// Base URL of the provider multi-asset tile API.
    pub vendor_tile_api: String,
    /// Base URL of the token signing endpoint.
    pub signing_api: String,
    /// Maximum number of concurrently rendered layers; adding beyond the
    /// cap evicts the oldest layer first. Clamped to at least 1.
    pub max_layers: usize,
    /// Fractional padding around item bounds for fit-to-bounds.
    pub fit_padding: f64,
    /// Signing-token cache lifetime.
    pub token_ttl: Duration,
    /// HTTP request timeout.
    pub http_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tiler_base_url: DEFAULT_TILER_BASE_URL.to_string(),
            vendor_tile_api: DEFAULT_VENDOR_TILE_API.to_string(),
            signing_api: DEFAULT_SIGNING_API.to_string(),
            max_layers: DEFAULT_MAX_LAYERS,
            fit_padding: DEFAULT_FIT_PADDING,
            token_ttl: DEFAULT_TOKEN_TTL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl EngineConfig {
    pub fn with_tiler_base_url(mut self, url: impl Into<String>) -> Self {
        self.tiler_base_url = url.into();
        self
    }

    pub fn with_vendor_tile_api(mut self, url: impl Into<String>) -> Self {
        self.vendor_tile_api = url.into();
        self
    }

    pub fn with_signing_api(mut self, url: impl Into<String>) -> Self {
        self.signing_api = url.into();
        self
    }

    pub fn with_max_layers(mut self, cap: usize) -> Self {
        self.max_layers = cap.max(1);
        self
    }

    pub fn with_fit_padding(mut self, fraction: f64) -> Self {
        self.fit_padding = fraction.max(0.0);
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}
