//! Short-lived access tokens for provider-gated cloud storage.
//!
//! Assets hosted on the provider's blob storage are unauthorized without a
//! signed token in the query string. The signing endpoint is keyed by a
//! *collection class*, not by individual items, so tokens are cached per
//! class with a bounded TTL and refreshed on next use after expiry.
//!
//! Signing is strictly best-effort: any failure (network error, non-2xx,
//! missing token field) logs a warning and yields the original URL
//! unchanged. A signing failure must never fail the overall tile build.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::http::{AsyncHttpClient, HttpError};

/// Host suffixes of storage providers whose assets require a signed token.
const SIGNING_HOST_SUFFIXES: &[&str] = &["blob.core.windows.net"];

/// Fixed storage-container to collection-class table for the signing
/// endpoint. Containers missing here fall back to the storage-account
/// label parsed from the hostname.
const CONTAINER_COLLECTIONS: &[(&str, &str)] = &[
    ("sentinel2-l2", "sentinel-2-l2a"),
    ("sentinel1-grd", "sentinel-1-grd"),
    ("sentinel1-rtc", "sentinel-1-rtc"),
    ("landsat-c2", "landsat-c2-l2"),
    ("naip", "naip"),
    ("modis-061", "modis"),
    ("elevation", "cop-dem-glo-30"),
];

/// True when the URL's host is on a storage domain that requires signing.
pub fn needs_signing(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    SIGNING_HOST_SUFFIXES
        .iter()
        .any(|suffix| host == *suffix || host.ends_with(&format!(".{}", suffix)))
}

/// Collection class the signing endpoint expects for this URL.
///
/// The storage container (first path segment) indexes the fixed table;
/// unknown containers fall back to the storage-account label from the
/// hostname. Returns `None` for URLs that cannot be parsed at all.
pub fn collection_class(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    if let Some(container) = parsed.path_segments().and_then(|mut s| s.next()) {
        if let Some((_, class)) = CONTAINER_COLLECTIONS.iter().find(|(c, _)| *c == container) {
            return Some((*class).to_string());
        }
        if !container.is_empty() {
            return Some(container.to_string());
        }
    }

    // Fall back to the account label, e.g. "sentinel2l2a01" from
    // "sentinel2l2a01.blob.core.windows.net".
    host.split('.').next().map(|label| label.to_string())
}

/// Errors internal to token acquisition. Never escapes [`TokenSigner::sign`].
#[derive(Debug, Error)]
pub enum SigningError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("signing response was not valid JSON: {0}")]
    InvalidJson(String),

    #[error("signing response missing 'token' field")]
    MissingToken,
}

/// A cached token for one collection class.
#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    acquired: Instant,
}

/// Default token lifetime before a refresh is forced.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(45 * 60);

/// Acquires, caches, and attaches signing tokens.
///
/// Tokens are fetched from `{endpoint}/{collection_class}` and the `token`
/// field of the JSON body is appended to asset URLs as a query string.
pub struct TokenSigner<C: AsyncHttpClient> {
    http: C,
    endpoint: String,
    ttl: Duration,
    cache: DashMap<String, CachedToken>,
}

impl<C: AsyncHttpClient> TokenSigner<C> {
    /// Creates a signer against the given signing endpoint base URL.
    pub fn new(http: C, endpoint: impl Into<String>) -> Self {
        Self::with_ttl(http, endpoint, DEFAULT_TOKEN_TTL)
    }

    /// Creates a signer with a custom token TTL.
    pub fn with_ttl(http: C, endpoint: impl Into<String>, ttl: Duration) -> Self {
        Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            ttl,
            cache: DashMap::new(),
        }
    }

    /// Signs a URL if its host requires it, returning it unchanged
    /// otherwise or on any signing failure.
    pub async fn sign(&self, url: &str) -> String {
        if !needs_signing(url) {
            return url.to_string();
        }

        let Some(class) = collection_class(url) else {
            warn!(url = url, "could not derive collection class; leaving URL unsigned");
            return url.to_string();
        };

        match self.token_for(&class).await {
            Ok(token) => append_token(url, &token),
            Err(e) => {
                warn!(
                    url = url,
                    collection_class = class.as_str(),
                    error = %e,
                    "token acquisition failed; leaving URL unsigned"
                );
                url.to_string()
            }
        }
    }

    /// Cached token for a collection class, fetching on miss or expiry.
    async fn token_for(&self, class: &str) -> Result<String, SigningError> {
        if let Some(cached) = self.cache.get(class) {
            if cached.acquired.elapsed() < self.ttl {
                return Ok(cached.token.clone());
            }
        }

        let endpoint = format!("{}/{}", self.endpoint, class);
        let body = self.http.get(&endpoint).await?;
        let json: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| SigningError::InvalidJson(e.to_string()))?;
        let token = json
            .get("token")
            .and_then(|t| t.as_str())
            .ok_or(SigningError::MissingToken)?
            .to_string();

        debug!(collection_class = class, "signing token acquired");
        self.cache.insert(
            class.to_string(),
            CachedToken {
                token: token.clone(),
                acquired: Instant::now(),
            },
        );
        Ok(token)
    }

    /// Drops all cached tokens.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Appends a token (itself a query-string fragment) to a URL.
fn append_token(url: &str, token: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, token)
}
