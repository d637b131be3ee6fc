//! rastac - raster visualization for STAC catalogs
//!
//! This library translates an abstract, sensor-agnostic visualization
//! intent ("true color", "NDVI", "VV/VH ratio") into concrete tile
//! requests against a STAC item's assets, and manages a bounded set of
//! rendered tile layers on a map collaborator.
//!
//! # High-Level API
//!
//! ```ignore
//! use std::sync::Arc;
//! use rastac::config::EngineConfig;
//! use rastac::http::ReqwestClient;
//! use rastac::layer::{AddLayerOptions, LayerManager};
//! use rastac::map::MemoryMap;
//! use rastac::preset::PresetCatalog;
//!
//! let map = Arc::new(MemoryMap::new());
//! let catalog = Arc::new(PresetCatalog::new());
//! let http = ReqwestClient::new()?;
//! let mut manager = LayerManager::new(map, catalog, http, EngineConfig::default());
//!
//! let layer_id = manager
//!     .add_layer(&item, "true-color", AddLayerOptions::default())
//!     .await?;
//! ```
//!
//! The engine never fetches or decodes pixel data itself; it produces
//! URLs and hands them to the map collaborator.

pub mod config;
pub mod http;
pub mod layer;
pub mod logging;
pub mod map;
pub mod preset;
pub mod resolver;
pub mod signing;
pub mod stac;
pub mod tiles;
pub mod time;

/// Version of the rastac library.
///
/// Synchronized across the workspace; defined in `Cargo.toml` and
/// injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
