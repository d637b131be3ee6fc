//! Error types for tile-URL synthesis.

use thiserror::Error;

/// Errors that can occur while synthesizing a tile URL.
///
/// All of these are fatal to the build that raised them; no layer state is
/// created when synthesis fails. Signing failures are not represented here
/// because they degrade to unsigned URLs inside the credential resolver.
#[derive(Debug, Error)]
pub enum TileUrlError {
    /// A resolved asset key is absent from the item.
    #[error(
        "asset for band '{band}' not found on item '{item}' \
         (resolved to '{resolved}'; available assets: {available:?})"
    )]
    AssetNotFound {
        /// Generic band name that was requested.
        band: String,
        /// Asset key the resolver produced.
        resolved: String,
        /// Item the lookup ran against.
        item: String,
        /// Full asset inventory of the item.
        available: Vec<String>,
    },

    /// The requested preset key is not in the sensor family's catalog.
    #[error("preset '{key}' is not available for sensor family '{family}'")]
    PresetUnavailable { key: String, family: String },

    /// The generic backend needs the item's own URL but none is present.
    #[error("item '{item}' has no self link; the generic tile backend requires one")]
    MissingSelfLink { item: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_not_found_reports_inventory() {
        let err = TileUrlError::AssetNotFound {
            band: "red".to_string(),
            resolved: "B04".to_string(),
            item: "S2A_TEST".to_string(),
            available: vec!["B02".to_string(), "B03".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("red"));
        assert!(msg.contains("B04"));
        assert!(msg.contains("S2A_TEST"));
        assert!(msg.contains("B02"));
        assert!(msg.contains("B03"));
    }

    #[test]
    fn preset_unavailable_display() {
        let err = TileUrlError::PresetUnavailable {
            key: "true-color".to_string(),
            family: "sar".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "preset 'true-color' is not available for sensor family 'sar'"
        );
    }

    #[test]
    fn missing_self_link_display() {
        let err = TileUrlError::MissingSelfLink {
            item: "S2A_TEST".to_string(),
        };
        assert!(err.to_string().contains("no self link"));
    }
}
