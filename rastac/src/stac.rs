//! Read-only model of STAC catalog items.
//!
//! A [`Item`] is the engine's view of one satellite/aerial scene: named
//! assets with spectral metadata, a bounding box, and the link list that
//! carries the item's own URL. The engine never mutates an item; everything
//! here is plain data decoded with serde, with unknown fields ignored.
//!
//! Assets are kept in a `BTreeMap` so iteration order (and therefore
//! spectral-scan results and error-message inventories) is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One STAC item (scene) from a catalog search result.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Item {
    /// Item identifier, unique within its collection.
    pub id: String,

    /// Identifier of the collection this item belongs to.
    #[serde(default)]
    pub collection: Option<String>,

    /// Geographic bounding box as `[west, south, east, north]`.
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,

    /// Item properties (acquisition time, cloud cover, ...).
    #[serde(default)]
    pub properties: ItemProperties,

    /// Named assets, keyed by asset key.
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,

    /// Link list; `rel="self"` carries the item's own URL.
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Item {
    /// Returns the href of the item's `self` link, if present.
    pub fn self_href(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel == "self")
            .map(|l| l.href.as_str())
    }

    /// Returns the asset stored under `key`, if present.
    pub fn asset(&self, key: &str) -> Option<&Asset> {
        self.assets.get(key)
    }

    /// Returns the bounding box as a fixed-size array, if it has at least
    /// four finite entries.
    pub fn bbox4(&self) -> Option<[f64; 4]> {
        let b = self.bbox.as_ref()?;
        if b.len() < 4 || b[..4].iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some([b[0], b[1], b[2], b[3]])
    }

    /// All asset keys in deterministic (sorted) order.
    pub fn asset_keys(&self) -> Vec<String> {
        self.assets.keys().cloned().collect()
    }
}

/// Common item properties the engine cares about.
///
/// Everything else stays in `extra` untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ItemProperties {
    /// Acquisition timestamp (RFC 3339).
    #[serde(default)]
    pub datetime: Option<String>,

    /// Cloud cover percentage from the EO extension.
    #[serde(default, rename = "eo:cloud_cover")]
    pub cloud_cover: Option<f64>,

    /// Unmodeled properties, preserved as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One addressable file belonging to an item.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Asset {
    /// Reference URL for the asset data.
    pub href: String,

    /// Human-readable title.
    #[serde(default)]
    pub title: Option<String>,

    /// Media type of the asset.
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,

    /// Asset roles (`data`, `thumbnail`, ...).
    #[serde(default)]
    pub roles: Vec<String>,

    /// Spectral band metadata from the EO extension.
    #[serde(default, rename = "eo:bands")]
    pub bands: Vec<SpectralBand>,

    /// Per-band scale/offset metadata from the raster extension.
    #[serde(default, rename = "raster:bands")]
    pub raster_bands: Vec<RasterBand>,
}

impl Asset {
    /// Minimal asset with only an href, used by tests and the CLI.
    pub fn from_href(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: None,
            media_type: None,
            roles: Vec::new(),
            bands: Vec::new(),
            raster_bands: Vec::new(),
        }
    }
}

/// Spectral metadata for one band of an asset.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SpectralBand {
    /// Band name as published by the provider (e.g. `B04`).
    #[serde(default)]
    pub name: Option<String>,

    /// Standardized common name (e.g. `red`).
    #[serde(default)]
    pub common_name: Option<String>,

    /// Center wavelength. The EO extension publishes micrometers; some
    /// catalogs use nanometers. Resolution normalizes before comparing.
    #[serde(default)]
    pub center_wavelength: Option<f64>,
}

/// Scale/offset metadata for one band of an asset.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct RasterBand {
    #[serde(default)]
    pub scale: Option<f64>,

    #[serde(default)]
    pub offset: Option<f64>,

    #[serde(default)]
    pub nodata: Option<f64>,
}

/// One entry of an item's link list.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Link {
    /// Link relation (`self`, `parent`, `collection`, ...).
    pub rel: String,

    /// Link target.
    pub href: String,

    /// Media type of the target.
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "type": "Feature",
            "stac_version": "1.0.0",
            "id": "S2B_MSIL2A_20240612T102559",
            "collection": "sentinel-2-l2a",
            "bbox": [10.31, 45.02, 11.55, 46.05],
            "properties": {
                "datetime": "2024-06-12T10:25:59Z",
                "eo:cloud_cover": 3.7,
                "platform": "sentinel-2b"
            },
            "assets": {
                "B04": {
                    "href": "https://sentinel2l2a01.blob.core.windows.net/sentinel2-l2/B04.tif",
                    "type": "image/tiff; application=geotiff",
                    "eo:bands": [
                        {"name": "B04", "common_name": "red", "center_wavelength": 0.665}
                    ],
                    "raster:bands": [{"scale": 0.0001, "offset": -0.1}]
                },
                "visual": {
                    "href": "https://sentinel2l2a01.blob.core.windows.net/sentinel2-l2/TCI.tif",
                    "roles": ["visual"]
                }
            },
            "links": [
                {"rel": "self", "href": "https://stac.example.com/items/S2B_MSIL2A_20240612T102559"},
                {"rel": "collection", "href": "https://stac.example.com/collections/sentinel-2-l2a"}
            ]
        }"#
    }

    #[test]
    fn decodes_item_with_unknown_fields() {
        let item: Item = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(item.id, "S2B_MSIL2A_20240612T102559");
        assert_eq!(item.collection.as_deref(), Some("sentinel-2-l2a"));
        assert_eq!(item.properties.cloud_cover, Some(3.7));
        assert_eq!(item.assets.len(), 2);
    }

    #[test]
    fn decodes_spectral_metadata() {
        let item: Item = serde_json::from_str(sample_json()).unwrap();
        let b04 = item.asset("B04").unwrap();
        assert_eq!(b04.bands.len(), 1);
        assert_eq!(b04.bands[0].common_name.as_deref(), Some("red"));
        assert_eq!(b04.bands[0].center_wavelength, Some(0.665));
        assert_eq!(b04.raster_bands[0].scale, Some(0.0001));
    }

    #[test]
    fn self_href_picks_self_link() {
        let item: Item = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(
            item.self_href(),
            Some("https://stac.example.com/items/S2B_MSIL2A_20240612T102559")
        );
    }

    #[test]
    fn self_href_absent() {
        let mut item: Item = serde_json::from_str(sample_json()).unwrap();
        item.links.retain(|l| l.rel != "self");
        assert_eq!(item.self_href(), None);
    }

    #[test]
    fn bbox4_requires_four_finite_values() {
        let mut item: Item = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(item.bbox4(), Some([10.31, 45.02, 11.55, 46.05]));

        item.bbox = Some(vec![1.0, 2.0]);
        assert_eq!(item.bbox4(), None);

        item.bbox = Some(vec![1.0, f64::NAN, 3.0, 4.0]);
        assert_eq!(item.bbox4(), None);

        item.bbox = None;
        assert_eq!(item.bbox4(), None);
    }

    #[test]
    fn asset_keys_are_sorted() {
        let item: Item = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(item.asset_keys(), vec!["B04".to_string(), "visual".to_string()]);
    }

    #[test]
    fn properties_extra_preserved() {
        let item: Item = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(
            item.properties.extra.get("platform").and_then(|v| v.as_str()),
            Some("sentinel-2b")
        );
    }
}
