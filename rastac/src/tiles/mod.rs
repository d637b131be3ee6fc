//! Tile URL synthesis.
//!
//! Given a preset and an item, [`TileUrlBuilder`] resolves generic band
//! names to concrete assets, attaches credentials where storage requires
//! them, and emits a tile URL template for one of three backend
//! conventions:
//!
//! 1. **Direct single-asset** (`cog` backend): one band, no expression.
//!    Cheapest and most robust; the asset href goes straight to the tiler.
//! 2. **Vendor composite**: 2-3 bands where at least one asset sits on
//!    provider-gated storage. The provider's own multi-asset endpoint is
//!    addressed by collection + item and resolves assets and signing
//!    server-side.
//! 3. **Generic expression/multi-asset** (`stac` backend): expressions,
//!    or multiple assets on open storage. Requires the item's self URL.
//!
//! Templates keep literal `{z}/{x}/{y}` placeholders so a map source can
//! consume them directly; [`TileUrlTemplate::at`] fills them for a single
//! tile.

mod error;
mod query;

pub use error::TileUrlError;

use tracing::debug;

use crate::http::AsyncHttpClient;
use crate::preset::{Preset, Rendering, RescaleRange};
use crate::resolver::{resolve_bands, resolve_expression};
use crate::signing::{needs_signing, TokenSigner};
use crate::stac::Item;
use query::QueryString;

/// The URL-construction strategy chosen for one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Per-asset `cog` endpoint addressed by a raw asset URL.
    DirectAsset,
    /// Provider multi-asset endpoint addressed by collection + item.
    VendorComposite,
    /// Generic STAC-aware endpoint addressed by the item's self URL.
    GenericStac,
}

impl BackendMode {
    pub fn name(&self) -> &'static str {
        match self {
            BackendMode::DirectAsset => "direct-asset",
            BackendMode::VendorComposite => "vendor-composite",
            BackendMode::GenericStac => "generic-stac",
        }
    }
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A synthesized tile URL with `{z}/{x}/{y}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct TileUrlTemplate {
    url: String,
    mode: BackendMode,
    resolved_assets: Vec<String>,
    rescale: RescaleRange,
}

impl TileUrlTemplate {
    /// The templated URL, suitable for a raster tile source.
    pub fn template(&self) -> &str {
        &self.url
    }

    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    /// Concrete asset keys this template addresses, in render order.
    pub fn resolved_assets(&self) -> &[String] {
        &self.resolved_assets
    }

    /// The rescale range baked into the template.
    pub fn rescale(&self) -> RescaleRange {
        self.rescale
    }

    /// The URL for one tile coordinate.
    pub fn at(&self, z: u8, x: u32, y: u32) -> String {
        self.url
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// Synthesizes tile URLs for items and presets.
pub struct TileUrlBuilder<C: AsyncHttpClient> {
    titiler_base: String,
    vendor_base: String,
    signer: TokenSigner<C>,
}

impl<C: AsyncHttpClient> TileUrlBuilder<C> {
    /// Creates a builder.
    ///
    /// `titiler_base` hosts the `cog` and `stac` backends; `vendor_base`
    /// is the provider's own data API; `signer` supplies storage tokens.
    pub fn new(
        titiler_base: impl Into<String>,
        vendor_base: impl Into<String>,
        signer: TokenSigner<C>,
    ) -> Self {
        Self {
            titiler_base: trim_base(titiler_base.into()),
            vendor_base: trim_base(vendor_base.into()),
            signer,
        }
    }

    /// Builds the tile URL template for `preset` applied to `item`.
    ///
    /// A caller-supplied `scale_override` replaces the preset's rescale
    /// range entirely. Fails without side effects; signing failures are
    /// recovered internally and degrade to unsigned asset URLs.
    pub async fn build(
        &self,
        item: &Item,
        preset: &Preset,
        scale_override: Option<RescaleRange>,
    ) -> Result<TileUrlTemplate, TileUrlError> {
        let rescale = scale_override.unwrap_or(preset.rescale);

        let template = match &preset.rendering {
            Rendering::Bands { bands, .. } if bands.len() == 1 => {
                self.build_direct(item, preset, &bands[0], rescale).await?
            }
            Rendering::Bands {
                bands,
                color_formula,
            } => {
                let resolved = resolve_bands(bands, item);
                for (band, key) in bands.iter().zip(&resolved) {
                    if !item.assets.contains_key(key) {
                        return Err(TileUrlError::AssetNotFound {
                            band: band.clone(),
                            resolved: key.clone(),
                            item: item.id.clone(),
                            available: item.asset_keys(),
                        });
                    }
                }

                let any_gated = resolved
                    .iter()
                    .filter_map(|k| item.assets.get(k))
                    .any(|a| needs_signing(&a.href));

                if any_gated && item.collection.is_some() {
                    self.build_vendor(item, preset, resolved, color_formula.as_deref(), rescale)
                } else {
                    self.build_generic(
                        item,
                        preset,
                        GenericAddressing::Bands {
                            resolved,
                            color_formula: color_formula.as_deref(),
                        },
                        rescale,
                    )?
                }
            }
            Rendering::Expression { expression } => {
                let (rewritten, resolved) = resolve_expression(expression, item);
                self.build_generic(
                    item,
                    preset,
                    GenericAddressing::Expression {
                        expression: rewritten,
                        resolved,
                    },
                    rescale,
                )?
            }
        };

        debug!(
            item = item.id.as_str(),
            preset = preset.key.as_str(),
            mode = template.mode.name(),
            "tile URL synthesized"
        );
        Ok(template)
    }

    /// Mode 1: direct per-asset endpoint with a (possibly signed) raw URL.
    async fn build_direct(
        &self,
        item: &Item,
        preset: &Preset,
        band: &str,
        rescale: RescaleRange,
    ) -> Result<TileUrlTemplate, TileUrlError> {
        let resolved = crate::resolver::resolve_band(band, item);
        let asset = item.assets.get(&resolved).ok_or_else(|| TileUrlError::AssetNotFound {
            band: band.to_string(),
            resolved: resolved.clone(),
            item: item.id.clone(),
            available: item.asset_keys(),
        })?;

        let href = self.signer.sign(&asset.href).await;

        let mut q = QueryString::new();
        q.push_encoded("url", &href);
        q.push("rescale", &rescale.to_string());
        if let Some(colormap) = &preset.colormap_name {
            q.push("colormap_name", colormap);
        }
        if let Some(resampling) = &preset.resampling_method {
            q.push("resampling_method", resampling);
        }
        // A single band is never a 3-band composite, so color_formula is
        // never attached in this mode.

        Ok(TileUrlTemplate {
            url: format!(
                "{}/cog/tiles/WebMercatorQuad/{{z}}/{{x}}/{{y}}.png?{}",
                self.titiler_base,
                q.into_string()
            ),
            mode: BackendMode::DirectAsset,
            resolved_assets: vec![resolved],
            rescale,
        })
    }

    /// Mode 2: provider multi-asset endpoint; assets and signing are
    /// resolved server-side, so no signing call is made here.
    fn build_vendor(
        &self,
        item: &Item,
        preset: &Preset,
        resolved: Vec<String>,
        color_formula: Option<&str>,
        rescale: RescaleRange,
    ) -> TileUrlTemplate {
        let collection = item.collection.as_deref().unwrap_or_default();

        let mut q = QueryString::new();
        q.push("collection", collection);
        q.push("item", &item.id);
        for key in &resolved {
            q.push("assets", key);
        }
        q.push("rescale", &rescale.to_string());
        if let Some(colormap) = &preset.colormap_name {
            q.push("colormap_name", colormap);
        }
        if let Some(resampling) = &preset.resampling_method {
            q.push("resampling_method", resampling);
        }
        if resolved.len() == 3 {
            if let Some(formula) = color_formula {
                q.push_encoded("color_formula", formula);
            }
        }

        TileUrlTemplate {
            url: format!(
                "{}/item/tiles/WebMercatorQuad/{{z}}/{{x}}/{{y}}.png?{}",
                self.vendor_base,
                q.into_string()
            ),
            mode: BackendMode::VendorComposite,
            resolved_assets: resolved,
            rescale,
        }
    }

    /// Mode 3: generic STAC-aware endpoint addressed by the item's self
    /// URL, with band-addressable assets or an expression.
    fn build_generic(
        &self,
        item: &Item,
        preset: &Preset,
        addressing: GenericAddressing<'_>,
        rescale: RescaleRange,
    ) -> Result<TileUrlTemplate, TileUrlError> {
        let self_href = item.self_href().ok_or_else(|| TileUrlError::MissingSelfLink {
            item: item.id.clone(),
        })?;

        let mut q = QueryString::new();
        q.push_encoded("url", self_href);

        let resolved_assets = match addressing {
            GenericAddressing::Bands {
                resolved,
                color_formula,
            } => {
                for key in &resolved {
                    q.push("assets", key);
                }
                for key in &resolved {
                    q.push("asset_bidx", &format!("{}|1", key));
                }
                q.push("rescale", &rescale.to_string());
                if let Some(colormap) = &preset.colormap_name {
                    q.push("colormap_name", colormap);
                }
                if let Some(resampling) = &preset.resampling_method {
                    q.push("resampling_method", resampling);
                }
                if resolved.len() == 3 {
                    if let Some(formula) = color_formula {
                        q.push_encoded("color_formula", formula);
                    }
                }
                resolved
            }
            GenericAddressing::Expression {
                expression,
                resolved,
            } => {
                q.push_encoded("expression", &expression);
                q.push("rescale", &rescale.to_string());
                if let Some(colormap) = &preset.colormap_name {
                    q.push("colormap_name", colormap);
                }
                if let Some(resampling) = &preset.resampling_method {
                    q.push("resampling_method", resampling);
                }
                resolved
            }
        };

        q.push("asset_as_band", "true");

        Ok(TileUrlTemplate {
            url: format!(
                "{}/stac/tiles/WebMercatorQuad/{{z}}/{{x}}/{{y}}.png?{}",
                self.titiler_base,
                q.into_string()
            ),
            mode: BackendMode::GenericStac,
            resolved_assets,
            rescale,
        })
    }
}

/// How the generic backend addresses pixels.
enum GenericAddressing<'a> {
    Bands {
        resolved: Vec<String>,
        color_formula: Option<&'a str>,
    },
    Expression {
        expression: String,
        resolved: Vec<String>,
    },
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::MockHttpClient;
    use crate::preset::{Category, Preset, PresetCatalog, SensorFamily};
    use crate::stac::{Asset, Link, SpectralBand};
    use std::collections::BTreeMap;

    const TITILER: &str = "http://localhost:8000";
    const VENDOR: &str = "https://planetarycomputer.microsoft.com/api/data/v1";

    fn builder() -> TileUrlBuilder<MockHttpClient> {
        builder_with(MockHttpClient::ok(r#"{"token": "sig=abc"}"#))
    }

    fn builder_with(mock: MockHttpClient) -> TileUrlBuilder<MockHttpClient> {
        let signer = TokenSigner::new(mock, "https://example.com/api/sas/v1/token");
        TileUrlBuilder::new(TITILER, VENDOR, signer)
    }

    fn open_item(assets: Vec<(&str, &str)>) -> Item {
        Item {
            id: "S2A_TEST".to_string(),
            collection: Some("sentinel-2-l2a".to_string()),
            bbox: Some(vec![10.0, 45.0, 11.0, 46.0]),
            properties: Default::default(),
            assets: assets
                .into_iter()
                .map(|(k, href)| (k.to_string(), Asset::from_href(href)))
                .collect::<BTreeMap<_, _>>(),
            links: vec![Link {
                rel: "self".to_string(),
                href: "https://stac.example.com/items/S2A_TEST".to_string(),
                media_type: None,
            }],
        }
    }

    fn catalog_preset(key: &str) -> Preset {
        PresetCatalog::new()
            .get(SensorFamily::Optical, key)
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn single_band_selects_direct_mode() {
        let item = open_item(vec![("nir", "https://example.com/nir.tif")]);
        let preset = catalog_preset("nir");

        let t = builder().build(&item, &preset, None).await.unwrap();

        assert_eq!(t.mode(), BackendMode::DirectAsset);
        assert!(t.template().starts_with(
            "http://localhost:8000/cog/tiles/WebMercatorQuad/{z}/{x}/{y}.png?url="
        ));
        assert!(t.template().contains("rescale=0,6000"));
        assert!(!t.template().contains("color_formula"));
        assert_eq!(t.resolved_assets(), ["nir"]);
    }

    #[tokio::test]
    async fn direct_mode_signs_gated_asset() {
        let mock = MockHttpClient::ok(r#"{"token": "sig=abc"}"#);
        let item = open_item(vec![(
            "nir",
            "https://sentinel2l2a01.blob.core.windows.net/sentinel2-l2/B08.tif",
        )]);
        let preset = catalog_preset("nir");

        let t = builder_with(mock.clone()).build(&item, &preset, None).await.unwrap();

        assert_eq!(mock.requested().len(), 1);
        // The signed href is form-encoded inside the url parameter.
        assert!(t.template().contains("sig%3Dabc"));
    }

    #[tokio::test]
    async fn direct_mode_missing_asset_reports_inventory() {
        let item = open_item(vec![("thumbnail", "https://example.com/t.png")]);
        let preset = catalog_preset("nir");

        let err = builder().build(&item, &preset, None).await.unwrap_err();
        match err {
            TileUrlError::AssetNotFound {
                band,
                resolved,
                available,
                ..
            } => {
                assert_eq!(band, "nir");
                assert_eq!(resolved, "nir");
                assert_eq!(available, vec!["thumbnail".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn three_open_bands_select_generic_mode() {
        let item = open_item(vec![
            ("red", "https://example.com/red.tif"),
            ("green", "https://example.com/green.tif"),
            ("blue", "https://example.com/blue.tif"),
        ]);
        let preset = catalog_preset("true-color");

        let t = builder().build(&item, &preset, None).await.unwrap();

        assert_eq!(t.mode(), BackendMode::GenericStac);
        let url = t.template();
        assert!(url.contains("/stac/tiles/WebMercatorQuad/{z}/{x}/{y}.png?"));
        assert!(url.contains("assets=red&assets=green&assets=blue"));
        assert!(url.contains("asset_bidx=red|1&asset_bidx=green|1&asset_bidx=blue|1"));
        assert!(url.contains("rescale=0,4000"));
        assert!(url.contains("color_formula="));
        assert!(url.contains("asset_as_band=true"));
    }

    #[tokio::test]
    async fn gated_composite_selects_vendor_mode() {
        let item = open_item(vec![
            (
                "B04",
                "https://sentinel2l2a01.blob.core.windows.net/sentinel2-l2/B04.tif",
            ),
            (
                "B03",
                "https://sentinel2l2a01.blob.core.windows.net/sentinel2-l2/B03.tif",
            ),
            (
                "B02",
                "https://sentinel2l2a01.blob.core.windows.net/sentinel2-l2/B02.tif",
            ),
        ]);
        let preset = catalog_preset("true-color");

        let mock = MockHttpClient::ok(r#"{"token": "sig=abc"}"#);
        let t = builder_with(mock.clone()).build(&item, &preset, None).await.unwrap();

        assert_eq!(t.mode(), BackendMode::VendorComposite);
        let url = t.template();
        assert!(url.starts_with(
            "https://planetarycomputer.microsoft.com/api/data/v1/item/tiles/WebMercatorQuad/{z}/{x}/{y}.png?"
        ));
        assert!(url.contains("collection=sentinel-2-l2a"));
        assert!(url.contains("item=S2A_TEST"));
        assert!(url.contains("assets=B04&assets=B03&assets=B02"));
        // The vendor endpoint signs server-side; no token request is made.
        assert!(mock.requested().is_empty());
    }

    #[tokio::test]
    async fn gated_composite_without_collection_falls_back_to_generic() {
        let mut item = open_item(vec![
            (
                "B04",
                "https://sentinel2l2a01.blob.core.windows.net/sentinel2-l2/B04.tif",
            ),
            (
                "B03",
                "https://sentinel2l2a01.blob.core.windows.net/sentinel2-l2/B03.tif",
            ),
            (
                "B02",
                "https://sentinel2l2a01.blob.core.windows.net/sentinel2-l2/B02.tif",
            ),
        ]);
        item.collection = None;
        let preset = catalog_preset("true-color");

        let t = builder().build(&item, &preset, None).await.unwrap();
        assert_eq!(t.mode(), BackendMode::GenericStac);
    }

    #[tokio::test]
    async fn expression_selects_generic_mode_and_rewrites() {
        let item = open_item(vec![
            ("B04", "https://example.com/B04.tif"),
            ("B08", "https://example.com/B08.tif"),
        ]);
        let preset = catalog_preset("ndvi");

        let t = builder().build(&item, &preset, None).await.unwrap();

        assert_eq!(t.mode(), BackendMode::GenericStac);
        let url = t.template();
        assert!(url.contains("expression=%28B08-B04%29%2F%28B08%2BB04%29"));
        assert!(url.contains("rescale=-1,1"));
        assert!(url.contains("colormap_name=rdylgn"));
        assert!(!url.contains("color_formula"));
        assert_eq!(t.resolved_assets(), ["B08", "B04"]);
    }

    #[tokio::test]
    async fn generic_mode_without_self_link_fails() {
        let mut item = open_item(vec![
            ("red", "https://example.com/red.tif"),
            ("green", "https://example.com/green.tif"),
            ("blue", "https://example.com/blue.tif"),
        ]);
        item.links.clear();
        let preset = catalog_preset("true-color");

        let err = builder().build(&item, &preset, None).await.unwrap_err();
        assert!(matches!(err, TileUrlError::MissingSelfLink { .. }));
    }

    #[tokio::test]
    async fn composite_missing_asset_fails_before_mode_selection() {
        let item = open_item(vec![
            ("red", "https://example.com/red.tif"),
            ("green", "https://example.com/green.tif"),
        ]);
        let preset = catalog_preset("true-color");

        let err = builder().build(&item, &preset, None).await.unwrap_err();
        assert!(matches!(err, TileUrlError::AssetNotFound { .. }));
    }

    #[tokio::test]
    async fn three_band_composite_without_formula_omits_it() {
        let item = open_item(vec![
            ("swir2", "https://example.com/swir2.tif"),
            ("nir", "https://example.com/nir.tif"),
            ("red", "https://example.com/red.tif"),
        ]);
        let preset = catalog_preset("swir-composite");

        let t = builder().build(&item, &preset, None).await.unwrap();
        assert!(!t.template().contains("color_formula"));
        assert_eq!(t.resolved_assets(), ["swir2", "nir", "red"]);
    }

    #[tokio::test]
    async fn two_band_composite_never_gets_color_formula() {
        let preset = Preset::bands(
            "two-band",
            "Two Band",
            "test",
            Category::Composite,
            &["red", "green"],
            crate::preset::RescaleRange::new(0.0, 1000.0),
        )
        .with_color_formula("Gamma RGB 3.2");
        let item = open_item(vec![
            ("red", "https://example.com/red.tif"),
            ("green", "https://example.com/green.tif"),
        ]);

        let t = builder().build(&item, &preset, None).await.unwrap();
        assert!(!t.template().contains("color_formula"));
    }

    #[tokio::test]
    async fn scale_override_replaces_preset_range() {
        let item = open_item(vec![("nir", "https://example.com/nir.tif")]);
        let preset = catalog_preset("nir");

        let t = builder()
            .build(&item, &preset, Some(RescaleRange::new(100.0, 2500.0)))
            .await
            .unwrap();

        assert!(t.template().contains("rescale=100,2500"));
        assert!(!t.template().contains("rescale=0,6000"));
        assert_eq!(t.rescale(), RescaleRange::new(100.0, 2500.0));
    }

    #[tokio::test]
    async fn spectral_metadata_drives_resolution() {
        let mut item = open_item(vec![]);
        let mut b04 = Asset::from_href("https://example.com/B04.tif");
        b04.bands = vec![SpectralBand {
            name: Some("B04".to_string()),
            common_name: Some("red".to_string()),
            center_wavelength: Some(0.665),
        }];
        let mut b08 = Asset::from_href("https://example.com/B08.tif");
        b08.bands = vec![SpectralBand {
            name: Some("B08".to_string()),
            common_name: Some("nir".to_string()),
            center_wavelength: Some(0.842),
        }];
        item.assets.insert("B04".to_string(), b04);
        item.assets.insert("B08".to_string(), b08);

        let preset = catalog_preset("nir");
        let t = builder().build(&item, &preset, None).await.unwrap();
        assert_eq!(t.resolved_assets(), ["B08"]);
    }

    #[test]
    fn template_at_fills_coordinates() {
        let t = TileUrlTemplate {
            url: "http://localhost:8000/cog/tiles/WebMercatorQuad/{z}/{x}/{y}.png?url=x"
                .to_string(),
            mode: BackendMode::DirectAsset,
            resolved_assets: vec!["nir".to_string()],
            rescale: RescaleRange::new(0.0, 1.0),
        };
        assert_eq!(
            t.at(12, 2185, 1420),
            "http://localhost:8000/cog/tiles/WebMercatorQuad/12/2185/1420.png?url=x"
        );
    }

    #[test]
    fn backend_mode_names() {
        assert_eq!(BackendMode::DirectAsset.to_string(), "direct-asset");
        assert_eq!(BackendMode::VendorComposite.name(), "vendor-composite");
        assert_eq!(BackendMode::GenericStac.name(), "generic-stac");
    }
}
