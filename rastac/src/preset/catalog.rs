//! Sensor-family detection and the per-family preset tables.

use tracing::debug;

use super::types::{Category, Preset, RescaleRange};

/// Classification of a collection used to pick the relevant preset set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorFamily {
    Optical,
    Sar,
    Elevation,
    Thermal,
}

/// Keywords that classify a collection as SAR.
const SAR_KEYWORDS: &[&str] = &["sentinel-1", "sar", "radar", "rtc", "palsar", "backscatter"];

/// Keywords that classify a collection as elevation data.
const ELEVATION_KEYWORDS: &[&str] = &[
    "dem", "dsm", "dtm", "elevation", "nasadem", "cop-dem", "alos-dem", "terrain", "lidar",
];

/// Keywords that classify a collection as thermal.
const THERMAL_KEYWORDS: &[&str] = &[
    "thermal",
    "lst",
    "surface-temperature",
    "surface_temperature",
    "lwir",
    "brightness-temperature",
];

impl SensorFamily {
    /// Lower-case name for display and logging.
    pub fn name(&self) -> &'static str {
        match self {
            SensorFamily::Optical => "optical",
            SensorFamily::Sar => "sar",
            SensorFamily::Elevation => "elevation",
            SensorFamily::Thermal => "thermal",
        }
    }

    /// Detect a family from collection hints by substring matching, or
    /// `None` when nothing matches.
    ///
    /// Elevation and thermal are checked before SAR so that e.g. a radar
    /// derived DEM ("alos-dem") classifies as elevation.
    pub fn detect(hints: &CollectionHints<'_>) -> Option<Self> {
        let haystack = hints.haystack();
        if ELEVATION_KEYWORDS.iter().any(|k| haystack.contains(k)) {
            return Some(SensorFamily::Elevation);
        }
        if THERMAL_KEYWORDS.iter().any(|k| haystack.contains(k)) {
            return Some(SensorFamily::Thermal);
        }
        if SAR_KEYWORDS.iter().any(|k| haystack.contains(k)) {
            return Some(SensorFamily::Sar);
        }
        None
    }
}

impl std::fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Text fields of a collection used for sensor-family detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionHints<'a> {
    pub id: &'a str,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub keywords: &'a [String],
}

impl<'a> CollectionHints<'a> {
    /// Hints carrying only a collection identifier, the common case when
    /// working from an item.
    pub fn from_id(id: &'a str) -> Self {
        Self {
            id,
            title: None,
            description: None,
            keywords: &[],
        }
    }

    fn haystack(&self) -> String {
        let mut s = String::new();
        s.push_str(&self.id.to_ascii_lowercase());
        for part in [self.title, self.description].into_iter().flatten() {
            s.push(' ');
            s.push_str(&part.to_ascii_lowercase());
        }
        for kw in self.keywords {
            s.push(' ');
            s.push_str(&kw.to_ascii_lowercase());
        }
        s
    }
}

/// Immutable registry of visualization presets grouped by sensor family.
///
/// Built once with [`PresetCatalog::new`] and passed by reference into the
/// components that need it. Lookups have no side effects and cannot fail:
/// an unmatched collection yields the optical preset set.
#[derive(Debug)]
pub struct PresetCatalog {
    optical: Vec<Preset>,
    sar: Vec<Preset>,
    elevation: Vec<Preset>,
    thermal: Vec<Preset>,
}

/// Default color formula for natural-color composites.
const COMPOSITE_COLOR_FORMULA: &str = "Gamma RGB 3.2 Saturation 0.8 Sigmoidal RGB 25 0.35";

impl PresetCatalog {
    /// Builds the full preset registry.
    pub fn new() -> Self {
        Self {
            optical: Self::optical_presets(),
            sar: Self::sar_presets(),
            elevation: Self::elevation_presets(),
            thermal: Self::thermal_presets(),
        }
    }

    fn optical_presets() -> Vec<Preset> {
        vec![
            Preset::bands(
                "true-color",
                "True Color",
                "Natural color composite (red, green, blue)",
                Category::Composite,
                &["red", "green", "blue"],
                RescaleRange::new(0.0, 4000.0),
            )
            .with_color_formula(COMPOSITE_COLOR_FORMULA),
            Preset::bands(
                "false-color",
                "False Color (NIR)",
                "Vegetation-emphasizing composite (nir, red, green)",
                Category::Composite,
                &["nir", "red", "green"],
                RescaleRange::new(0.0, 4000.0),
            )
            .with_color_formula(COMPOSITE_COLOR_FORMULA),
            Preset::bands(
                "swir-composite",
                "SWIR Composite",
                "Moisture/burn-scar composite (swir2, nir, red)",
                Category::Composite,
                &["swir2", "nir", "red"],
                RescaleRange::new(0.0, 4000.0),
            ),
            Preset::expression(
                "ndvi",
                "NDVI",
                "Normalized difference vegetation index",
                Category::Index,
                "(nir-red)/(nir+red)",
                RescaleRange::new(-1.0, 1.0),
            )
            .with_colormap("rdylgn"),
            Preset::expression(
                "ndwi",
                "NDWI",
                "Normalized difference water index",
                Category::Index,
                "(green-nir)/(green+nir)",
                RescaleRange::new(-1.0, 1.0),
            )
            .with_colormap("rdbu"),
            Preset::bands(
                "nir",
                "Near Infrared",
                "Single-band near infrared",
                Category::Monochrome,
                &["nir"],
                RescaleRange::new(0.0, 6000.0),
            ),
        ]
    }

    fn sar_presets() -> Vec<Preset> {
        vec![
            Preset::bands(
                "vv",
                "VV Backscatter",
                "Co-polarized backscatter",
                Category::Monochrome,
                &["vv"],
                RescaleRange::new(0.0, 0.5),
            )
            .with_colormap("gray"),
            Preset::bands(
                "vh",
                "VH Backscatter",
                "Cross-polarized backscatter",
                Category::Monochrome,
                &["vh"],
                RescaleRange::new(0.0, 0.1),
            )
            .with_colormap("gray"),
            Preset::expression(
                "vv-vh-ratio",
                "VV/VH Ratio",
                "Polarization ratio",
                Category::Ratio,
                "vv/vh",
                RescaleRange::new(0.0, 10.0),
            ),
        ]
    }

    fn elevation_presets() -> Vec<Preset> {
        vec![
            Preset::bands(
                "elevation",
                "Elevation",
                "Colormapped terrain elevation",
                Category::Terrain,
                &["data"],
                RescaleRange::new(-100.0, 4000.0),
            )
            .with_colormap("terrain")
            .with_resampling("bilinear"),
            Preset::bands(
                "elevation-gray",
                "Elevation (grayscale)",
                "Grayscale terrain elevation",
                Category::Terrain,
                &["data"],
                RescaleRange::new(0.0, 3000.0),
            )
            .with_colormap("gray")
            .with_resampling("bilinear"),
        ]
    }

    fn thermal_presets() -> Vec<Preset> {
        vec![Preset::bands(
            "thermal",
            "Thermal",
            "Colormapped brightness temperature",
            Category::Monochrome,
            &["lwir"],
            RescaleRange::new(270.0, 330.0),
        )
        .with_colormap("magma")]
    }

    /// Detected family for a collection, falling back to optical.
    pub fn family_for(&self, hints: &CollectionHints<'_>) -> SensorFamily {
        let family = SensorFamily::detect(hints).unwrap_or(SensorFamily::Optical);
        debug!(collection = hints.id, family = family.name(), "sensor family detected");
        family
    }

    /// Preset table for one family.
    pub fn presets(&self, family: SensorFamily) -> &[Preset] {
        match family {
            SensorFamily::Optical => &self.optical,
            SensorFamily::Sar => &self.sar,
            SensorFamily::Elevation => &self.elevation,
            SensorFamily::Thermal => &self.thermal,
        }
    }

    /// Preset table applicable to a collection.
    pub fn presets_for(&self, hints: &CollectionHints<'_>) -> &[Preset] {
        self.presets(self.family_for(hints))
    }

    /// Preset lookup within a family.
    pub fn get(&self, family: SensorFamily, key: &str) -> Option<&Preset> {
        self.presets(family).iter().find(|p| p.key == key)
    }

    /// Preset lookup for a collection (family detection + key lookup).
    pub fn find(&self, hints: &CollectionHints<'_>, key: &str) -> Option<&Preset> {
        self.get(self.family_for(hints), key)
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_sar_collections() {
        let hints = CollectionHints::from_id("sentinel-1-rtc");
        assert_eq!(SensorFamily::detect(&hints), Some(SensorFamily::Sar));
    }

    #[test]
    fn detects_elevation_before_sar() {
        // Radar-derived DEMs must classify as elevation.
        let hints = CollectionHints::from_id("alos-dem");
        assert_eq!(SensorFamily::detect(&hints), Some(SensorFamily::Elevation));
    }

    #[test]
    fn detects_thermal_from_description() {
        let hints = CollectionHints {
            id: "landsat-c2-l2-st",
            title: None,
            description: Some("Land Surface-Temperature products"),
            keywords: &[],
        };
        assert_eq!(SensorFamily::detect(&hints), Some(SensorFamily::Thermal));
    }

    #[test]
    fn detects_family_from_keywords() {
        let kws = vec!["radar".to_string()];
        let hints = CollectionHints {
            id: "some-collection",
            title: None,
            description: None,
            keywords: &kws,
        };
        assert_eq!(SensorFamily::detect(&hints), Some(SensorFamily::Sar));
    }

    #[test]
    fn unmatched_collection_falls_back_to_optical() {
        let catalog = PresetCatalog::new();
        let hints = CollectionHints::from_id("naip");
        assert_eq!(catalog.family_for(&hints), SensorFamily::Optical);
        assert!(!catalog.presets_for(&hints).is_empty());
    }

    #[test]
    fn optical_presets_include_true_color() {
        let catalog = PresetCatalog::new();
        let p = catalog.get(SensorFamily::Optical, "true-color").unwrap();
        assert_eq!(p.band_count(), Some(3));
        assert_eq!(p.rescale, RescaleRange::new(0.0, 4000.0));
    }

    #[test]
    fn sar_presets_have_ratio_expression() {
        let catalog = PresetCatalog::new();
        let p = catalog.get(SensorFamily::Sar, "vv-vh-ratio").unwrap();
        assert_eq!(p.band_count(), None);
        assert_eq!(p.category, Category::Ratio);
    }

    #[test]
    fn find_uses_detected_family() {
        let catalog = PresetCatalog::new();
        let hints = CollectionHints::from_id("sentinel-1-grd");
        assert!(catalog.find(&hints, "vv").is_some());
        // Optical keys are not visible from a SAR collection.
        assert!(catalog.find(&hints, "true-color").is_none());
    }

    #[test]
    fn unknown_key_yields_none() {
        let catalog = PresetCatalog::new();
        assert!(catalog.get(SensorFamily::Optical, "no-such-preset").is_none());
    }

    #[test]
    fn band_presets_stay_within_three_bands() {
        let catalog = PresetCatalog::new();
        for family in [
            SensorFamily::Optical,
            SensorFamily::Sar,
            SensorFamily::Elevation,
            SensorFamily::Thermal,
        ] {
            for preset in catalog.presets(family) {
                if let Some(n) = preset.band_count() {
                    assert!((1..=3).contains(&n), "preset {} has {} bands", preset.key, n);
                }
            }
        }
    }
}
