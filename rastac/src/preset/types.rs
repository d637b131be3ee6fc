//! Preset record types.

use std::fmt;

/// Broad visualization category of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Multi-band color composite (e.g. true color).
    Composite,
    /// Single band rendered as grayscale or through a colormap.
    Monochrome,
    /// Normalized-difference style index (NDVI, NDWI, ...).
    Index,
    /// Band ratio (e.g. VV/VH).
    Ratio,
    /// Terrain/elevation rendering.
    Terrain,
}

impl Category {
    /// Lower-case name for display and logging.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Composite => "composite",
            Category::Monochrome => "monochrome",
            Category::Index => "index",
            Category::Ratio => "ratio",
            Category::Terrain => "terrain",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive value range used for the tiler's `rescale` parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RescaleRange {
    pub min: f64,
    pub max: f64,
}

impl RescaleRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl fmt::Display for RescaleRange {
    /// Renders as `"{min},{max}"`, the wire form the tiler expects.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.min, self.max)
    }
}

/// How a preset turns assets into pixels: an ordered band combination XOR
/// an arithmetic expression over band names.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendering {
    /// 1-3 generic band names, in render order.
    Bands {
        bands: Vec<String>,
        /// Post-processing formula; only meaningful for 3-band composites.
        color_formula: Option<String>,
    },
    /// Arithmetic formula over generic band names.
    Expression { expression: String },
}

/// An immutable visualization recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    /// Stable lookup key (e.g. `true-color`).
    pub key: String,
    /// Human-readable name.
    pub display_name: String,
    /// One-line description.
    pub description: String,
    pub category: Category,
    pub rendering: Rendering,
    pub rescale: RescaleRange,
    /// Named colormap applied by the tiler.
    pub colormap_name: Option<String>,
    /// Resampling method requested from the tiler.
    pub resampling_method: Option<String>,
}

impl Preset {
    /// Creates a band-combination preset.
    pub fn bands(
        key: &str,
        display_name: &str,
        description: &str,
        category: Category,
        bands: &[&str],
        rescale: RescaleRange,
    ) -> Self {
        debug_assert!(!bands.is_empty() && bands.len() <= 3);
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            category,
            rendering: Rendering::Bands {
                bands: bands.iter().map(|b| b.to_string()).collect(),
                color_formula: None,
            },
            rescale,
            colormap_name: None,
            resampling_method: None,
        }
    }

    /// Creates an expression preset.
    pub fn expression(
        key: &str,
        display_name: &str,
        description: &str,
        category: Category,
        expression: &str,
        rescale: RescaleRange,
    ) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            category,
            rendering: Rendering::Expression {
                expression: expression.to_string(),
            },
            rescale,
            colormap_name: None,
            resampling_method: None,
        }
    }

    pub fn with_color_formula(mut self, formula: &str) -> Self {
        if let Rendering::Bands { color_formula, .. } = &mut self.rendering {
            *color_formula = Some(formula.to_string());
        }
        self
    }

    pub fn with_colormap(mut self, name: &str) -> Self {
        self.colormap_name = Some(name.to_string());
        self
    }

    pub fn with_resampling(mut self, method: &str) -> Self {
        self.resampling_method = Some(method.to_string());
        self
    }

    /// Number of bands for a band-combination preset, `None` for
    /// expression presets.
    pub fn band_count(&self) -> Option<usize> {
        match &self.rendering {
            Rendering::Bands { bands, .. } => Some(bands.len()),
            Rendering::Expression { .. } => None,
        }
    }

    /// True when the preset renders exactly one band with no expression.
    pub fn is_single_band(&self) -> bool {
        self.band_count() == Some(1)
    }
}
