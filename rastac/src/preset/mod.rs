//! Visualization preset catalog.
//!
//! A preset is a named recipe for turning an item's assets into a rendered
//! raster: either an ordered band combination or an arithmetic expression,
//! plus rescaling and color-mapping parameters. Presets are grouped by
//! sensor family; the [`PresetCatalog`] is built once and handed to the
//! components that need it by reference, never looked up through globals.

mod catalog;
mod types;

pub use catalog::{CollectionHints, PresetCatalog, SensorFamily};
pub use types::{Category, Preset, Rendering, RescaleRange};
