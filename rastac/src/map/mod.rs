//! Map collaborator contract.
//!
//! The engine does not render anything itself: it registers tiled sources
//! and raster layers with a map component through the [`MapGl`] trait and
//! receives source load notifications back through
//! [`crate::layer::LayerManager::handle_source_event`]. A headless
//! [`MemoryMap`] implementation is provided for tests and non-graphical
//! hosts.

mod memory;

pub use memory::{MapOp, MemoryMap};

use thiserror::Error;

/// Default raster tile size in pixels.
pub const RASTER_TILE_SIZE: u32 = 256;

/// Errors surfaced by a map collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MapError {
    /// The map is not yet initialized.
    #[error("map is not ready")]
    NotReady,

    /// A source or layer id is already registered.
    #[error("id '{0}' is already registered")]
    DuplicateId(String),

    /// No layer with the given id.
    #[error("unknown layer '{0}'")]
    UnknownLayer(String),

    /// No source with the given id.
    #[error("unknown source '{0}'")]
    UnknownSource(String),
}

/// Configuration for one tiled raster source.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSource {
    pub id: String,
    /// Tile URL templates with `{z}/{x}/{y}` placeholders.
    pub tiles: Vec<String>,
    pub tile_size: u32,
    /// Optional geographic extent `[west, south, east, north]` used by the
    /// map to avoid requesting tiles outside the item.
    pub bounds: Option<[f64; 4]>,
    pub attribution: Option<String>,
}

/// Configuration for one raster rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayer {
    pub id: String,
    /// Id of the backing tiled source.
    pub source: String,
    pub opacity: f64,
    pub visible: bool,
}

/// Paint properties the engine updates on active layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintProperty {
    RasterOpacity(f64),
}

/// Layout properties the engine updates on active layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutProperty {
    Visibility(bool),
}

/// Geographic bounds in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLatBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl LngLatBounds {
    /// Builds bounds from a STAC `[west, south, east, north]` bbox.
    pub fn from_bbox(bbox: &[f64; 4]) -> Self {
        Self {
            west: bbox[0],
            south: bbox[1],
            east: bbox[2],
            north: bbox[3],
        }
    }

    /// Returns bounds expanded on every side by `fraction` of the
    /// respective span (0.1 widens a 1 degree span by 0.1 degrees on each
    /// side).
    pub fn expanded(&self, fraction: f64) -> Self {
        let dx = (self.east - self.west) * fraction;
        let dy = (self.north - self.south) * fraction;
        Self {
            west: self.west - dx,
            south: self.south - dy,
            east: self.east + dx,
            north: self.north + dy,
        }
    }
}

/// Options for a fit-to-bounds camera move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBoundsOptions {
    pub animate: bool,
}

impl Default for FitBoundsOptions {
    fn default() -> Self {
        Self { animate: true }
    }
}

/// Contract required of the map rendering collaborator.
///
/// The engine only ever mutates sources and layers it created itself; it
/// must never touch entries registered by anyone else.
pub trait MapGl: Send + Sync {
    /// True once the map is initialized and can accept sources.
    fn is_ready(&self) -> bool;

    fn add_source(&self, source: RasterSource) -> Result<(), MapError>;

    fn add_layer(&self, layer: RasterLayer) -> Result<(), MapError>;

    fn remove_layer(&self, id: &str) -> Result<(), MapError>;

    fn remove_source(&self, id: &str) -> Result<(), MapError>;

    fn set_paint_property(&self, layer_id: &str, prop: PaintProperty) -> Result<(), MapError>;

    fn set_layout_property(&self, layer_id: &str, prop: LayoutProperty) -> Result<(), MapError>;

    fn fit_bounds(&self, bounds: LngLatBounds, opts: FitBoundsOptions) -> Result<(), MapError>;
}
