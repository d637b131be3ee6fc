//! Headless in-memory map backend.
//!
//! Implements [`MapGl`] against plain collections: useful as a test double
//! and for driving the engine without a graphical map. Every mutation is
//! also appended to an operation log so tests can assert on call order.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{
    FitBoundsOptions, LayoutProperty, LngLatBounds, MapError, MapGl, PaintProperty, RasterLayer,
    RasterSource,
};

/// One recorded map mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MapOp {
    AddSource(String),
    AddLayer(String),
    RemoveLayer(String),
    RemoveSource(String),
    SetPaint(String, PaintProperty),
    SetLayout(String, LayoutProperty),
    FitBounds(LngLatBounds),
}

#[derive(Debug, Default)]
struct State {
    ready: bool,
    sources: BTreeMap<String, RasterSource>,
    layers: BTreeMap<String, RasterLayer>,
    ops: Vec<MapOp>,
}

/// In-memory [`MapGl`] implementation.
#[derive(Debug)]
pub struct MemoryMap {
    state: Mutex<State>,
}

impl MemoryMap {
    /// Creates a ready map.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                ready: true,
                ..Default::default()
            }),
        }
    }

    /// Creates a map that reports not-ready, for failure-path tests.
    pub fn not_ready() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Registered source ids, sorted.
    pub fn source_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().sources.keys().cloned().collect()
    }

    /// Registered layer ids, sorted.
    pub fn layer_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().layers.keys().cloned().collect()
    }

    /// Snapshot of one registered layer.
    pub fn layer(&self, id: &str) -> Option<RasterLayer> {
        self.state.lock().unwrap().layers.get(id).cloned()
    }

    /// Snapshot of one registered source.
    pub fn source(&self, id: &str) -> Option<RasterSource> {
        self.state.lock().unwrap().sources.get(id).cloned()
    }

    /// The full operation log.
    pub fn ops(&self) -> Vec<MapOp> {
        self.state.lock().unwrap().ops.clone()
    }
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapGl for MemoryMap {
    fn is_ready(&self) -> bool {
        self.state.lock().unwrap().ready
    }

    fn add_source(&self, source: RasterSource) -> Result<(), MapError> {
        let mut state = self.state.lock().unwrap();
        if !state.ready {
            return Err(MapError::NotReady);
        }
        if state.sources.contains_key(&source.id) {
            return Err(MapError::DuplicateId(source.id));
        }
        state.ops.push(MapOp::AddSource(source.id.clone()));
        state.sources.insert(source.id.clone(), source);
        Ok(())
    }

    fn add_layer(&self, layer: RasterLayer) -> Result<(), MapError> {
        let mut state = self.state.lock().unwrap();
        if !state.ready {
            return Err(MapError::NotReady);
        }
        if state.layers.contains_key(&layer.id) {
            return Err(MapError::DuplicateId(layer.id));
        }
        if !state.sources.contains_key(&layer.source) {
            return Err(MapError::UnknownSource(layer.source));
        }
        state.ops.push(MapOp::AddLayer(layer.id.clone()));
        state.layers.insert(layer.id.clone(), layer);
        Ok(())
    }

    fn remove_layer(&self, id: &str) -> Result<(), MapError> {
        let mut state = self.state.lock().unwrap();
        if state.layers.remove(id).is_none() {
            return Err(MapError::UnknownLayer(id.to_string()));
        }
        state.ops.push(MapOp::RemoveLayer(id.to_string()));
        Ok(())
    }

    fn remove_source(&self, id: &str) -> Result<(), MapError> {
        let mut state = self.state.lock().unwrap();
        if state.sources.remove(id).is_none() {
            return Err(MapError::UnknownSource(id.to_string()));
        }
        state.ops.push(MapOp::RemoveSource(id.to_string()));
        Ok(())
    }

    fn set_paint_property(&self, layer_id: &str, prop: PaintProperty) -> Result<(), MapError> {
        let mut state = self.state.lock().unwrap();
        let layer = state
            .layers
            .get_mut(layer_id)
            .ok_or_else(|| MapError::UnknownLayer(layer_id.to_string()))?;
        match prop {
            PaintProperty::RasterOpacity(value) => layer.opacity = value,
        }
        state.ops.push(MapOp::SetPaint(layer_id.to_string(), prop));
        Ok(())
    }

    fn set_layout_property(&self, layer_id: &str, prop: LayoutProperty) -> Result<(), MapError> {
        let mut state = self.state.lock().unwrap();
        let layer = state
            .layers
            .get_mut(layer_id)
            .ok_or_else(|| MapError::UnknownLayer(layer_id.to_string()))?;
        match prop {
            LayoutProperty::Visibility(visible) => layer.visible = visible,
        }
        state.ops.push(MapOp::SetLayout(layer_id.to_string(), prop));
        Ok(())
    }

    fn fit_bounds(&self, bounds: LngLatBounds, _opts: FitBoundsOptions) -> Result<(), MapError> {
        let mut state = self.state.lock().unwrap();
        if !state.ready {
            return Err(MapError::NotReady);
        }
        state.ops.push(MapOp::FitBounds(bounds));
        Ok(())
    }
}
