//! Raster layer lifecycle management.
//!
//! [`LayerManager`] owns the set of currently rendered tile layers: it
//! synthesizes tile URLs, registers source/layer pairs with the map
//! collaborator, enforces the layer cap by evicting the oldest layer, and
//! emits lifecycle events for UI collaborators.
//!
//! The manager is the sole mutator of the map entries it creates
//! (identified by its own id naming scheme) and never touches sources or
//! layers it did not create. All mutating methods take `&mut self`, so
//! calls from one owner are serialized by construction; if several owners
//! race on the same layer id the registry outcome is last-writer-wins.

mod error;
mod events;
mod fade;
mod types;

pub use error::LayerError;
pub use events::LayerEvent;
pub use fade::FadePlan;
pub use types::{LayerId, LayerInfo, LayerState};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::http::AsyncHttpClient;
use crate::map::{
    LayoutProperty, LngLatBounds, MapGl, PaintProperty, RasterLayer, RasterSource,
    RASTER_TILE_SIZE,
};
use crate::preset::{CollectionHints, PresetCatalog, SensorFamily};
use crate::signing::TokenSigner;
use crate::stac::Item;
use crate::tiles::{TileUrlBuilder, TileUrlError, TileUrlTemplate};
use crate::time::unix_millis;
use types::LayerRecord;

/// Capacity of the lifecycle event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Options for [`LayerManager::add_layer`].
#[derive(Debug, Clone)]
pub struct AddLayerOptions {
    /// Initial opacity, clamped to [0, 1].
    pub opacity: f64,
    /// Initial visibility.
    pub visible: bool,
    /// Move the camera to the item's (padded) bounds after registering.
    pub fit_to_bounds: bool,
    /// Replacement for the preset's rescale range.
    pub scale_override: Option<crate::preset::RescaleRange>,
    /// Fetch one sample tile before registering and log if it fails.
    /// Never fails the add.
    pub precheck: bool,
}

impl Default for AddLayerOptions {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            visible: true,
            fit_to_bounds: true,
            scale_override: None,
            precheck: false,
        }
    }
}

/// Notification from the map collaborator about one of its sources.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvent {
    pub source_id: String,
    pub kind: SourceEventKind,
}

/// Kinds of source notifications the manager consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEventKind {
    /// The source finished loading its visible tiles.
    Loaded,
    /// Load progress, 0-100.
    Progress(u8),
    /// The source reported an error; logged, never fatal.
    Error(String),
}

/// Owns and drives the set of rendered tile layers.
pub struct LayerManager<C: AsyncHttpClient + Clone, M: MapGl> {
    map: Arc<M>,
    catalog: Arc<PresetCatalog>,
    urls: TileUrlBuilder<C>,
    http: C,
    config: EngineConfig,
    layers: Vec<LayerRecord>,
    events: broadcast::Sender<LayerEvent>,
    seq: u64,
}

impl<C: AsyncHttpClient + Clone, M: MapGl> LayerManager<C, M> {
    /// Creates a manager wired to a map collaborator and preset catalog.
    pub fn new(map: Arc<M>, catalog: Arc<PresetCatalog>, http: C, config: EngineConfig) -> Self {
        let signer = TokenSigner::with_ttl(
            http.clone(),
            config.signing_api.clone(),
            config.token_ttl,
        );
        let urls = TileUrlBuilder::new(
            config.tiler_base_url.clone(),
            config.vendor_tile_api.clone(),
            signer,
        );
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            map,
            catalog,
            urls,
            http,
            config,
            layers: Vec::new(),
            events,
            seq: 0,
        }
    }

    /// Subscribes to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<LayerEvent> {
        self.events.subscribe()
    }

    /// Adds a tile layer for `item` rendered with `preset_key`.
    ///
    /// Synthesis runs first, so a failure leaves the current layer set
    /// untouched. If the cap is reached, the single oldest layer is fully
    /// removed before the new source/layer pair is registered; the cap is
    /// never exceeded, even transiently.
    pub async fn add_layer(
        &mut self,
        item: &Item,
        preset_key: &str,
        options: AddLayerOptions,
    ) -> Result<LayerId, LayerError> {
        if !self.map.is_ready() {
            return Err(LayerError::MapNotReady);
        }

        let collection = item.collection.clone().unwrap_or_default();
        let hints = CollectionHints::from_id(&collection);
        let family = self.catalog.family_for(&hints);
        let preset = self
            .catalog
            .get(family, preset_key)
            .ok_or_else(|| TileUrlError::PresetUnavailable {
                key: preset_key.to_string(),
                family: family.name().to_string(),
            })?
            .clone();

        let template = self.urls.build(item, &preset, options.scale_override).await?;

        if options.precheck {
            self.precheck(&template).await;
        }

        while self.layers.len() >= self.config.max_layers {
            self.evict_oldest();
        }

        self.register(
            Arc::new(item.clone()),
            preset.key.clone(),
            family,
            template,
            options.opacity.clamp(0.0, 1.0),
            options.visible,
            options.fit_to_bounds,
        )
    }

    /// Re-renders an existing layer's item under a different preset.
    ///
    /// Equivalent to removing the layer and re-adding the same item with
    /// the new preset, preserving opacity and visibility; the result is a
    /// new layer id. If synthesis for the new preset fails, the original
    /// layer is left untouched.
    pub async fn change_visualization(
        &mut self,
        layer_id: &LayerId,
        new_preset_key: &str,
    ) -> Result<LayerId, LayerError> {
        let record = self
            .layers
            .iter()
            .find(|r| &r.id == layer_id)
            .ok_or_else(|| LayerError::UnknownLayer(layer_id.clone()))?;

        let item = Arc::clone(&record.item);
        let family = record.family;
        let opacity = record.opacity;
        let visible = record.visible;

        let preset = self
            .catalog
            .get(family, new_preset_key)
            .ok_or_else(|| TileUrlError::PresetUnavailable {
                key: new_preset_key.to_string(),
                family: family.name().to_string(),
            })?
            .clone();

        let template = self.urls.build(&item, &preset, None).await?;

        self.remove_layer(layer_id);
        self.register(item, preset.key.clone(), family, template, opacity, visible, false)
    }

    /// Sets a layer's opacity (clamped to [0, 1]), cancelling any
    /// in-flight fade.
    pub fn set_opacity(&mut self, layer_id: &LayerId, value: f64) -> Result<(), LayerError> {
        let value = value.clamp(0.0, 1.0);
        let record = self
            .layers
            .iter_mut()
            .find(|r| &r.id == layer_id)
            .ok_or_else(|| LayerError::UnknownLayer(layer_id.clone()))?;

        self.map
            .set_paint_property(record.id.as_str(), PaintProperty::RasterOpacity(value))?;
        record.opacity = value;
        record.fade = None;

        let _ = self.events.send(LayerEvent::OpacityChanged {
            layer: layer_id.clone(),
            opacity: value,
        });
        Ok(())
    }

    /// Sets a layer's visibility.
    pub fn set_visibility(&mut self, layer_id: &LayerId, visible: bool) -> Result<(), LayerError> {
        let record = self
            .layers
            .iter_mut()
            .find(|r| &r.id == layer_id)
            .ok_or_else(|| LayerError::UnknownLayer(layer_id.clone()))?;

        self.map
            .set_layout_property(record.id.as_str(), LayoutProperty::Visibility(visible))?;
        record.visible = visible;

        let _ = self.events.send(LayerEvent::VisibilityChanged {
            layer: layer_id.clone(),
            visible,
        });
        Ok(())
    }

    /// Removes a layer and its backing source.
    ///
    /// Idempotent-safe: removing an id that is not registered returns
    /// `false` without touching the map. Returns `true` when a layer was
    /// actually removed.
    pub fn remove_layer(&mut self, layer_id: &LayerId) -> bool {
        match self.layers.iter().position(|r| &r.id == layer_id) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    /// Removes every layer, then emits [`LayerEvent::AllCleared`].
    pub fn clear_layers(&mut self) {
        while !self.layers.is_empty() {
            self.remove_at(0);
        }
        let _ = self.events.send(LayerEvent::AllCleared);
    }

    /// Starts a linear opacity fade toward `target`.
    ///
    /// The host drives the interpolation via [`tick_fades`]; removing the
    /// layer or setting opacity directly cancels the plan.
    ///
    /// [`tick_fades`]: LayerManager::tick_fades
    pub fn begin_fade(
        &mut self,
        layer_id: &LayerId,
        target: f64,
        duration: Duration,
    ) -> Result<(), LayerError> {
        let record = self
            .layers
            .iter_mut()
            .find(|r| &r.id == layer_id)
            .ok_or_else(|| LayerError::UnknownLayer(layer_id.clone()))?;
        record.fade = Some(FadePlan::new(
            record.opacity,
            target.clamp(0.0, 1.0),
            duration,
            Instant::now(),
        ));
        Ok(())
    }

    /// Cancels an in-flight fade, leaving opacity wherever the last tick
    /// put it.
    pub fn cancel_fade(&mut self, layer_id: &LayerId) -> Result<(), LayerError> {
        let record = self
            .layers
            .iter_mut()
            .find(|r| &r.id == layer_id)
            .ok_or_else(|| LayerError::UnknownLayer(layer_id.clone()))?;
        record.fade = None;
        Ok(())
    }

    /// Applies one interpolation step to every in-flight fade.
    ///
    /// Driven by the host's frame or timer primitive. Emits
    /// [`LayerEvent::OpacityChanged`] when a fade completes.
    pub fn tick_fades(&mut self, now: Instant) {
        for record in &mut self.layers {
            let Some(plan) = &record.fade else { continue };
            let value = plan.opacity_at(now);
            let finished = plan.done(now);

            if let Err(e) = self
                .map
                .set_paint_property(record.id.as_str(), PaintProperty::RasterOpacity(value))
            {
                warn!(layer = %record.id, error = %e, "fade step failed");
                record.fade = None;
                continue;
            }
            record.opacity = value;

            if finished {
                record.fade = None;
                let _ = self.events.send(LayerEvent::OpacityChanged {
                    layer: record.id.clone(),
                    opacity: value,
                });
            }
        }
    }

    /// Feeds a source notification from the map collaborator into the
    /// manager. Events for sources the manager does not own are silently
    /// ignored; this is how notifications for already-removed layers are
    /// discarded.
    pub fn handle_source_event(&mut self, event: SourceEvent) {
        let Some(record) = self
            .layers
            .iter_mut()
            .find(|r| r.source_id == event.source_id)
        else {
            trace!(source = event.source_id.as_str(), "ignoring event for unowned source");
            return;
        };

        match event.kind {
            SourceEventKind::Loaded => {
                if record.state == LayerState::Creating {
                    record.state = LayerState::Active;
                    let _ = self.events.send(LayerEvent::Loaded {
                        layer: record.id.clone(),
                    });
                }
            }
            SourceEventKind::Progress(progress) => {
                let _ = self.events.send(LayerEvent::LoadProgress {
                    layer: record.id.clone(),
                    progress: progress.min(100),
                });
            }
            SourceEventKind::Error(message) => {
                warn!(
                    layer = %record.id,
                    source = record.source_id.as_str(),
                    error = message.as_str(),
                    "source reported an error"
                );
            }
        }
    }

    /// Snapshot of one layer.
    pub fn layer_info(&self, layer_id: &LayerId) -> Option<LayerInfo> {
        self.layers
            .iter()
            .find(|r| &r.id == layer_id)
            .map(LayerRecord::info)
    }

    /// Snapshots of all layers, oldest first.
    pub fn layers(&self) -> Vec<LayerInfo> {
        self.layers.iter().map(LayerRecord::info).collect()
    }

    /// Number of currently rendered layers.
    pub fn active_count(&self) -> usize {
        self.layers.len()
    }

    /// Fetches one sample tile so an unreachable tiler shows up in the
    /// logs before the map starts requesting in bulk.
    async fn precheck(&self, template: &TileUrlTemplate) {
        let url = template.at(0, 0, 0);
        match self.http.get(&url).await {
            Ok(_) => debug!(url = url.as_str(), "tile precheck succeeded"),
            Err(e) => warn!(url = url.as_str(), error = %e, "tile precheck failed"),
        }
    }

    /// Evicts the single oldest layer (smallest `created_at`, insertion
    /// order as the tie-break).
    fn evict_oldest(&mut self) {
        let Some(index) = self
            .layers
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| (r.created_at, r.seq))
            .map(|(i, _)| i)
        else {
            return;
        };
        let id = self.layers[index].id.clone();
        info!(layer = %id, "evicting oldest layer to respect cap");
        self.remove_at(index);
    }

    /// Removes the record at `index`: rendering layer first, then its
    /// backing source, then the record itself, then the event. Callers
    /// never observe a source without its layer or vice versa.
    fn remove_at(&mut self, index: usize) {
        let record = self.layers.remove(index);
        if let Err(e) = self.map.remove_layer(record.id.as_str()) {
            warn!(layer = %record.id, error = %e, "failed to remove rendering layer");
        }
        if let Err(e) = self.map.remove_source(&record.source_id) {
            warn!(source = record.source_id.as_str(), error = %e, "failed to remove source");
        }
        debug!(layer = %record.id, "layer removed");
        let _ = self.events.send(LayerEvent::Removed { layer: record.id });
    }

    /// Registers a synthesized template as a new source/layer pair.
    fn register(
        &mut self,
        item: Arc<Item>,
        preset_key: String,
        family: SensorFamily,
        template: TileUrlTemplate,
        opacity: f64,
        visible: bool,
        fit_to_bounds: bool,
    ) -> Result<LayerId, LayerError> {
        let created_at = unix_millis();
        self.seq += 1;
        let id = LayerId::mint(created_at, self.seq);
        let source_id = format!("{}-source", id.as_str());

        self.map.add_source(RasterSource {
            id: source_id.clone(),
            tiles: vec![template.template().to_string()],
            tile_size: RASTER_TILE_SIZE,
            bounds: item.bbox4(),
            attribution: None,
        })?;

        if let Err(e) = self.map.add_layer(RasterLayer {
            id: id.as_str().to_string(),
            source: source_id.clone(),
            opacity,
            visible,
        }) {
            // Roll the source back so no half-registered pair survives.
            if let Err(cleanup) = self.map.remove_source(&source_id) {
                warn!(source = source_id.as_str(), error = %cleanup, "source rollback failed");
            }
            return Err(e.into());
        }

        if fit_to_bounds {
            if let Some(bbox) = item.bbox4() {
                let bounds = LngLatBounds::from_bbox(&bbox).expanded(self.config.fit_padding);
                if let Err(e) = self.map.fit_bounds(bounds, Default::default()) {
                    warn!(layer = %id, error = %e, "fit-to-bounds failed");
                }
            }
        }

        let item_id = item.id.clone();
        self.layers.push(LayerRecord {
            id: id.clone(),
            source_id,
            item,
            preset_key: preset_key.clone(),
            family,
            created_at,
            seq: self.seq,
            opacity,
            visible,
            mode: template.mode(),
            state: LayerState::Creating,
            resolved_assets: template.resolved_assets().to_vec(),
            rescale: template.rescale(),
            fade: None,
        });

        info!(
            layer = %id,
            item = item_id.as_str(),
            preset = preset_key.as_str(),
            mode = template.mode().name(),
            "layer added"
        );
        let _ = self.events.send(LayerEvent::Added {
            layer: id.clone(),
            item: item_id,
            preset: preset_key,
        });
        Ok(id)
    }
}
