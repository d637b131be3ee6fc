//! Layer records and read-only snapshots.

use std::fmt;
use std::sync::Arc;

use crate::preset::{RescaleRange, SensorFamily};
use crate::stac::Item;
use crate::tiles::BackendMode;

use super::fade::FadePlan;

/// Unique, time-derived identifier of a rendered layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(String);

impl LayerId {
    pub(crate) fn mint(unix_millis: u64, seq: u64) -> Self {
        Self(format!("rastac-layer-{}-{}", unix_millis, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a layer.
///
/// The only reachable path is absent -> creating -> active -> removing ->
/// absent; "absent" and "removing" are not observable states of a stored
/// record because removal drops the record in the same call. Visibility is
/// a layout property of an active layer, not a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    /// Registered with the map; the source has not reported loaded yet.
    Creating,
    /// The backing source has fully loaded.
    Active,
}

impl LayerState {
    pub fn name(&self) -> &'static str {
        match self {
            LayerState::Creating => "creating",
            LayerState::Active => "active",
        }
    }
}

/// Internal record for one rendered layer. Owned exclusively by the
/// manager; external readers get [`LayerInfo`] snapshots.
#[derive(Debug)]
pub(crate) struct LayerRecord {
    pub id: LayerId,
    pub source_id: String,
    pub item: Arc<Item>,
    pub preset_key: String,
    pub family: SensorFamily,
    /// Creation time in Unix milliseconds; eviction removes the smallest.
    pub created_at: u64,
    /// Monotonic sequence number; stable tie-break for equal timestamps.
    pub seq: u64,
    pub opacity: f64,
    pub visible: bool,
    pub mode: BackendMode,
    pub state: LayerState,
    pub resolved_assets: Vec<String>,
    pub rescale: RescaleRange,
    pub fade: Option<FadePlan>,
}

/// Read-only snapshot of a layer's externally relevant state.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub id: LayerId,
    pub source_id: String,
    pub item_id: String,
    pub preset_key: String,
    pub created_at: u64,
    pub opacity: f64,
    pub visible: bool,
    pub mode: BackendMode,
    pub state: LayerState,
    pub resolved_assets: Vec<String>,
    pub rescale: RescaleRange,
}

impl LayerRecord {
    pub fn info(&self) -> LayerInfo {
        LayerInfo {
            id: self.id.clone(),
            source_id: self.source_id.clone(),
            item_id: self.item.id.clone(),
            preset_key: self.preset_key.clone(),
            created_at: self.created_at,
            opacity: self.opacity,
            visible: self.visible,
            mode: self.mode,
            state: self.state,
            resolved_assets: self.resolved_assets.clone(),
            rescale: self.rescale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_id_format() {
        let id = LayerId::mint(1718000000123, 7);
        assert_eq!(id.as_str(), "rastac-layer-1718000000123-7");
        assert_eq!(id.to_string(), id.as_str());
    }

    #[test]
    fn layer_ids_with_distinct_seq_differ() {
        assert_ne!(LayerId::mint(1000, 1), LayerId::mint(1000, 2));
    }

    #[test]
    fn state_names() {
        assert_eq!(LayerState::Creating.name(), "creating");
        assert_eq!(LayerState::Active.name(), "active");
    }
}
