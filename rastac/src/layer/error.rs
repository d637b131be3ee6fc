//! Error types for layer lifecycle operations.

use thiserror::Error;

use crate::map::MapError;
use crate::tiles::TileUrlError;

use super::types::LayerId;

/// Errors that can reject a layer operation.
///
/// A rejected operation leaves no partial layer state behind: if
/// synthesis or registration fails, no source/layer pair remains on the
/// map and no record is kept.
#[derive(Debug, Error)]
pub enum LayerError {
    /// The map collaborator is not yet initialized.
    #[error("map collaborator is not ready")]
    MapNotReady,

    /// No layer with the given id is registered.
    #[error("no layer with id '{0}'")]
    UnknownLayer(LayerId),

    /// Tile URL synthesis failed.
    #[error(transparent)]
    Tile(#[from] TileUrlError),

    /// The map collaborator rejected an operation.
    #[error("map operation failed: {0}")]
    Map(#[from] MapError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_layer_display() {
        let err = LayerError::UnknownLayer(LayerId::mint(1000, 1));
        assert_eq!(err.to_string(), "no layer with id 'rastac-layer-1000-1'");
    }

    #[test]
    fn tile_error_is_transparent() {
        let err = LayerError::from(TileUrlError::MissingSelfLink {
            item: "x".to_string(),
        });
        assert!(err.to_string().contains("no self link"));
    }

    #[test]
    fn map_error_wrapped() {
        let err = LayerError::from(MapError::NotReady);
        assert_eq!(err.to_string(), "map operation failed: map is not ready");
    }
}
