//! Lifecycle events emitted for UI collaborators.

use super::types::LayerId;

/// Events emitted by the layer manager.
///
/// Delivered over a `tokio::sync::broadcast` channel; subscribers that lag
/// behind lose the oldest events, never the manager.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    /// A layer was registered with the map.
    Added {
        layer: LayerId,
        item: String,
        preset: String,
    },
    /// The layer's backing source reported fully loaded.
    Loaded { layer: LayerId },
    /// Load progress for the layer's backing source, 0-100.
    LoadProgress { layer: LayerId, progress: u8 },
    /// The layer's opacity changed (direct set or completed fade).
    OpacityChanged { layer: LayerId, opacity: f64 },
    /// The layer's visibility flag changed.
    VisibilityChanged { layer: LayerId, visible: bool },
    /// The layer and its backing source were removed.
    Removed { layer: LayerId },
    /// All layers were removed at once.
    AllCleared,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_comparable() {
        let id = LayerId::mint(1000, 1);
        assert_eq!(
            LayerEvent::Loaded { layer: id.clone() },
            LayerEvent::Loaded { layer: id }
        );
        assert_ne!(LayerEvent::AllCleared, LayerEvent::Loaded {
            layer: LayerId::mint(1000, 2)
        });
    }
}
