//! CLI subcommand implementations.

mod presets;
mod resolve;
mod tile_url;

pub use presets::{presets, PresetsArgs};
pub use resolve::{resolve, ResolveArgs};
pub use tile_url::{tile_url, TileUrlArgs};

use rastac::stac::Item;
use std::fs;
use std::path::Path;

/// Loads a STAC item from a JSON file.
pub(crate) fn load_item(path: &Path) -> Result<Item, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("{} is not a STAC item: {}", path.display(), e))
}
