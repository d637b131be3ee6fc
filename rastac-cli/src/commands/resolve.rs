//! `resolve` subcommand: show band-to-asset resolution for an item.

use clap::Args;
use rastac::preset::{CollectionHints, PresetCatalog, Rendering};
use rastac::resolver::{resolve_bands, resolve_expression};
use std::path::PathBuf;

use super::load_item;

#[derive(Args)]
pub struct ResolveArgs {
    /// Path to a STAC item JSON file
    #[arg(long)]
    pub item: PathBuf,

    /// Preset key (e.g. true-color)
    #[arg(long)]
    pub preset: String,
}

pub fn resolve(args: ResolveArgs) -> Result<(), String> {
    let item = load_item(&args.item)?;
    let catalog = PresetCatalog::new();
    let collection = item.collection.clone().unwrap_or_default();
    let hints = CollectionHints::from_id(&collection);
    let preset = catalog
        .find(&hints, &args.preset)
        .ok_or_else(|| {
            format!(
                "preset '{}' is not available for family '{}'",
                args.preset,
                catalog.family_for(&hints)
            )
        })?;

    println!("item:   {}", item.id);
    println!("preset: {}", preset.key);
    println!();

    match &preset.rendering {
        Rendering::Bands { bands, .. } => {
            let resolved = resolve_bands(bands, &item);
            for (band, key) in bands.iter().zip(&resolved) {
                let status = if item.assets.contains_key(key) {
                    "found"
                } else {
                    "MISSING"
                };
                println!("{:<10} -> {:<12} {}", band, key, status);
            }
        }
        Rendering::Expression { expression } => {
            let (rewritten, keys) = resolve_expression(expression, &item);
            println!("{} -> {}", expression, rewritten);
            println!("assets: [{}]", keys.join(", "));
        }
    }
    Ok(())
}
