//! `tile-url` subcommand: synthesize and print a tile URL.

use clap::Args;
use rastac::config::EngineConfig;
use rastac::http::ReqwestClient;
use rastac::preset::{CollectionHints, PresetCatalog, RescaleRange};
use rastac::signing::TokenSigner;
use rastac::tiles::TileUrlBuilder;
use std::path::PathBuf;

use super::load_item;

#[derive(Args)]
pub struct TileUrlArgs {
    /// Path to a STAC item JSON file
    #[arg(long)]
    pub item: PathBuf,

    /// Preset key (e.g. true-color)
    #[arg(long)]
    pub preset: String,

    /// Zoom level for a concrete tile; omit to print the template
    #[arg(long)]
    pub z: Option<u8>,

    /// Tile column
    #[arg(long, default_value = "0")]
    pub x: u32,

    /// Tile row
    #[arg(long, default_value = "0")]
    pub y: u32,

    /// Replace the preset's rescale range, as "min,max"
    #[arg(long)]
    pub rescale: Option<String>,

    /// Tiler base URL
    #[arg(long)]
    pub tiler: Option<String>,
}

pub async fn tile_url(args: TileUrlArgs) -> Result<(), String> {
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

    let scale_override = match &args.rescale {
        Some(raw) => Some(parse_rescale(raw)?),
        None => None,
    };

    let mut config = EngineConfig::default();
    if let Some(tiler) = args.tiler {
        config = config.with_tiler_base_url(tiler);
    }

    let http = ReqwestClient::with_timeout(config.http_timeout)
        .map_err(|e| format!("HTTP client: {}", e))?;
    let signer = TokenSigner::with_ttl(http, config.signing_api.clone(), config.token_ttl);
    let builder = TileUrlBuilder::new(
        config.tiler_base_url.clone(),
        config.vendor_tile_api.clone(),
        signer,
    );

    let template = builder
        .build(&item, preset, scale_override)
        .await
        .map_err(|e| e.to_string())?;

    eprintln!("mode: {}", template.mode());
    match args.z {
        Some(z) => println!("{}", template.at(z, args.x, args.y)),
        None => println!("{}", template.template()),
    }
    Ok(())
}

fn parse_rescale(raw: &str) -> Result<RescaleRange, String> {
    let (min, max) = raw
        .split_once(',')
        .ok_or_else(|| format!("invalid rescale '{}', expected \"min,max\"", raw))?;
    let min: f64 = min
        .trim()
        .parse()
        .map_err(|_| format!("invalid rescale minimum '{}'", min))?;
    let max: f64 = max
        .trim()
        .parse()
        .map_err(|_| format!("invalid rescale maximum '{}'", max))?;
    Ok(RescaleRange::new(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rescale_valid() {
        let r = parse_rescale("0,4000").unwrap();
        assert_eq!(r.min, 0.0);
        assert_eq!(r.max, 4000.0);
    }

    #[test]
    fn parse_rescale_with_spaces_and_negatives() {
        let r = parse_rescale("-1, 1").unwrap();
        assert_eq!(r.min, -1.0);
        assert_eq!(r.max, 1.0);
    }

    #[test]
    fn parse_rescale_invalid() {
        assert!(parse_rescale("4000").is_err());
        assert!(parse_rescale("a,b").is_err());
    }
}
