//! Generic band name to concrete asset key resolution.
//!
//! A preset talks about `red` or `nir`; an item publishes assets named
//! `B04` or `B8A`. Resolution scans the item's own metadata, so it is
//! recomputed per call rather than cached. Per band, first match wins:
//!
//! 1. spectral match: an asset band's center wavelength (normalized to
//!    nanometers) falls inside the target window for the generic name;
//! 2. direct name match: an asset key literally equals the generic name
//!    (exact, then ASCII case-insensitive);
//! 3. naming-convention fallback: a fixed alias table per generic name;
//! 4. unresolved: the generic name is returned unchanged and the
//!    synthesizer surfaces the failure when the asset lookup misses.
//!
//! The resolver is pure and never mutates the item.

use crate::stac::Item;

/// Target wavelength window, in nanometers, for one generic band name.
#[derive(Debug, Clone, Copy)]
pub struct SpectralWindow {
    pub name: &'static str,
    pub min_nm: f64,
    pub max_nm: f64,
}

/// Wavelength windows for the generic band names the presets use.
const SPECTRAL_WINDOWS: &[SpectralWindow] = &[
    SpectralWindow { name: "blue", min_nm: 450.0, max_nm: 520.0 },
    SpectralWindow { name: "green", min_nm: 520.0, max_nm: 600.0 },
    SpectralWindow { name: "red", min_nm: 630.0, max_nm: 700.0 },
    SpectralWindow { name: "rededge", min_nm: 700.0, max_nm: 760.0 },
    SpectralWindow { name: "nir", min_nm: 760.0, max_nm: 900.0 },
    SpectralWindow { name: "swir1", min_nm: 1550.0, max_nm: 1750.0 },
    SpectralWindow { name: "swir2", min_nm: 2100.0, max_nm: 2300.0 },
    SpectralWindow { name: "lwir", min_nm: 10000.0, max_nm: 12500.0 },
];

/// Known provider naming conventions per generic band name.
const NAME_ALIASES: &[(&str, &[&str])] = &[
    ("blue", &["B02", "B2", "BLUE", "band2"]),
    ("green", &["B03", "B3", "GREEN", "band3"]),
    ("red", &["B04", "B4", "RED", "band4"]),
    ("rededge", &["B05", "B06", "B07", "REDEDGE"]),
    ("nir", &["B08", "B8", "B8A", "NIR", "nir08", "band5"]),
    ("swir1", &["B11", "SWIR1", "swir16", "band6"]),
    ("swir2", &["B12", "SWIR2", "swir22", "band7"]),
    ("lwir", &["B10", "lwir11", "TIR", "band10"]),
    ("vv", &["VV"]),
    ("vh", &["VH"]),
    ("hh", &["HH"]),
    ("hv", &["HV"]),
    ("data", &["DEM", "dem", "elevation", "height"]),
];

/// Normalize a published center wavelength to nanometers.
///
/// The STAC EO extension uses micrometers; some catalogs publish
/// nanometers directly. Values under 100 are treated as micrometers.
fn normalize_nm(wavelength: f64) -> f64 {
    if wavelength < 100.0 {
        wavelength * 1000.0
    } else {
        wavelength
    }
}

fn spectral_window(name: &str) -> Option<&'static SpectralWindow> {
    SPECTRAL_WINDOWS.iter().find(|w| w.name == name)
}

fn aliases(name: &str) -> &'static [&'static str] {
    NAME_ALIASES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, a)| *a)
        .unwrap_or(&[])
}

/// Resolve one generic band name against an item's assets.
pub fn resolve_band(name: &str, item: &Item) -> String {
    // 1. Spectral match over every asset's band metadata. Assets iterate
    //    in sorted key order, so resolution is deterministic.
    if let Some(window) = spectral_window(name) {
        for (key, asset) in &item.assets {
            for band in &asset.bands {
                if let Some(w) = band.center_wavelength {
                    let nm = normalize_nm(w);
                    if nm >= window.min_nm && nm <= window.max_nm {
                        return key.clone();
                    }
                }
            }
        }
    }

    // 2. Direct name match: exact, then case-insensitive.
    if item.assets.contains_key(name) {
        return name.to_string();
    }
    if let Some(key) = item.assets.keys().find(|k| k.eq_ignore_ascii_case(name)) {
        return key.clone();
    }

    // 3. Naming-convention fallback.
    for alias in aliases(name) {
        if item.assets.contains_key(*alias) {
            return (*alias).to_string();
        }
    }

    // 4. Unresolved.
    name.to_string()
}

/// Resolve an ordered sequence of generic band names.
pub fn resolve_bands<S: AsRef<str>>(names: &[S], item: &Item) -> Vec<String> {
    names
        .iter()
        .map(|n| resolve_band(n.as_ref(), item))
        .collect()
}

/// Rewrite an arithmetic expression so band-name identifiers refer to the
/// item's concrete asset keys, returning the rewritten formula and the
/// distinct resolved keys in order of first appearance.
pub fn resolve_expression(expression: &str, item: &Item) -> (String, Vec<String>) {
    let mut rewritten = String::with_capacity(expression.len());
    let mut resolved_keys: Vec<String> = Vec::new();
    let mut chars = expression.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_ascii_alphabetic() || c == '_' {
            let mut end = start + c.len_utf8();
            while let Some(&(i, nc)) = chars.peek() {
                if nc.is_ascii_alphanumeric() || nc == '_' {
                    end = i + nc.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let ident = &expression[start..end];
            let resolved = resolve_band(ident, item);
            // Identifiers that did not land on an asset (function names,
            // unresolvable bands) pass through without being reported.
            if item.assets.contains_key(&resolved) && !resolved_keys.contains(&resolved) {
                resolved_keys.push(resolved.clone());
            }
            rewritten.push_str(&resolved);
        } else {
            rewritten.push(c);
        }
    }

    (rewritten, resolved_keys)
}
