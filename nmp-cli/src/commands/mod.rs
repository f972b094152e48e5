pub mod batch;
pub mod distance;
pub mod dump;
pub mod info;
pub mod lookup;
pub mod sort;

use anyhow::{bail, Context, Result};
use nmp::format::MAX_SUPPORTED_VERSION;
use nmp::{LatLon, LookupMode, PostcodePack, PostcodePackBuilder};
use std::path::{Path, PathBuf};

/// Pack settings shared by every subcommand.
pub struct PackOptions {
    pub path: Option<PathBuf>,
    pub lookup_mode: LookupMode,
    pub quiet: bool,
}

pub fn builder(options: &PackOptions) -> Result<PostcodePackBuilder> {
    let builder = match &options.path {
        Some(path) => PostcodePackBuilder::new(path),
        None => PostcodePackBuilder::from_env()
            .context("NMP_PACK environment variable not set. Use --pack or set NMP_PACK")?,
    };
    Ok(builder.lookup_mode(options.lookup_mode))
}

pub fn open_pack(options: &PackOptions) -> Result<PostcodePack> {
    let builder = builder(options)?;
    let path = builder.pack_path().to_path_buf();
    let pack = builder
        .build()
        .with_context(|| format!("Failed to open pack: {}", path.display()))?;

    tracing::info!(
        max_supported_version = MAX_SUPPORTED_VERSION,
        version = pack.version(),
        last_updated = %pack.last_updated().format("%a %b %d %Y"),
        "Loaded postcode pack"
    );
    Ok(pack)
}

/// Resolves command-line points, opening the pack only when a postcode is given.
pub struct PointResolver<'a> {
    options: &'a PackOptions,
    pack: Option<PostcodePack>,
}

impl<'a> PointResolver<'a> {
    pub fn new(options: &'a PackOptions) -> Self {
        Self {
            options,
            pack: None,
        }
    }

    /// Parse `"lat,lon"` or look up a postcode.
    pub fn resolve(&mut self, input: &str) -> Result<LatLon> {
        if let Some(point) = parse_lat_lon(input) {
            return point;
        }

        let pack = match self.pack.take() {
            Some(pack) => pack,
            None => open_pack(self.options)?,
        };
        let pack = self.pack.insert(pack);
        let location = pack
            .lookup(input)
            .with_context(|| format!("Failed to get postal code: {}", input))?;

        Ok(LatLon::from(location.position))
    }
}

/// `Some` if `input` looks like `"lat,lon"`, with the parse result.
pub fn parse_lat_lon(input: &str) -> Option<Result<LatLon>> {
    let (lat, lon) = input.split_once(',')?;
    Some(parse_pair(lat, lon).with_context(|| format!("Invalid point: {}", input)))
}

fn parse_pair(lat: &str, lon: &str) -> Result<LatLon> {
    let lat: f64 = lat.trim().parse()?;
    let lon: f64 = lon.trim().parse()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        bail!("latitude must be within ±90 and longitude within ±180");
    }
    Ok(LatLon::new(lat, lon))
}

/// `<input stem><suffix>.csv` next to the input file.
pub fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}{}.csv", stem, suffix))
}

/// Index of `name` in the CSV header row.
pub fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .with_context(|| format!("Column '{}' not found in CSV", name))
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
