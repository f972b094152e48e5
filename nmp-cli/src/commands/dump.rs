use anyhow::{bail, Context, Result};
use nmp::postcode::unpack;
use serde::Serialize;

use super::{open_pack, PackOptions};

#[derive(Serialize)]
struct DumpLine {
    code: u32,
    outward_only: bool,
    lat: i32,
    long: i32,
    longitude: Option<f64>,
    latitude: Option<f64>,
    candidates: Vec<String>,
}

/// `"SW"` stays as is; `"B"` becomes `"B "`.
fn parse_prefix(prefix: &str) -> Result<[u8; 2]> {
    match prefix.as_bytes() {
        [c1] => Ok([*c1, b' ']),
        [c1, c2] => Ok([*c1, *c2]),
        _ => bail!("Prefix must be one or two characters: {:?}", prefix),
    }
}

pub fn run(options: &PackOptions, prefix: &str, json: bool) -> Result<()> {
    let prefix = parse_prefix(prefix)?;
    let pack = open_pack(options)?;

    let records = pack
        .bucket_records(prefix[0], prefix[1])
        .context("Failed to find bucket")?;

    if !json {
        println!(
            "{:>8} {:>3} {:>6} {:>6} {:>10} {:>10}  CANDIDATES",
            "CODE", "OUT", "LAT", "LONG", "LATITUDE", "LONGITUDE"
        );
        println!("{}", "-".repeat(60));
    }

    let mut count = 0usize;
    for record in records {
        let record = record.context("Failed to decode record")?;
        let position = record.position(pack.bounding_box()).ok();
        let candidates: Vec<String> = unpack(prefix, record.code, record.outward_only)
            .iter()
            .map(|p| p.display_form())
            .collect();

        if json {
            let line = DumpLine {
                code: record.code,
                outward_only: record.outward_only,
                lat: record.lat,
                long: record.long,
                longitude: position.map(|p| p.longitude),
                latitude: position.map(|p| p.latitude),
                candidates,
            };
            println!("{}", serde_json::to_string(&line)?);
        } else {
            let (lat, lon) = match position {
                Some(p) => (format!("{:.5}", p.latitude), format!("{:.5}", p.longitude)),
                None => ("-".to_string(), "-".to_string()),
            };
            println!(
                "{:>8} {:>3} {:>6} {:>6} {:>10} {:>10}  {}",
                record.code,
                if record.outward_only { "yes" } else { "" },
                record.lat,
                record.long,
                lat,
                lon,
                candidates.join(" | ")
            );
        }
        count += 1;
    }

    tracing::debug!(records = count, "Dumped bucket");
    Ok(())
}
