use anyhow::{Context, Result};
use nmp::{sort_by_distance_with_km, LatLon};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use super::{column_index, default_output, PackOptions, PointResolver};

/// A CSV row reduced to its position in the input and its point.
#[derive(Clone, Copy)]
struct Row {
    index: usize,
    point: LatLon,
}

impl From<Row> for LatLon {
    fn from(row: Row) -> Self {
        row.point
    }
}

pub fn run(
    options: &PackOptions,
    input: PathBuf,
    from: &str,
    lat_col: &str,
    lon_col: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let reference = PointResolver::new(options).resolve(from)?;

    let file = File::open(&input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let lat_idx = column_index(&headers, lat_col)?;
    let lon_idx = column_index(&headers, lon_col)?;

    let records: Vec<_> = reader.records().collect::<Result<_, _>>()?;

    let rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| -> Result<Row> {
            let line = index + 2;
            let lat: f64 = record
                .get(lat_idx)
                .with_context(|| format!("Missing latitude on line {}", line))?
                .trim()
                .parse()
                .with_context(|| format!("Invalid latitude on line {}", line))?;
            let lon: f64 = record
                .get(lon_idx)
                .with_context(|| format!("Missing longitude on line {}", line))?
                .trim()
                .parse()
                .with_context(|| format!("Invalid longitude on line {}", line))?;
            Ok(Row {
                index,
                point: LatLon::new(lat, lon),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let ranked = sort_by_distance_with_km(&rows, reference);

    let output_path = output.unwrap_or_else(|| default_output(&input, "_sorted"));
    let output_file = File::create(&output_path).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.push("distance_km");
    writer.write_record(&new_headers)?;

    for (row, km) in ranked {
        let km = format!("{:.3}", km);
        let mut new_record: Vec<&str> = records[row.index].iter().collect();
        new_record.push(&km);
        writer.write_record(&new_record)?;
    }

    writer.flush()?;

    tracing::debug!(rows = rows.len(), reference = ?reference, "Sorted rows by distance");
    println!("Output written to: {}", output_path.display());
    Ok(())
}
