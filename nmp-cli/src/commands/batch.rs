use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use super::{column_index, default_output, open_pack, PackOptions};

pub fn run(
    options: &PackOptions,
    input: PathBuf,
    output: Option<PathBuf>,
    postcode_col: &str,
) -> Result<()> {
    let pack = open_pack(options)?;

    let file = File::open(&input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let postcode_idx = column_index(&headers, postcode_col)?;

    // Collect records for progress bar
    let records: Vec<_> = reader.records().collect::<Result<_, _>>()?;
    let total = records.len() as u64;

    let pb = if options.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let output_path = output.unwrap_or_else(|| default_output(&input, "_located"));
    let output_file = File::create(&output_path).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.push("longitude");
    new_headers.push("latitude");
    writer.write_record(&new_headers)?;

    let started = Instant::now();
    let mut failed = 0u64;

    for (row, record) in records.iter().enumerate() {
        let postcode = record.get(postcode_idx).unwrap_or("").trim();

        let (longitude, latitude) = match pack.lookup(postcode) {
            Ok(location) => {
                let (lon, lat) = location.position.to_tuple();
                (lon.to_string(), lat.to_string())
            }
            Err(e) => {
                failed += 1;
                pb.suspend(|| {
                    tracing::warn!(row = row + 1, postcode, error = %e, "Lookup failed");
                });
                (String::new(), String::new())
            }
        };

        let mut new_record: Vec<&str> = record.iter().collect();
        new_record.push(&longitude);
        new_record.push(&latitude);
        writer.write_record(&new_record)?;

        pb.inc(1);
    }

    pb.finish_with_message("done");
    writer.flush()?;

    tracing::debug!(
        rows = total,
        failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Batch complete"
    );

    println!("Output written to: {}", output_path.display());
    Ok(())
}
