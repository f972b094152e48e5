use anyhow::Result;
use nmp::format::LUT_ENTRIES;

use super::{builder, format_size, open_pack, PackOptions};

pub fn run(options: &PackOptions) -> Result<()> {
    let path = builder(options)?.pack_path().to_path_buf();
    let pack = open_pack(options)?;
    let info = pack.info();
    let bbox = info.bounding_box;

    // Display information
    println!("Pack: {}", path.display());
    println!(
        "Version: {} (max supported {})",
        info.version, info.max_supported_version
    );
    println!("Last updated: {}", info.last_updated.format("%a %b %d %Y"));
    println!();
    println!("Longitude: {} to {}", bbox.min_long, bbox.max_long);
    println!("Latitude: {} to {}", bbox.min_lat, bbox.max_lat);
    println!();
    println!("File size: {}", format_size(info.file_bytes as u64));
    println!("Record stream: {}", format_size(info.record_bytes as u64));
    println!("Buckets in use: {} of {}", info.non_empty_buckets, LUT_ENTRIES);
    println!(
        "Outward-only lookups: {}",
        if info.supports_outward_only {
            "supported"
        } else {
            "not supported"
        }
    );
    println!("Lookup mode: {:?}", pack.lookup_mode());

    Ok(())
}
