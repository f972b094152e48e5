//! Basic example demonstrating nmp library usage.
//!
//! Run with: cargo run --example basic -- /path/to/postcodes.pack

use nmp::{distance, LatLon, PackError, PostcodePack};
use std::env;

fn main() -> Result<(), PackError> {
    // Get pack path from command line
    let pack_path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example basic -- /path/to/postcodes.pack");
        std::process::exit(1);
    });

    let pack = PostcodePack::from_file(&pack_path)?;
    println!(
        "Pack version {}, last updated {}",
        pack.version(),
        pack.last_updated().format("%a %b %d %Y")
    );

    // Some well-known addresses, plus an outward code on its own
    let postcodes = ["SW1A1AA", "EH991SP", "CF101NS", "M1"];

    println!("\nLookups:");
    println!("{:-<50}", "");

    let mut found = Vec::new();
    for postcode in postcodes {
        match pack.lookup(postcode) {
            Ok(location) => {
                let (lon, lat) = location.position.to_tuple();
                println!("{}: {:.5}, {:.5}", location.postcode.display_form(), lat, lon);
                found.push(location);
            }
            Err(PackError::NotFound { .. }) => {
                println!("{}: not in this pack", postcode);
            }
            Err(e) => {
                println!("{}: error - {}", postcode, e);
            }
        }
    }

    // Distances from the first hit
    if let Some((origin, rest)) = found.split_first() {
        println!("\nDistances from {}:", origin.postcode.display_form());
        for location in rest {
            let km = distance(origin.position.into(), LatLon::from(location.position));
            println!("  {}: {:.1} km", location.postcode.display_form(), km);
        }
    }

    Ok(())
}
