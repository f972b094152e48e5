//! # NMP - UK Postcode Pack Reader
//!
//! Fast, allocation-light library for resolving UK postcodes to coordinates
//! from a compact, delta-encoded binary pack.
//!
//! ## Features
//!
//! - **Fast**: Memory-mapped I/O and a two-character prefix index
//! - **Compact**: Records are delta-encoded, most take 3 bytes
//! - **Offline**: Works with a local pack file, no network required
//! - **Thread-safe**: An opened [`PostcodePack`] is immutable and `Send + Sync`
//!
//! ## Quick Start
//!
//! ```ignore
//! use nmp::PostcodePack;
//!
//! let pack = PostcodePack::from_file("/data/postcodes.pack")?;
//! let found = pack.lookup("SW1A1AA")?;
//! let (longitude, latitude) = found.position.to_tuple();
//! println!("{} is at {}, {}", found.postcode.display_form(), latitude, longitude);
//! ```
//!
//! ## Pack Format
//!
//! All integers are little-endian.
//!
//! | Offset | Content |
//! |--------|---------|
//! | 0 | magic `"UKPP"` |
//! | 4 | version (`u32`, 1 or 2) |
//! | 8, 12 | two `u32` summed into a Unix timestamp |
//! | 16 | bounding box: 4 × `f64` (min long, max long, min lat, max lat) |
//! | 48 | 936 × `u32` bucket start offsets, one per prefix |
//! | 3792 | `u32` end of the last bucket |
//! | 3796 | record stream |
//!
//! See [`scanner`] for the record layout and [`postcode`] for how postcodes
//! are packed into codes.

pub mod bbox;
pub mod distance;
pub mod error;
pub mod format;
pub mod header;
pub mod lookup_table;
pub mod pack;
pub mod postcode;
pub mod scanner;

#[cfg(feature = "geojson")]
pub mod geojson;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
mod fixture;

// Re-export main types at crate root for convenience
pub use bbox::{BoundingBox, Position};
pub use distance::{distance, sort_by_distance, sort_by_distance_with_km, LatLon};
pub use error::{PackError, Result};
pub use header::PackHeader;
pub use lookup_table::{Bucket, LookupMode, LookupTable};
pub use pack::{PackInfo, PostcodeLocation, PostcodePack, PostcodePackBuilder};
pub use postcode::NormalizedPostcode;
pub use scanner::{Record, RecordScanner};
