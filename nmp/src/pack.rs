//! The opened postcode pack and its lookup operations.
//!
//! [`PostcodePack`] validates the header once, decodes the bounding box and
//! lookup table, and then answers lookups as pure reads over the immutable
//! buffer. It is `Send + Sync`, so one pack can serve many threads.
//!
//! # Example
//!
//! ```ignore
//! use nmp::PostcodePack;
//!
//! let pack = PostcodePack::from_file("postcodes.pack")?;
//! let found = pack.lookup("SW1A1AA")?;
//! println!("{} is at {:?}", found.postcode, found.position.to_tuple());
//! ```

use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use memmap2::Mmap;

use crate::bbox::{BoundingBox, Position};
use crate::error::{PackError, Result};
use crate::format::{MAX_SUPPORTED_VERSION, RECORD_STREAM_OFFSET};
use crate::header::PackHeader;
use crate::lookup_table::{LookupMode, LookupTable};
use crate::postcode::{normalize, NormalizedPostcode};
use crate::scanner::{scan, RecordScanner};

/// Environment variable naming the pack file.
pub const ENV_PACK: &str = "NMP_PACK";

/// Environment variable selecting the [`LookupMode`].
pub const ENV_LOOKUP_MODE: &str = "NMP_LOOKUP_MODE";

/// Backing storage for a pack.
enum PackData {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for PackData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            PackData::Mapped(mmap) => mmap,
            PackData::Owned(bytes) => bytes,
        }
    }
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PostcodeLocation {
    /// The postcode in normalized 4+3 layout.
    pub postcode: NormalizedPostcode,
    /// Where it is, longitude first.
    pub position: Position,
}

impl PostcodeLocation {
    /// `(normalized postcode, (longitude, latitude))`.
    pub fn into_tuple(self) -> (String, (f64, f64)) {
        (self.postcode.to_string(), self.position.to_tuple())
    }
}

/// Read-only summary of a pack.
#[derive(Debug, Clone)]
pub struct PackInfo {
    /// File format version.
    pub version: u32,
    /// Highest version this library reads.
    pub max_supported_version: u32,
    /// When the data was last updated.
    pub last_updated: DateTime<Utc>,
    /// Extents the coordinates are normalized against.
    pub bounding_box: BoundingBox,
    /// Total size of the pack in bytes.
    pub file_bytes: usize,
    /// Size of the record stream in bytes.
    pub record_bytes: usize,
    /// Number of prefix buckets holding records.
    pub non_empty_buckets: usize,
    /// Whether outward-only lookups are possible.
    pub supports_outward_only: bool,
}

/// An opened, validated postcode pack.
pub struct PostcodePack {
    data: PackData,
    header: PackHeader,
    bbox: BoundingBox,
    table: LookupTable,
    mode: LookupMode,
}

impl PostcodePack {
    /// Open a pack from an in-memory buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is invalid (see [`PackHeader::parse`]),
    /// the bounding box is malformed, or the buffer ends before the record
    /// stream.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_data(PackData::Owned(bytes.into()), LookupMode::default())
    }

    /// Open a pack file by memory-mapping it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_mode(path, LookupMode::default())
    }

    /// Open a pack file with an explicit [`LookupMode`].
    pub fn from_file_with_mode<P: AsRef<Path>>(path: P, mode: LookupMode) -> Result<Self> {
        let file = File::open(path)?;

        // SAFETY: The file is opened read-only and the mapping is never
        // exposed mutably. Callers must not modify the file while it is open.
        let mmap = unsafe { Mmap::map(&file)? };

        Self::from_data(PackData::Mapped(mmap), mode)
    }

    /// Create a builder for more configuration options.
    pub fn builder<P: AsRef<Path>>(path: P) -> PostcodePackBuilder {
        PostcodePackBuilder::new(path)
    }

    fn from_data(data: PackData, mode: LookupMode) -> Result<Self> {
        let header = PackHeader::parse(&data)?;

        if data.len() < RECORD_STREAM_OFFSET {
            return Err(PackError::Truncated {
                offset: 0,
                needed: RECORD_STREAM_OFFSET,
                len: data.len(),
            });
        }

        let bbox = BoundingBox::parse(&data)?;
        let table = LookupTable::parse(&data)?;

        Ok(Self {
            data,
            header,
            bbox,
            table,
            mode,
        })
    }

    /// Change how prefixes are mapped to buckets.
    pub fn with_lookup_mode(mut self, mode: LookupMode) -> Self {
        self.mode = mode;
        self
    }

    /// Look up a raw postcode such as `"SW1A1AA"` or `"M1"`.
    ///
    /// The postcode is normalized first. A 2–4 character input is looked up
    /// as an outward-only entry, which needs a version 2 pack.
    ///
    /// # Errors
    ///
    /// - [`PackError::Format`] for malformed input
    /// - [`PackError::IncompatibleFeature`] for an outward-only lookup in a
    ///   version 1 pack
    /// - [`PackError::NotFound`] if the bucket has no matching record
    /// - [`PackError::Truncated`] or [`PackError::CoordinateOverflow`] for a
    ///   corrupt record stream
    pub fn lookup(&self, postcode: &str) -> Result<PostcodeLocation> {
        let postcode = normalize(postcode)?;
        let position = self.lookup_normalized(&postcode)?;
        Ok(PostcodeLocation { postcode, position })
    }

    /// Look up an already-normalized postcode.
    pub fn lookup_normalized(&self, postcode: &NormalizedPostcode) -> Result<Position> {
        let outward_only = postcode.is_outward_only();
        if outward_only && !self.header.supports_outward_only() {
            return Err(PackError::IncompatibleFeature {
                version: self.header.version(),
            });
        }

        let code = postcode.code()?;
        let [c1, c2] = postcode.prefix();
        let bucket = self.table.bucket_for(c1, c2, self.mode)?;

        scan(self.records(), bucket, code, outward_only, &self.bbox)?.ok_or_else(|| {
            PackError::NotFound {
                postcode: postcode.to_string(),
            }
        })
    }

    /// Look up several postcodes, keeping input order.
    pub fn lookup_many<I, S>(&self, postcodes: I) -> Vec<Result<PostcodeLocation>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        postcodes
            .into_iter()
            .map(|p| self.lookup(p.as_ref()))
            .collect()
    }

    /// Iterate over every record in the bucket for prefix `c1`, `c2`.
    pub fn bucket_records(&self, c1: u8, c2: u8) -> Result<RecordScanner<'_>> {
        let bucket = self.table.bucket_for(c1, c2, self.mode)?;
        Ok(RecordScanner::new(self.records(), bucket))
    }

    /// The record stream (everything after the fixed prologue).
    pub fn records(&self) -> &[u8] {
        &self.data[RECORD_STREAM_OFFSET..]
    }

    /// The validated header.
    pub fn header(&self) -> &PackHeader {
        &self.header
    }

    /// File format version.
    pub fn version(&self) -> u32 {
        self.header.version()
    }

    /// When the data was last updated.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.header.last_updated()
    }

    /// The pack's extents.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    /// The decoded prefix table.
    pub fn lookup_table(&self) -> &LookupTable {
        &self.table
    }

    /// The active prefix mapping.
    pub fn lookup_mode(&self) -> LookupMode {
        self.mode
    }

    /// Summary of the pack's metadata.
    pub fn info(&self) -> PackInfo {
        PackInfo {
            version: self.header.version(),
            max_supported_version: MAX_SUPPORTED_VERSION,
            last_updated: self.header.last_updated(),
            bounding_box: self.bbox,
            file_bytes: self.data.len(),
            record_bytes: self.records().len(),
            non_empty_buckets: self.table.non_empty_buckets(),
            supports_outward_only: self.header.supports_outward_only(),
        }
    }
}

/// Builder for opening a [`PostcodePack`] with custom configuration.
///
/// # Example
///
/// ```ignore
/// use nmp::{LookupMode, PostcodePackBuilder};
///
/// let pack = PostcodePackBuilder::new("/data/postcodes.pack")
///     .lookup_mode(LookupMode::Strict)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct PostcodePackBuilder {
    path: PathBuf,
    lookup_mode: LookupMode,
}

impl PostcodePackBuilder {
    /// Create a builder for the pack at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lookup_mode: LookupMode::default(),
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `NMP_PACK` | Path to the pack file | Required |
    /// | `NMP_LOOKUP_MODE` | `compatible` or `strict` | `compatible` |
    ///
    /// # Errors
    ///
    /// Returns an error if `NMP_PACK` is not set or `NMP_LOOKUP_MODE` is not
    /// a known mode.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(ENV_PACK).map_err(|_| {
            PackError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "NMP_PACK environment variable not set",
            ))
        })?;

        let lookup_mode = match std::env::var(ENV_LOOKUP_MODE) {
            Ok(value) => value.parse()?,
            Err(_) => LookupMode::default(),
        };

        Ok(Self {
            path: PathBuf::from(path),
            lookup_mode,
        })
    }

    /// Set the pack path.
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// Set how prefixes are mapped to buckets.
    pub fn lookup_mode(mut self, mode: LookupMode) -> Self {
        self.lookup_mode = mode;
        self
    }

    /// The configured pack path.
    pub fn pack_path(&self) -> &Path {
        &self.path
    }

    /// Open and validate the pack.
    pub fn build(self) -> Result<PostcodePack> {
        PostcodePack::from_file_with_mode(&self.path, self.lookup_mode)
    }
}
