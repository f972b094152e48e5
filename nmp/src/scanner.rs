//! Delta-encoded record stream decoding.
//!
//! # Record Layout
//!
//! Each record starts with a format byte `f`:
//!
//! | Bits | Meaning |
//! |------|---------|
//! | `0x80` | code is a delta: `last_code + (f & 0x3f) + 1`, no further code bytes |
//! | `0x40` | coordinates are deltas: two `i8` added to the previous `(lat, long)` |
//! | `0x3f` | delta step, or `0x20` on an absolute code to flag an outward-only record |
//!
//! An absolute code is 3 little-endian bytes. Absolute coordinates are two
//! little-endian `u16` values, latitude first.
//!
//! Running state starts at zero for every bucket.

use crate::bbox::{BoundingBox, Position};
use crate::error::{PackError, Result};
use crate::format::{read_i8, read_u16, read_u24, read_u8};
use crate::lookup_table::Bucket;

const CODE_IS_DELTA: u8 = 0x80;
const COORDS_ARE_DELTA: u8 = 0x40;
const LOW_BITS: u8 = 0x3f;
const OUTWARD_ONLY_MARKER: u8 = 0x20;

/// One decoded record.
///
/// Coordinates are kept as reconstructed; a well-formed pack keeps them in
/// `0..=65535`. Use [`Record::normalized`] to get checked `u16` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// Packed postcode code.
    pub code: u32,
    /// Normalized latitude.
    pub lat: i32,
    /// Normalized longitude.
    pub long: i32,
    /// The record describes an outward code with no inward part.
    pub outward_only: bool,
}

impl Record {
    /// Normalized `(lat, long)` as `u16`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::CoordinateOverflow`] if delta decoding left the
    /// `u16` range.
    pub fn normalized(&self) -> Result<(u16, u16)> {
        match (u16::try_from(self.lat), u16::try_from(self.long)) {
            (Ok(lat), Ok(long)) => Ok((lat, long)),
            _ => Err(PackError::CoordinateOverflow {
                lat: self.lat,
                long: self.long,
            }),
        }
    }

    /// Position in degrees within `bbox`.
    pub fn position(&self, bbox: &BoundingBox) -> Result<Position> {
        let (lat, long) = self.normalized()?;
        Ok(bbox.denormalize(lat, long))
    }
}

/// Values carried from one record to the next within a bucket.
#[derive(Debug, Clone, Copy, Default)]
struct ScanState {
    last_code: u32,
    last_lat: i32,
    last_long: i32,
}

/// Decode the record at `pos`, returning it and the offset of the next one.
fn decode_record(stream: &[u8], mut pos: usize, state: &ScanState) -> Result<(Record, usize)> {
    let format = read_u8(stream, pos)?;
    pos += 1;

    let mut outward_only = false;
    let code = if format & CODE_IS_DELTA != 0 {
        state
            .last_code
            .wrapping_add((format & LOW_BITS) as u32 + 1)
    } else {
        outward_only = format & LOW_BITS == OUTWARD_ONLY_MARKER;
        let code = read_u24(stream, pos)?;
        pos += 3;
        code
    };

    let (lat, long) = if format & COORDS_ARE_DELTA != 0 {
        let dlat = read_i8(stream, pos)?;
        let dlong = read_i8(stream, pos + 1)?;
        pos += 2;
        let overflow = || PackError::CoordinateOverflow {
            lat: state.last_lat,
            long: state.last_long,
        };
        (
            state.last_lat.checked_add(dlat as i32).ok_or_else(overflow)?,
            state.last_long.checked_add(dlong as i32).ok_or_else(overflow)?,
        )
    } else {
        let lat = read_u16(stream, pos)?;
        let long = read_u16(stream, pos + 2)?;
        pos += 4;
        (lat as i32, long as i32)
    };

    let record = Record {
        code,
        lat,
        long,
        outward_only,
    };
    Ok((record, pos))
}

/// Iterator over the records of one bucket.
///
/// Yields `Err` once and then stops if a record runs past the end of the
/// stream.
///
/// # Example
///
/// ```ignore
/// let scanner = RecordScanner::new(stream, bucket);
/// for record in scanner {
///     let record = record?;
///     println!("{} {:?}", record.code, record.normalized()?);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RecordScanner<'a> {
    stream: &'a [u8],
    pos: usize,
    end: usize,
    state: ScanState,
    failed: bool,
}

impl<'a> RecordScanner<'a> {
    /// Scan `bucket` within `stream`, the bytes following the fixed prologue.
    pub fn new(stream: &'a [u8], bucket: Bucket) -> Self {
        Self {
            stream,
            pos: bucket.start as usize,
            end: bucket.end as usize,
            state: ScanState::default(),
            failed: false,
        }
    }

    /// Find the first record with `code` whose outward-only flag equals
    /// `want_outward_only`.
    ///
    /// Every record is examined in order; codes are not assumed to be sorted.
    pub fn find_code(self, code: u32, want_outward_only: bool) -> Result<Option<Record>> {
        for record in self {
            let record = record?;
            if record.outward_only == want_outward_only && record.code == code {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

impl Iterator for RecordScanner<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.end {
            return None;
        }
        match decode_record(self.stream, self.pos, &self.state) {
            Ok((record, next)) => {
                self.pos = next;
                self.state = ScanState {
                    last_code: record.code,
                    last_lat: record.lat,
                    last_long: record.long,
                };
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Scan one bucket for `code` and denormalize the match.
///
/// Returns `Ok(None)` when the bucket is exhausted without a match.
pub fn scan(
    stream: &[u8],
    bucket: Bucket,
    code: u32,
    want_outward_only: bool,
    bbox: &BoundingBox,
) -> Result<Option<Position>> {
    RecordScanner::new(stream, bucket)
        .find_code(code, want_outward_only)?
        .map(|record| record.position(bbox))
        .transpose()
}
