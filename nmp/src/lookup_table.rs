//! Two-character prefix lookup table.
//!
//! The table holds one u32 start offset per prefix bucket, 26 first characters
//! (`A`–`Z`) by 36 second characters (`0`–`9` then `A`–`Z`). A bucket ends
//! where the next one starts; the field after the table closes the last one.
//! Offsets are relative to the start of the record stream.

use std::ops::Range;
use std::str::FromStr;

use crate::error::{PackError, Result};
use crate::format::{read_u32, LUT_ENTRIES, LUT_OFFSET, LUT_SECOND_CHARS, LUT_STRIDE};

/// How a postcode prefix is turned into a table index.
///
/// The packed code reserves a 37th value (space) for the 3rd and 4th
/// characters, but the table only has 36 slots per first character and no slot
/// for a space in the 2nd position. [`LookupMode::Compatible`] keeps the
/// arithmetic existing packs were written against, so a prefix such as `"B "`
/// lands in the `AK` bucket. [`LookupMode::Strict`] rejects such prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMode {
    /// `(c1 - 'A') * 36 + idx(c2)` computed on raw character values; only
    /// indices outside the table are rejected.
    #[default]
    Compatible,
    /// `c1` must be `A`–`Z` and `c2` must be `0`–`9` or `A`–`Z`.
    Strict,
}

impl FromStr for LookupMode {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "compatible" => Ok(LookupMode::Compatible),
            "strict" => Ok(LookupMode::Strict),
            _ => Err(PackError::format(s, "lookup mode must be compatible or strict")),
        }
    }
}

/// Byte range of one bucket, relative to the record stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// Offset of the first record.
    pub start: u32,
    /// Offset one past the last record.
    pub end: u32,
}

impl Bucket {
    /// `true` if the bucket holds no records.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The bucket as a `usize` range.
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// Decoded lookup table.
#[derive(Debug, Clone)]
pub struct LookupTable {
    /// `LUT_ENTRIES + 1` offsets; slot `i + 1` closes bucket `i`.
    offsets: Vec<u32>,
}

impl LookupTable {
    /// Read the table (and its closing offset) from a full pack buffer.
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self> {
        let offsets = (0..=LUT_ENTRIES)
            .map(|i| read_u32(bytes, LUT_OFFSET + i * LUT_STRIDE))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { offsets })
    }

    /// Build a table from its `LUT_ENTRIES + 1` raw offsets.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Truncated`] if `offsets` has the wrong length.
    pub fn from_offsets(offsets: Vec<u32>) -> Result<Self> {
        if offsets.len() != LUT_ENTRIES + 1 {
            return Err(PackError::Truncated {
                offset: LUT_OFFSET,
                needed: (LUT_ENTRIES + 1) * LUT_STRIDE,
                len: offsets.len() * LUT_STRIDE,
            });
        }
        Ok(Self { offsets })
    }

    /// Table index for a two-character prefix.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Format`] when the prefix has no slot under `mode`.
    ///
    /// # Examples
    ///
    /// ```
    /// use nmp::{LookupMode, LookupTable};
    ///
    /// assert_eq!(LookupTable::index_for(b'A', b'0', LookupMode::Strict).unwrap(), 0);
    /// assert_eq!(LookupTable::index_for(b'B', b'A', LookupMode::Strict).unwrap(), 46);
    /// assert_eq!(LookupTable::index_for(b'Z', b'Z', LookupMode::Strict).unwrap(), 935);
    /// ```
    pub fn index_for(c1: u8, c2: u8, mode: LookupMode) -> Result<usize> {
        let prefix = || String::from_utf8_lossy(&[c1, c2]).into_owned();

        if mode == LookupMode::Strict {
            if !c1.is_ascii_uppercase() {
                return Err(PackError::format(prefix(), "1st character must be A-Z"));
            }
            if !(c2.is_ascii_uppercase() || c2.is_ascii_digit()) {
                return Err(PackError::format(prefix(), "2nd character must be 0-9 or A-Z"));
            }
        }

        let c2_index = if c2 < b'A' {
            c2 as i64 - b'0' as i64
        } else {
            10 + c2 as i64 - b'A' as i64
        };
        let index = (c1 as i64 - b'A' as i64) * LUT_SECOND_CHARS as i64 + c2_index;

        if !(0..LUT_ENTRIES as i64).contains(&index) {
            return Err(PackError::format(prefix(), "prefix has no lookup table slot"));
        }
        Ok(index as usize)
    }

    /// The bucket at a table index.
    pub fn bucket(&self, index: usize) -> Option<Bucket> {
        let start = *self.offsets.get(index)?;
        let end = *self.offsets.get(index + 1)?;
        (index < LUT_ENTRIES).then_some(Bucket { start, end })
    }

    /// The bucket holding postcodes that start with `c1`, `c2`.
    pub fn bucket_for(&self, c1: u8, c2: u8, mode: LookupMode) -> Result<Bucket> {
        let index = Self::index_for(c1, c2, mode)?;
        // index_for only returns indices inside the table
        Ok(Bucket {
            start: self.offsets[index],
            end: self.offsets[index + 1],
        })
    }

    /// The prefix that owns a table index.
    pub fn prefix_of(index: usize) -> Option<[u8; 2]> {
        if index >= LUT_ENTRIES {
            return None;
        }
        let first = b'A' + (index / LUT_SECOND_CHARS) as u8;
        let second = match (index % LUT_SECOND_CHARS) as u8 {
            n @ 0..=9 => b'0' + n,
            n => b'A' + n - 10,
        };
        Some([first, second])
    }

    /// Iterate over `(prefix, bucket)` for every table slot.
    pub fn iter(&self) -> impl Iterator<Item = ([u8; 2], Bucket)> + '_ {
        (0..LUT_ENTRIES).filter_map(move |i| Some((Self::prefix_of(i)?, self.bucket(i)?)))
    }

    /// Number of buckets holding at least one record.
    pub fn non_empty_buckets(&self) -> usize {
        self.iter().filter(|(_, b)| !b.is_empty()).count()
    }
}
