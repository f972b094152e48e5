//! Pack file layout constants and bounds-checked little-endian reads.
//!
//! # File Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | magic `"UKPP"` |
//! | 4 | 4 | version (u32) |
//! | 8 | 8 | two u32 timestamp components, summed |
//! | 16 | 32 | bounding box: minLong, maxLong, minLat, maxLat (4 × f64) |
//! | 48 | 3744 | lookup table: 936 × u32 bucket start offsets |
//! | 3792 | 4 | end offset of the last bucket |
//! | 3796+ | variable | record stream |
//!
//! All integers are little-endian.

use crate::error::{PackError, Result};

/// Magic tag at offset 0.
pub const MAGIC: [u8; 4] = *b"UKPP";

/// Highest format version this library understands.
pub const MAX_SUPPORTED_VERSION: u32 = 2;

/// First format version carrying outward-only records.
pub const OUTWARD_ONLY_MIN_VERSION: u32 = 2;

/// Size of the header (magic, version, timestamp pair).
pub const HEADER_LEN: usize = 16;

/// Offset of the bounding box.
pub const BBOX_OFFSET: usize = HEADER_LEN;

/// Four f64 extents.
pub const BBOX_LEN: usize = 4 * 8;

/// Number of first-character buckets (`A`–`Z`).
pub const LUT_FIRST_CHARS: usize = 26;

/// Number of second-character buckets per first character (`0`–`9`, `A`–`Z`).
pub const LUT_SECOND_CHARS: usize = 36;

/// Total lookup-table entries.
pub const LUT_ENTRIES: usize = LUT_FIRST_CHARS * LUT_SECOND_CHARS; // 936

/// Offset of the lookup table.
pub const LUT_OFFSET: usize = BBOX_OFFSET + BBOX_LEN; // 48

/// Distance between consecutive table slots. A bucket's end offset is the
/// start offset stored in the following slot.
pub const LUT_STRIDE: usize = 4;

/// Size of the lookup table in bytes.
pub const LUT_LEN: usize = LUT_ENTRIES * LUT_STRIDE; // 3744

/// Size of the offset field between table and records. It closes the last
/// bucket and is otherwise skipped.
pub const RESERVED_LEN: usize = 4;

/// Offset of the first record byte. Bucket offsets are relative to this.
pub const RECORD_STREAM_OFFSET: usize = LUT_OFFSET + LUT_LEN + RESERVED_LEN; // 3796

/// Normalized coordinates are fractions of this value.
pub const NORMALIZED_MAX: f64 = 65535.0;

/// Return `len` bytes at `offset`, or [`PackError::Truncated`].
#[inline]
pub(crate) fn bytes_at(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(PackError::Truncated {
            offset,
            needed: len,
            len: buf.len(),
        })
}

#[inline]
pub(crate) fn read_u8(buf: &[u8], offset: usize) -> Result<u8> {
    Ok(bytes_at(buf, offset, 1)?[0])
}

#[inline]
pub(crate) fn read_i8(buf: &[u8], offset: usize) -> Result<i8> {
    Ok(read_u8(buf, offset)? as i8)
}

#[inline]
pub(crate) fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
    let b = bytes_at(buf, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

#[inline]
pub(crate) fn read_u24(buf: &[u8], offset: usize) -> Result<u32> {
    let b = bytes_at(buf, offset, 3)?;
    Ok(((b[2] as u32) << 16) | ((b[1] as u32) << 8) | b[0] as u32)
}

#[inline]
pub(crate) fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
    let b = bytes_at(buf, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[inline]
pub(crate) fn read_f64(buf: &[u8], offset: usize) -> Result<f64> {
    let b = bytes_at(buf, offset, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(b);
    Ok(f64::from_le_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        assert_eq!(LUT_ENTRIES, 936);
        assert_eq!(LUT_OFFSET, 48);
        assert_eq!(LUT_LEN, 3744);
        assert_eq!(RECORD_STREAM_OFFSET, 3796);
    }

    #[test]
    fn test_reads_little_endian() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0xff];
        assert_eq!(read_u8(&buf, 0).unwrap(), 1);
        assert_eq!(read_u16(&buf, 0).unwrap(), 0x0201);
        assert_eq!(read_u24(&buf, 0).unwrap(), 0x030201);
        assert_eq!(read_u32(&buf, 0).unwrap(), 0x04030201);
        assert_eq!(read_i8(&buf, 4).unwrap(), -1);
    }

    #[test]
    fn test_read_f64() {
        let buf = (-1.5f64).to_le_bytes();
        assert_eq!(read_f64(&buf, 0).unwrap(), -1.5);
    }

    #[test]
    fn test_out_of_bounds_is_truncated() {
        let buf = [0u8; 3];
        match read_u32(&buf, 1) {
            Err(PackError::Truncated {
                offset,
                needed,
                len,
            }) => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
                assert_eq!(len, 3);
            }
            other => panic!("Expected Truncated error, got {:?}", other),
        }
        assert!(read_u8(&buf, usize::MAX).is_err());
    }
}
