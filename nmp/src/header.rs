//! Pack header parsing and validation.

use chrono::{DateTime, Utc};

use crate::error::{PackError, Result};
use crate::format::{read_u32, HEADER_LEN, MAGIC, MAX_SUPPORTED_VERSION, OUTWARD_ONLY_MIN_VERSION};

/// The validated 16-byte header at the start of every pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackHeader {
    magic: [u8; 4],
    version: u32,
    /// Seconds since the Unix epoch (sum of the two header timestamp fields).
    timestamp: u64,
}

impl PackHeader {
    /// Parse and validate the header from the start of `bytes`.
    ///
    /// The version is checked before the magic tag, so a file that is both
    /// too new and mislabelled reports [`PackError::UnsupportedVersion`].
    ///
    /// # Errors
    ///
    /// - [`PackError::Truncated`] if fewer than 16 bytes are available
    /// - [`PackError::UnsupportedVersion`] if the version is above 2
    /// - [`PackError::UnrecognizedFormat`] if the magic tag is not `UKPP`
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(PackError::Truncated {
                offset: 0,
                needed: HEADER_LEN,
                len: bytes.len(),
            });
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        let version = read_u32(bytes, 4)?;
        let timestamp = read_u32(bytes, 8)? as u64 + read_u32(bytes, 12)? as u64;

        if version > MAX_SUPPORTED_VERSION {
            return Err(PackError::UnsupportedVersion {
                version,
                max: MAX_SUPPORTED_VERSION,
            });
        }
        if magic != MAGIC {
            return Err(PackError::UnrecognizedFormat { magic });
        }

        Ok(Self {
            magic,
            version,
            timestamp,
        })
    }

    /// The 4-byte magic tag (always `UKPP` once parsed).
    pub fn magic(&self) -> [u8; 4] {
        self.magic
    }

    /// File format version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Raw last-updated value in seconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// When the pack data was last updated.
    pub fn last_updated(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.timestamp as i64, 0).unwrap_or_default()
    }

    /// Whether this pack carries outward-only records.
    pub fn supports_outward_only(&self) -> bool {
        self.version >= OUTWARD_ONLY_MIN_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(magic: &[u8; 4], version: u32, t1: u32, t2: u32) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        bytes.extend_from_slice(magic);
        bytes.extend_from_slice(&version.to_le_bytes());
        bytes.extend_from_slice(&t1.to_le_bytes());
        bytes.extend_from_slice(&t2.to_le_bytes());
        bytes
    }

    #[test]
    fn test_parse_valid_header() {
        let header = PackHeader::parse(&header_bytes(b"UKPP", 2, 1_700_000_000, 86_400)).unwrap();
        assert_eq!(header.magic(), *b"UKPP");
        assert_eq!(header.version(), 2);
        assert_eq!(header.timestamp(), 1_700_086_400);
        assert!(header.supports_outward_only());
    }

    #[test]
    fn test_timestamp_sum_does_not_overflow() {
        let header = PackHeader::parse(&header_bytes(b"UKPP", 1, u32::MAX, u32::MAX)).unwrap();
        assert_eq!(header.timestamp(), 2 * u32::MAX as u64);
        assert!(header.last_updated().timestamp() > 0);
    }

    #[test]
    fn test_last_updated_date() {
        // 2023-11-14T22:13:20Z
        let header = PackHeader::parse(&header_bytes(b"UKPP", 1, 1_700_000_000, 0)).unwrap();
        assert_eq!(
            header.last_updated().format("%a %b %d %Y").to_string(),
            "Tue Nov 14 2023"
        );
        assert!(!header.supports_outward_only());
    }

    #[test]
    fn test_bad_magic() {
        let result = PackHeader::parse(&header_bytes(b"XXXX", 1, 0, 0));
        assert!(matches!(
            result,
            Err(PackError::UnrecognizedFormat { magic }) if magic == *b"XXXX"
        ));
    }

    #[test]
    fn test_version_too_new() {
        let result = PackHeader::parse(&header_bytes(b"UKPP", 3, 0, 0));
        assert!(matches!(
            result,
            Err(PackError::UnsupportedVersion { version: 3, max: 2 })
        ));
    }

    #[test]
    fn test_version_checked_before_magic() {
        let result = PackHeader::parse(&header_bytes(b"NOPE", 99, 0, 0));
        assert!(matches!(
            result,
            Err(PackError::UnsupportedVersion { version: 99, .. })
        ));
    }

    #[test]
    fn test_short_header() {
        let result = PackHeader::parse(b"UKPP");
        assert!(matches!(
            result,
            Err(PackError::Truncated { needed: 16, len: 4, .. })
        ));
    }
}
