//! Error types for the NMP library.

use thiserror::Error;

/// Errors that can occur when opening or querying a postcode pack.
#[derive(Error, Debug)]
pub enum PackError {
    /// IO error when reading the pack file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The pack was written by a newer format version than this library reads.
    #[error(
        "Postcode data file uses format version {version}. \
         This library only supports data formats up to {max}"
    )]
    UnsupportedVersion { version: u32, max: u32 },

    /// The magic tag at the start of the file is not `UKPP`.
    #[error("Postcode data file is not using a known format (magic {magic:02x?})")]
    UnrecognizedFormat { magic: [u8; 4] },

    /// Outward-only lookups need a version 2 pack.
    #[error("Data file format version {version} does not support this type of postcode")]
    IncompatibleFeature { version: u32 },

    /// A postcode or query argument failed validation.
    #[error("Format not recognised: {input:?} ({reason})")]
    Format { input: String, reason: &'static str },

    /// The pack's extents are reversed or not finite.
    #[error("Invalid bounding box: long {min_long}..{max_long}, lat {min_lat}..{max_lat}")]
    InvalidBoundingBox {
        min_long: f64,
        max_long: f64,
        min_lat: f64,
        max_lat: f64,
    },

    /// A well-formed postcode has no record in its bucket.
    #[error("Postcode not found: {postcode:?}")]
    NotFound { postcode: String },

    /// A read ran past the end of the buffer.
    #[error("Truncated pack: needed {needed} bytes at offset {offset}, buffer is {len} bytes")]
    Truncated {
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// Delta decoding produced a normalized coordinate outside 0..=65535.
    #[error("Corrupt record stream: normalized coordinate ({lat}, {long}) out of range")]
    CoordinateOverflow { lat: i32, long: i32 },
}

impl PackError {
    /// Shorthand for a [`PackError::Format`] error.
    pub(crate) fn format(input: impl Into<String>, reason: &'static str) -> Self {
        PackError::Format {
            input: input.into(),
            reason,
        }
    }

    /// Returns `true` for errors caused by the caller's query rather than the pack.
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            PackError::Format { .. }
                | PackError::NotFound { .. }
                | PackError::IncompatibleFeature { .. }
        )
    }
}

/// Result type alias using [`PackError`].
pub type Result<T> = std::result::Result<T, PackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PackError::UnsupportedVersion { version: 99, max: 2 };
        assert!(err.to_string().contains("99"));
        assert!(err.to_string().contains("up to 2"));

        let err = PackError::NotFound {
            postcode: "SW1A1AA".to_string(),
        };
        assert!(err.to_string().contains("SW1A1AA"));

        let err = PackError::Truncated {
            offset: 3796,
            needed: 4,
            len: 3798,
        };
        assert!(err.to_string().contains("3796"));
    }

    #[test]
    fn test_query_error_classification() {
        assert!(PackError::format("!!", "bad characters").is_query_error());
        assert!(PackError::IncompatibleFeature { version: 1 }.is_query_error());
        assert!(!PackError::UnrecognizedFormat { magic: *b"ABCD" }.is_query_error());
    }
}
