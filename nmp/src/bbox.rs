//! Pack extents and denormalization of stored coordinates.
//!
//! Every record stores its position as a pair of `u16` fractions of the pack's
//! [`BoundingBox`]: `0` is the minimum edge and `65535` the maximum edge.

use crate::error::{PackError, Result};
use crate::format::{read_f64, BBOX_OFFSET, NORMALIZED_MAX};

/// A postcode position in degrees, longitude first.
///
/// This is the axis order returned by lookups. Distance calculations take
/// [`LatLon`](crate::LatLon) instead; use `LatLon::from(position)` to convert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
}

impl Position {
    /// Create a position from longitude and latitude.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// `(longitude, latitude)` tuple.
    pub fn to_tuple(self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }
}

/// Geographic extent the whole pack is normalized against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Western boundary longitude.
    pub min_long: f64,
    /// Eastern boundary longitude.
    pub max_long: f64,
    /// Southern boundary latitude.
    pub min_lat: f64,
    /// Northern boundary latitude.
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a bounding box, checking that each axis is finite and ordered.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidBoundingBox`] if `min > max` on either axis
    /// or any extent is NaN or infinite.
    pub fn new(min_long: f64, max_long: f64, min_lat: f64, max_lat: f64) -> Result<Self> {
        let valid = [min_long, max_long, min_lat, max_lat]
            .iter()
            .all(|v| v.is_finite())
            && min_long <= max_long
            && min_lat <= max_lat;

        if !valid {
            return Err(PackError::InvalidBoundingBox {
                min_long,
                max_long,
                min_lat,
                max_lat,
            });
        }

        Ok(Self {
            min_long,
            max_long,
            min_lat,
            max_lat,
        })
    }

    /// Read the four extents that follow the header.
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self> {
        Self::new(
            read_f64(bytes, BBOX_OFFSET)?,
            read_f64(bytes, BBOX_OFFSET + 8)?,
            read_f64(bytes, BBOX_OFFSET + 16)?,
            read_f64(bytes, BBOX_OFFSET + 24)?,
        )
    }

    /// Convert normalized `(lat, long)` fractions to degrees.
    ///
    /// The result is longitude first.
    ///
    /// # Example
    ///
    /// ```
    /// use nmp::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(-8.0, 2.0, 49.0, 61.0).unwrap();
    /// let pos = bbox.denormalize(0, 65535);
    /// assert_eq!(pos.longitude, 2.0);
    /// assert_eq!(pos.latitude, 49.0);
    /// ```
    pub fn denormalize(&self, lat: u16, long: u16) -> Position {
        let latitude =
            self.min_lat + (self.max_lat - self.min_lat) * (lat as f64 / NORMALIZED_MAX);
        let longitude =
            self.min_long + (self.max_long - self.min_long) * (long as f64 / NORMALIZED_MAX);
        Position {
            longitude,
            latitude,
        }
    }

    /// Check whether a position lies inside this box (edges included).
    pub fn contains(&self, position: Position) -> bool {
        (self.min_long..=self.max_long).contains(&position.longitude)
            && (self.min_lat..=self.max_lat).contains(&position.latitude)
    }
}
