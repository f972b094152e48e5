//! Great-circle distance and distance ordering.
//!
//! Distances use the haversine formula on a sphere of radius 6371 km, an
//! approximation of the geodesic distance good to about 0.5%.
//!
//! Points here are latitude first ([`LatLon`]), the opposite of the
//! [`Position`] returned by lookups.

use crate::bbox::Position;
use crate::error::{PackError, Result};

/// Mean Earth radius used for distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point in degrees, latitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

impl LatLon {
    /// Create a point from latitude and longitude.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<Position> for LatLon {
    fn from(p: Position) -> Self {
        Self {
            lat: p.latitude,
            lon: p.longitude,
        }
    }
}

impl From<(f64, f64)> for LatLon {
    /// Interprets the tuple as `(lat, lon)`.
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl TryFrom<&[f64]> for LatLon {
    type Error = PackError;

    /// Accepts exactly two finite numbers, `[lat, lon]`.
    fn try_from(values: &[f64]) -> Result<Self> {
        match values {
            [lat, lon] if lat.is_finite() && lon.is_finite() => Ok(Self::new(*lat, *lon)),
            _ => Err(PackError::format(
                format!("{:?}", values),
                "point should be a pair of numbers: [lat, lon]",
            )),
        }
    }
}

/// Haversine distance in kilometers.
///
/// # Examples
///
/// ```
/// use nmp::{distance, LatLon};
///
/// let london = LatLon::new(51.5074, -0.1278);
/// let paris = LatLon::new(48.8566, 2.3522);
/// let km = distance(london, paris);
/// assert!((km - 343.5).abs() < 1.0);
/// ```
pub fn distance(a: LatLon, b: LatLon) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // rounding can push h just past 1 for near-antipodal points
    let h = h.min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Sort points by distance from `reference`, nearest first.
///
/// The sort is stable: points at equal distance keep their input order.
pub fn sort_by_distance<P>(points: &[P], reference: LatLon) -> Vec<P>
where
    P: Copy + Into<LatLon>,
{
    sort_by_distance_with_km(points, reference)
        .into_iter()
        .map(|(p, _)| p)
        .collect()
}

/// Like [`sort_by_distance`], returning each point with its distance in km.
pub fn sort_by_distance_with_km<P>(points: &[P], reference: LatLon) -> Vec<(P, f64)>
where
    P: Copy + Into<LatLon>,
{
    let mut ranked: Vec<(P, f64)> = points
        .iter()
        .map(|&p| (p, distance(p.into(), reference)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}

/// Sort raw `[lat, lon]` slices, validating the reference point's shape.
///
/// # Errors
///
/// Returns [`PackError::Format`] if `reference` or any point is not a pair of
/// finite numbers.
pub fn sort_slices_by_distance(points: &[Vec<f64>], reference: &[f64]) -> Result<Vec<LatLon>> {
    let reference = LatLon::try_from(reference)?;
    let points = points
        .iter()
        .map(|p| LatLon::try_from(p.as_slice()))
        .collect::<Result<Vec<_>>>()?;
    Ok(sort_by_distance(&points, reference))
}
