//! GeoJSON output for lookup results.
//!
//! Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use nmp::PostcodePack;
//! use nmp::geojson::lookup_features;
//!
//! let pack = PostcodePack::from_file("postcodes.pack")?;
//! let (collection, failures) = lookup_features(&pack, ["SW1A1AA", "M1"]);
//! println!("{}", collection);
//! // {"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Point",...
//! ```

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoJsonValue};

use crate::error::{PackError, Result};
use crate::pack::{PostcodeLocation, PostcodePack};

/// Convert a lookup result into a Point feature.
///
/// The geometry is `[longitude, latitude]`, which is GeoJSON's own axis order.
/// Properties carry the normalized postcode and its display form.
pub fn to_feature(location: &PostcodeLocation) -> Feature {
    let geometry = Geometry::new(GeoJsonValue::Point(vec![
        location.position.longitude,
        location.position.latitude,
    ]));

    let mut properties = JsonObject::new();
    properties.insert(
        "postcode".to_string(),
        location.postcode.as_str().to_string().into(),
    );
    properties.insert(
        "display".to_string(),
        location.postcode.display_form().into(),
    );
    properties.insert(
        "outward_only".to_string(),
        location.postcode.is_outward_only().into(),
    );

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Collect lookup results into a feature collection, preserving order.
pub fn to_feature_collection<'a, I>(locations: I) -> FeatureCollection
where
    I: IntoIterator<Item = &'a PostcodeLocation>,
{
    FeatureCollection {
        bbox: None,
        features: locations.into_iter().map(to_feature).collect(),
        foreign_members: None,
    }
}

/// Look up one postcode and return it as a feature.
///
/// # Errors
///
/// Returns the lookup error unchanged.
pub fn lookup_feature(pack: &PostcodePack, postcode: &str) -> Result<Feature> {
    pack.lookup(postcode).map(|location| to_feature(&location))
}

/// Look up several postcodes.
///
/// Found postcodes become features in input order; failures are returned
/// alongside with the input that caused them.
pub fn lookup_features<I, S>(
    pack: &PostcodePack,
    postcodes: I,
) -> (FeatureCollection, Vec<(String, PackError)>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut found = Vec::new();
    let mut failures = Vec::new();

    for postcode in postcodes {
        let postcode = postcode.as_ref();
        match pack.lookup(postcode) {
            Ok(location) => found.push(location),
            Err(e) => failures.push((postcode.to_string(), e)),
        }
    }

    (to_feature_collection(&found), failures)
}
