use anyhow::{Context, Result};
use serde::Serialize;

use super::{open_pack, PackOptions};

#[derive(Serialize)]
struct LookupResponse<'a> {
    postcode: &'a str,
    display: String,
    longitude: f64,
    latitude: f64,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    outward_only: bool,
}

pub fn run(options: &PackOptions, postcode: &str, json: bool, geojson: bool) -> Result<()> {
    let pack = open_pack(options)?;

    let location = pack
        .lookup(postcode)
        .with_context(|| format!("Failed to get postal code: {}", postcode))?;

    if geojson {
        let feature = nmp::geojson::to_feature(&location);
        println!("{}", serde_json::to_string(&feature)?);
    } else if json {
        let response = LookupResponse {
            postcode: location.postcode.as_str(),
            display: location.postcode.display_form(),
            longitude: location.position.longitude,
            latitude: location.position.latitude,
            outward_only: location.postcode.is_outward_only(),
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        let (lon, lat) = location.position.to_tuple();
        println!("{} ({}, {})", location.postcode, lon, lat);
    }

    Ok(())
}
