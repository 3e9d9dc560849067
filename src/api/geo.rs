//! Geo-signal extraction from request headers.
//!
//! An edge collaborator in front of this service resolves the visitor's
//! location and forwards it as headers. The headers are trusted but not
//! assumed well-formed: a present-but-unparseable value is a client error,
//! while an absent country degrades to the unknown marker, which matches
//! only wildcard rules and the default destination.

use axum::http::HeaderMap;
use serde_json::json;

use crate::error::AppError;

pub const GEO_COUNTRY_HEADER: &str = "x-geo-country";
pub const GEO_LATITUDE_HEADER: &str = "x-geo-latitude";
pub const GEO_LONGITUDE_HEADER: &str = "x-geo-longitude";

/// Country used when the edge did not resolve one.
pub const UNKNOWN_COUNTRY: &str = "XX";

/// Parsed geo signal for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoSignal {
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Extracts the geo signal from request headers.
///
/// # Errors
///
/// Returns [`AppError::Validation`] when a geo header is present but
/// malformed: a country that is not two ASCII letters, or a coordinate that
/// is not a decimal number within range.
pub fn geo_signal_from_headers(headers: &HeaderMap) -> Result<GeoSignal, AppError> {
    let country = match headers.get(GEO_COUNTRY_HEADER) {
        None => UNKNOWN_COUNTRY.to_string(),
        Some(value) => {
            let value = value.to_str().map_err(|_| {
                AppError::bad_request(
                    "Malformed geo country header",
                    json!({ "header": GEO_COUNTRY_HEADER }),
                )
            })?;

            if value.len() == 2 && value.bytes().all(|b| b.is_ascii_alphabetic()) {
                value.to_ascii_uppercase()
            } else {
                return Err(AppError::bad_request(
                    "Malformed geo country header",
                    json!({ "header": GEO_COUNTRY_HEADER, "value": value }),
                ));
            }
        }
    };

    let latitude = parse_coordinate(headers, GEO_LATITUDE_HEADER, 90.0)?;
    let longitude = parse_coordinate(headers, GEO_LONGITUDE_HEADER, 180.0)?;

    Ok(GeoSignal {
        country,
        latitude,
        longitude,
    })
}

fn parse_coordinate(
    headers: &HeaderMap,
    name: &'static str,
    bound: f64,
) -> Result<Option<f64>, AppError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };

    let parsed = value
        .to_str()
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && v.abs() <= bound);

    match parsed {
        Some(v) => Ok(Some(v)),
        None => Err(AppError::bad_request(
            "Malformed geo coordinate header",
            json!({ "header": name }),
        )),
    }
}
