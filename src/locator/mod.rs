//! Maidenhead (QTH) grid locators.
//!
//! A locator names a nested grid cell: a 20°×10° field (`AA`..`RR`), a 2°×1°
//! square (`00`..`99`) and optionally a 5'×2.5' subsquare (`aa`..`xx`).
//! Decoding always yields the centre of the cell.

mod error;

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::geo::GeoPoint;

pub use error::LocatorError;

const FIELD_LON_DEG: f64 = 20.0;
const FIELD_LAT_DEG: f64 = 10.0;
const SQUARE_LON_DEG: f64 = 2.0;
const SQUARE_LAT_DEG: f64 = 1.0;
const SUBSQUARE_LON_DEG: f64 = SQUARE_LON_DEG / 24.0;
const SUBSQUARE_LAT_DEG: f64 = SQUARE_LAT_DEG / 24.0;

// Keeps lon = 180 / lat = 90 inside the last field instead of spilling into 'S'.
const EDGE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocatorPrecision {
    /// Field + square, e.g. `IM58`.
    Square,
    /// Field + square + subsquare, e.g. `IM58kr`.
    #[default]
    Subsquare,
}

impl LocatorPrecision {
    pub fn chars(&self) -> usize {
        match self {
            LocatorPrecision::Square => 4,
            LocatorPrecision::Subsquare => 6,
        }
    }
}

impl TryFrom<u8> for LocatorPrecision {
    type Error = LocatorError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(LocatorPrecision::Square),
            6 => Ok(LocatorPrecision::Subsquare),
            other => Err(LocatorError::UnsupportedPrecision(other)),
        }
    }
}

impl fmt::Display for LocatorPrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.chars())
    }
}

/// Encode a coordinate as a locator.
///
/// Out-of-range coordinates are a caller bug and are rejected rather than clamped.
pub fn to_locator(
    latitude: f64,
    longitude: f64,
    precision: LocatorPrecision,
) -> Result<String, LocatorError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(LocatorError::LatitudeOutOfRange(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(LocatorError::LongitudeOutOfRange(longitude));
    }

    let lon = (longitude + 180.0).min(360.0 - EDGE_EPSILON);
    let lat = (latitude + 90.0).min(180.0 - EDGE_EPSILON);

    let mut locator = String::with_capacity(precision.chars());
    locator.push(letter(b'A', (lon / FIELD_LON_DEG).floor(), 17));
    locator.push(letter(b'A', (lat / FIELD_LAT_DEG).floor(), 17));
    locator.push(letter(
        b'0',
        ((lon % FIELD_LON_DEG) / SQUARE_LON_DEG).floor(),
        9,
    ));
    locator.push(letter(
        b'0',
        ((lat % FIELD_LAT_DEG) / SQUARE_LAT_DEG).floor(),
        9,
    ));

    if precision == LocatorPrecision::Subsquare {
        locator.push(letter(
            b'a',
            ((lon % SQUARE_LON_DEG) / SUBSQUARE_LON_DEG).floor(),
            23,
        ));
        locator.push(letter(
            b'a',
            ((lat % SQUARE_LAT_DEG) / SUBSQUARE_LAT_DEG).floor(),
            23,
        ));
    }

    Ok(locator)
}

/// Decode a 4 or 6 character locator to the centre of its cell.
///
/// Returns `None` for anything that is not `[A-R]{2}[0-9]{2}([A-X]{2})?`
/// (case-insensitive).
pub fn to_lat_lon(locator: &str) -> Option<GeoPoint> {
    decode(locator).map(|(center, _)| center)
}

pub fn is_valid_locator(locator: &str) -> bool {
    parse(locator).is_some()
}

/// South-west and north-east corners of the cell a locator names.
pub fn locator_bounds(locator: &str) -> Option<(GeoPoint, GeoPoint)> {
    let (center, precision) = decode(locator)?;
    let (half_lon, half_lat) = match precision {
        LocatorPrecision::Subsquare => (SUBSQUARE_LON_DEG / 2.0, SUBSQUARE_LAT_DEG / 2.0),
        LocatorPrecision::Square => (SQUARE_LON_DEG / 2.0, SQUARE_LAT_DEG / 2.0),
    };
    Some((
        GeoPoint::new(center.latitude - half_lat, center.longitude - half_lon),
        GeoPoint::new(center.latitude + half_lat, center.longitude + half_lon),
    ))
}

/// Great-circle distance in km between the centres of two locators.
pub fn distance_between(a: &str, b: &str) -> Option<f64> {
    let from = to_lat_lon(a)?;
    let to = to_lat_lon(b)?;
    Some(from.distance_km(&to))
}

/// Initial bearing in degrees (0 = north) from the centre of `a` to the centre of `b`.
pub fn bearing_between(a: &str, b: &str) -> Option<f64> {
    let from = to_lat_lon(a)?;
    let to = to_lat_lon(b)?;
    Some(from.bearing_deg(&to))
}

/// Cell centre and precision of a well-formed locator.
fn decode(locator: &str) -> Option<(GeoPoint, LocatorPrecision)> {
    let (precision, chars) = parse(locator)?;

    let mut lon = -180.0 + chars[0] as f64 * FIELD_LON_DEG + chars[2] as f64 * SQUARE_LON_DEG;
    let mut lat = -90.0 + chars[1] as f64 * FIELD_LAT_DEG + chars[3] as f64 * SQUARE_LAT_DEG;

    match precision {
        LocatorPrecision::Subsquare => {
            lon += chars[4] as f64 * SUBSQUARE_LON_DEG + SUBSQUARE_LON_DEG / 2.0;
            lat += chars[5] as f64 * SUBSQUARE_LAT_DEG + SUBSQUARE_LAT_DEG / 2.0;
        }
        LocatorPrecision::Square => {
            lon += SQUARE_LON_DEG / 2.0;
            lat += SQUARE_LAT_DEG / 2.0;
        }
    }

    Some((GeoPoint::new(lat, lon), precision))
}

/// Precision and character indices of a well-formed locator, `None` otherwise.
fn parse(locator: &str) -> Option<(LocatorPrecision, Vec<u8>)> {
    let bytes = locator.as_bytes();
    let precision = match bytes.len() {
        4 => LocatorPrecision::Square,
        6 => LocatorPrecision::Subsquare,
        _ => return None,
    };

    let mut indices = Vec::with_capacity(bytes.len());
    for (i, b) in bytes.iter().map(|b| b.to_ascii_uppercase()).enumerate() {
        let index = match i {
            0 | 1 if (b'A'..=b'R').contains(&b) => b - b'A',
            2 | 3 if b.is_ascii_digit() => b - b'0',
            4 | 5 if (b'A'..=b'X').contains(&b) => b - b'A',
            _ => return None,
        };
        indices.push(index);
    }
    Some((precision, indices))
}

fn letter(base: u8, index: f64, max: u8) -> char {
    let index = (index.max(0.0) as u8).min(max);
    (base + index) as char
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn lisbon_encodes_to_im58() {
        let locator = to_locator(38.7223, -9.1393, LocatorPrecision::Subsquare).unwrap();
        assert_eq!(locator, "IM58kr");
        let square = to_locator(38.7223, -9.1393, LocatorPrecision::Square).unwrap();
        assert_eq!(square, "IM58");
    }

    #[test]
    fn decode_returns_cell_center() {
        let center = to_lat_lon("IM58").unwrap();
        assert_abs_diff_eq!(center.latitude, 38.5, epsilon = 1e-9);
        assert_abs_diff_eq!(center.longitude, -9.0, epsilon = 1e-9);

        let sub = to_lat_lon("IM58kr").unwrap();
        assert_abs_diff_eq!(sub.latitude, 38.0 + 17.5 / 24.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sub.longitude, -10.0 + 10.5 / 12.0, epsilon = 1e-9);
    }

    #[test]
    fn decode_is_case_insensitive() {
        assert_eq!(to_lat_lon("im58KR"), to_lat_lon("IM58kr"));
    }

    #[test]
    fn rejects_malformed_locators() {
        for bad in ["", "AA0", "11AABB", "ZZ99", "IM5", "IM58k", "IM58kry", "IM58yz", "I M58"] {
            assert!(to_lat_lon(bad).is_none(), "{bad} should be rejected");
            assert!(!is_valid_locator(bad));
        }
        assert!(is_valid_locator("IM58kr"));
        assert!(is_valid_locator("RR99xx"));
    }

    #[test]
    fn four_char_round_trip() {
        for field_lon in b'A'..=b'R' {
            for field_lat in b'A'..=b'R' {
                for square in ["00", "45", "99", "09", "90"] {
                    let locator = format!("{}{}{}", field_lon as char, field_lat as char, square);
                    let p = to_lat_lon(&locator).unwrap();
                    let encoded =
                        to_locator(p.latitude, p.longitude, LocatorPrecision::Square).unwrap();
                    assert_eq!(encoded, locator);
                }
            }
        }
    }

    #[test]
    fn six_char_round_trip_on_centers() {
        for locator in ["IM58kr", "JO65ab", "AA00aa", "RR99xx", "FN31pr", "QF56od"] {
            let p = to_lat_lon(locator).unwrap();
            let encoded =
                to_locator(p.latitude, p.longitude, LocatorPrecision::Subsquare).unwrap();
            assert_eq!(encoded, locator);
        }
    }

    #[test]
    fn different_subsquares_share_a_square() {
        let a = to_lat_lon("IM58aa").unwrap();
        let b = to_lat_lon("IM58xx").unwrap();
        assert_ne!(a, b);
        let sa = to_locator(a.latitude, a.longitude, LocatorPrecision::Square).unwrap();
        let sb = to_locator(b.latitude, b.longitude, LocatorPrecision::Square).unwrap();
        assert_eq!(sa, sb);
    }

    #[test]
    fn grid_edges_stay_in_range() {
        assert_eq!(
            to_locator(90.0, 180.0, LocatorPrecision::Subsquare).unwrap(),
            "RR99xx"
        );
        assert_eq!(
            to_locator(-90.0, -180.0, LocatorPrecision::Subsquare).unwrap(),
            "AA00aa"
        );
    }

    #[test]
    fn out_of_range_coordinates_are_errors() {
        assert_eq!(
            to_locator(91.0, 0.0, LocatorPrecision::Square),
            Err(LocatorError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            to_locator(0.0, -180.5, LocatorPrecision::Square),
            Err(LocatorError::LongitudeOutOfRange(-180.5))
        );
        assert!(to_locator(f64::NAN, 0.0, LocatorPrecision::Square).is_err());
    }

    #[test]
    fn precision_from_u8() {
        assert_eq!(LocatorPrecision::try_from(4), Ok(LocatorPrecision::Square));
        assert_eq!(LocatorPrecision::try_from(6), Ok(LocatorPrecision::Subsquare));
        assert_eq!(
            LocatorPrecision::try_from(8),
            Err(LocatorError::UnsupportedPrecision(8))
        );
    }

    #[test]
    fn distance_and_bearing() {
        assert_eq!(distance_between("IM58", "IM58"), Some(0.0));
        assert!(distance_between("IM58", "ZZ99").is_none());
        assert!(bearing_between("AA0", "IM58").is_none());

        // JO65 (Copenhagen area) is roughly north-east of IM58.
        let bearing = bearing_between("IM58", "JO65").unwrap();
        assert!((20.0..60.0).contains(&bearing), "bearing {bearing}");
        let distance = distance_between("IM58", "JO65").unwrap();
        assert!((2400.0..2800.0).contains(&distance), "distance {distance}");
    }

    #[test]
    fn bounds_contain_center() {
        let (sw, ne) = locator_bounds("IM58").unwrap();
        assert_abs_diff_eq!(sw.latitude, 38.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sw.longitude, -10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ne.latitude, 39.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ne.longitude, -8.0, epsilon = 1e-9);
    }

    #[test]
    fn bounds_follow_locator_precision() {
        let (sw, ne) = locator_bounds("im58KR").unwrap();
        assert_abs_diff_eq!(ne.latitude - sw.latitude, SUBSQUARE_LAT_DEG, epsilon = 1e-9);
        assert_abs_diff_eq!(ne.longitude - sw.longitude, SUBSQUARE_LON_DEG, epsilon = 1e-9);
        assert_abs_diff_eq!(sw.latitude, 38.0 + 17.0 / 24.0, epsilon = 1e-9);

        assert_eq!(parse("IM58").map(|(p, _)| p), Some(LocatorPrecision::Square));
        assert_eq!(parse("IM58kr").map(|(p, _)| p), Some(LocatorPrecision::Subsquare));
        assert!(locator_bounds("IM58k").is_none());
    }
}
