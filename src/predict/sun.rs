//! Low-precision solar ephemeris (about 0.01° over 1950-2050), enough to tell
//! day from night and sunlight from shadow.

use chrono::{DateTime, Utc};

use crate::predict::ground_station::{GroundStation, WGS84_A_KM};
use crate::predict::propagation::{ecef_to_enu, greenwich_sidereal_time, teme_to_ecef_position};

const AU_KM: f64 = 149_597_870.7;
const JD_UNIX_EPOCH: f64 = 2_440_587.5;
const JD_J2000: f64 = 2_451_545.0;

/// Sun elevation below which the sky is dark enough to spot satellites.
pub const CIVIL_TWILIGHT_DEG: f64 = -6.0;

pub fn julian_date(timestamp: DateTime<Utc>) -> f64 {
    JD_UNIX_EPOCH + timestamp.timestamp_millis() as f64 / 86_400_000.0
}

/// Geocentric equatorial position of the Sun in km.
pub fn sun_position_eci_km(timestamp: DateTime<Utc>) -> [f64; 3] {
    let n = julian_date(timestamp) - JD_J2000;
    let mean_longitude = (280.460 + 0.985_647_4 * n).rem_euclid(360.0);
    let mean_anomaly = (357.528 + 0.985_600_3 * n).rem_euclid(360.0).to_radians();

    let ecliptic_longitude = (mean_longitude
        + 1.915 * mean_anomaly.sin()
        + 0.020 * (2.0 * mean_anomaly).sin())
    .to_radians();
    let obliquity = (23.439 - 0.000_000_4 * n).to_radians();
    let distance_au =
        1.000_14 - 0.016_71 * mean_anomaly.cos() - 0.000_14 * (2.0 * mean_anomaly).cos();

    let r = distance_au * AU_KM;
    [
        r * ecliptic_longitude.cos(),
        r * obliquity.cos() * ecliptic_longitude.sin(),
        r * obliquity.sin() * ecliptic_longitude.sin(),
    ]
}

/// Elevation of the Sun above the observer's horizon in degrees.
pub fn sun_elevation_deg(station: &GroundStation, timestamp: DateTime<Utc>) -> f64 {
    let sun_ecef = teme_to_ecef_position(
        sun_position_eci_km(timestamp),
        greenwich_sidereal_time(timestamp),
    );
    let sta = station.position_ecef_km();
    let dr = [
        sun_ecef[0] - sta[0],
        sun_ecef[1] - sta[1],
        sun_ecef[2] - sta[2],
    ];
    let range = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();
    let (_, _, up) = ecef_to_enu(dr, station.lat_rad(), station.lon_rad());
    (up / range).asin().to_degrees()
}

/// Whether a satellite at `sat_eci_km` is outside the Earth's cylindrical shadow.
pub fn is_sunlit(sat_eci_km: [f64; 3], sun_eci_km: [f64; 3]) -> bool {
    let sun_norm = (sun_eci_km[0].powi(2) + sun_eci_km[1].powi(2) + sun_eci_km[2].powi(2)).sqrt();
    let sun_unit = [
        sun_eci_km[0] / sun_norm,
        sun_eci_km[1] / sun_norm,
        sun_eci_km[2] / sun_norm,
    ];
    let along =
        sat_eci_km[0] * sun_unit[0] + sat_eci_km[1] * sun_unit[1] + sat_eci_km[2] * sun_unit[2];
    if along >= 0.0 {
        return true;
    }
    let perp = [
        sat_eci_km[0] - along * sun_unit[0],
        sat_eci_km[1] - along * sun_unit[1],
        sat_eci_km[2] - along * sun_unit[2],
    ];
    (perp[0].powi(2) + perp[1].powi(2) + perp[2].powi(2)).sqrt() > WGS84_A_KM
}
