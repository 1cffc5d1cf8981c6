use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::doppler::{downlink_shift_hz, uplink_shift_hz, FrequencyPlan};
use crate::predict::error::PredictError;
use crate::predict::ground_station::{
    GroundStation, EARTH_ROTATION_RAD_S, WGS84_A_KM, WGS84_E2,
};
use crate::predict::sun::{is_sunlit, sun_position_eci_km};
use crate::predict::types::{LookAngles, SatellitePosition, TrajectoryPoint};

/// Satellite state at an instant, in both the TEME and Earth-fixed frames.
struct State {
    teme_km: [f64; 3],
    teme_velocity_km_s: [f64; 3],
    ecef_km: [f64; 3],
    ecef_velocity_km_s: [f64; 3],
}

pub fn greenwich_sidereal_time(timestamp: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()))
}

fn propagate(
    elements: &Elements,
    constants: &Constants,
    timestamp: DateTime<Utc>,
) -> Result<State, PredictError> {
    let minutes = elements
        .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    let prediction = constants
        .propagate(minutes)
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    let sidereal = greenwich_sidereal_time(timestamp);

    Ok(State {
        teme_km: prediction.position,
        teme_velocity_km_s: prediction.velocity,
        ecef_km: teme_to_ecef_position(prediction.position, sidereal),
        ecef_velocity_km_s: teme_to_ecef_velocity(
            prediction.position,
            prediction.velocity,
            sidereal,
        ),
    })
}

/// Geodetic sub-point, altitude and inertial speed of the satellite.
pub fn propagate_position(
    elements: &Elements,
    constants: &Constants,
    timestamp: DateTime<Utc>,
) -> Result<SatellitePosition, PredictError> {
    let state = propagate(elements, constants, timestamp)?;
    let (latitude_deg, longitude_deg, altitude_km) = ecef_to_geodetic(state.ecef_km);
    let v = state.teme_velocity_km_s;

    Ok(SatellitePosition {
        timestamp,
        latitude_deg,
        longitude_deg,
        altitude_km,
        velocity_km_s: (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt(),
    })
}

/// Azimuth, elevation, range and range-rate from `station` to the satellite.
pub fn look_angles(
    station: &GroundStation,
    elements: &Elements,
    constants: &Constants,
    timestamp: DateTime<Utc>,
) -> Result<LookAngles, PredictError> {
    let state = propagate(elements, constants, timestamp)?;
    Ok(topocentric(station, &state))
}

fn topocentric(station: &GroundStation, state: &State) -> LookAngles {
    let sat_ecef = state.ecef_km;
    let sat_vel_ecef = state.ecef_velocity_km_s;
    let sta_ecef = station.position_ecef_km();
    let sta_vel = station.velocity_ecef_km_s();

    let dr = [
        sat_ecef[0] - sta_ecef[0],
        sat_ecef[1] - sta_ecef[1],
        sat_ecef[2] - sta_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let enu = ecef_to_enu(dr, station.lat_rad(), station.lon_rad());
    let azimuth = enu.0.atan2(enu.1).to_degrees().rem_euclid(360.0);
    let elevation = if range_km > 0.0 {
        (enu.2 / range_km).asin().to_degrees()
    } else {
        0.0
    };

    let los_unit = if range_km > 0.0 {
        [dr[0] / range_km, dr[1] / range_km, dr[2] / range_km]
    } else {
        [0.0, 0.0, 0.0]
    };
    let rel_vel = [
        sat_vel_ecef[0] - sta_vel[0],
        sat_vel_ecef[1] - sta_vel[1],
        sat_vel_ecef[2] - sta_vel[2],
    ];
    let range_rate_km_s =
        rel_vel[0] * los_unit[0] + rel_vel[1] * los_unit[1] + rel_vel[2] * los_unit[2];

    LookAngles {
        azimuth_deg: azimuth,
        elevation_deg: elevation,
        range_km,
        range_rate_km_s,
    }
}

/// One rounded sample for display, with Doppler for the given plan.
pub fn trajectory_point(
    station: &GroundStation,
    elements: &Elements,
    constants: &Constants,
    timestamp: DateTime<Utc>,
    frequencies: &FrequencyPlan,
) -> Result<TrajectoryPoint, PredictError> {
    let state = propagate(elements, constants, timestamp)?;
    let angles = topocentric(station, &state);

    let doppler_downlink_hz = frequencies
        .downlink_hz
        .map(|f| round2(downlink_shift_hz(f, angles.range_rate_km_s)));
    let doppler_uplink_hz = frequencies
        .uplink_hz
        .map(|f| round2(uplink_shift_hz(f, angles.range_rate_km_s)));

    Ok(TrajectoryPoint {
        timestamp,
        azimuth_deg: round2(angles.azimuth_deg),
        elevation_deg: round2(angles.elevation_deg),
        range_km: round2(angles.range_km),
        range_rate_km_s: round2(angles.range_rate_km_s),
        doppler_uplink_hz,
        doppler_downlink_hz,
        sunlit: is_sunlit(state.teme_km, sun_position_eci_km(timestamp)),
    })
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn teme_to_ecef_velocity(pos_teme: [f64; 3], vel_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let pos = teme_to_ecef_position(pos_teme, gmst);
    let rotated = teme_to_ecef_position(vel_teme, gmst);
    [
        rotated[0] + EARTH_ROTATION_RAD_S * pos[1],
        rotated[1] - EARTH_ROTATION_RAD_S * pos[0],
        rotated[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

/// Earth-fixed position to (latitude°, longitude°, altitude km) on WGS-84.
pub fn ecef_to_geodetic(ecef_km: [f64; 3]) -> (f64, f64, f64) {
    let [x, y, z] = ecef_km;
    let p = (x * x + y * y).sqrt();
    let lon = y.atan2(x);

    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    let mut alt = 0.0;
    for _ in 0..5 {
        let sin_lat = lat.sin();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        alt = if lat.cos().abs() > 1e-10 {
            p / lat.cos() - n
        } else {
            z.abs() - n * (1.0 - WGS84_E2)
        };
        lat = z.atan2(p * (1.0 - WGS84_E2 * n / (n + alt)));
    }

    (lat.to_degrees(), lon.to_degrees(), alt)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::tle_loader::tests::iss;
    use approx::assert_abs_diff_eq;

    #[test]
    fn geodetic_round_trip() {
        let station = GroundStation::new(38.7223, -9.1393, 1200.0);
        let (lat, lon, alt) = ecef_to_geodetic(station.position_ecef_km());
        assert_abs_diff_eq!(lat, 38.7223, epsilon = 1e-7);
        assert_abs_diff_eq!(lon, -9.1393, epsilon = 1e-9);
        assert_abs_diff_eq!(alt, 1.2, epsilon = 1e-6);
    }

    #[test]
    fn iss_position_is_plausible() {
        let sat = iss();
        let epoch = sat.info.epoch;
        let pos = propagate_position(&sat.elements, &sat.constants, epoch).unwrap();
        assert!((350.0..450.0).contains(&pos.altitude_km), "{}", pos.altitude_km);
        assert!(pos.latitude_deg.abs() <= 52.0);
        assert!((7.5..7.8).contains(&pos.velocity_km_s), "{}", pos.velocity_km_s);
    }

    #[test]
    fn look_angles_are_bounded() {
        let sat = iss();
        let station = GroundStation::new(38.7223, -9.1393, 0.0);
        let angles = look_angles(&station, &sat.elements, &sat.constants, sat.info.epoch).unwrap();
        assert!((0.0..360.0).contains(&angles.azimuth_deg));
        assert!((-90.0..=90.0).contains(&angles.elevation_deg));
        assert!(angles.range_km > 300.0 && angles.range_km < 13_000.0);
        assert!(angles.range_rate_km_s.abs() < 8.0);
    }

    #[test]
    fn trajectory_point_carries_doppler() {
        let sat = iss();
        let station = GroundStation::new(38.7223, -9.1393, 0.0);
        let plan = FrequencyPlan::from_mhz(None, Some(145.8));
        let point =
            trajectory_point(&station, &sat.elements, &sat.constants, sat.info.epoch, &plan)
                .unwrap();
        assert!(point.doppler_uplink_hz.is_none());
        let shift = point.doppler_downlink_hz.unwrap();
        assert!(shift.abs() <= 3900.0);
    }
}
