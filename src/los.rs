//! Line-of-sight and first Fresnel zone analysis over a terrain profile.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::geo::{GeoPoint, EARTH_RADIUS_KM};
use crate::rf::units::free_space_path_loss_db;

/// Standard-atmosphere refraction modelled as a 4/3 larger Earth.
pub const EFFECTIVE_EARTH_RADIUS_KM: f64 = EARTH_RADIUS_KM * 4.0 / 3.0;

const FRESNEL_CONSTANT: f64 = 17.32;
const BLOCKED_FRESNEL_PCT: f64 = 20.0;
const CLEAR_FRESNEL_PCT: f64 = 60.0;

/// One terrain sample along the path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ElevationPoint {
    /// Distance from the start of the path.
    pub distance_km: f64,
    pub elevation_m: f64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LinkParams {
    /// Transmit antenna height above ground at the first sample.
    pub tx_height_m: f64,
    /// Receive antenna height above ground at the last sample.
    pub rx_height_m: f64,
    pub frequency_mhz: f64,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LosStatus {
    #[default]
    Clear,
    Marginal,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LosPoint {
    pub distance_km: f64,
    pub terrain_m: f64,
    /// Elevation of the antenna-to-antenna line after Earth bulge.
    pub los_m: f64,
    pub fresnel_radius_m: f64,
    pub clearance_m: f64,
    pub fresnel_clearance_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct LosAnalysis {
    pub points: Vec<LosPoint>,
    pub status: LosStatus,
    pub worst_clearance_m: f64,
    pub worst_fresnel_pct: f64,
    pub total_distance_km: f64,
    pub bearing_deg: f64,
    pub free_space_loss_db: f64,
}

/// First Fresnel zone radius in metres at `d1_km`/`d2_km` from the two ends.
pub fn fresnel_radius_m(d1_km: f64, d2_km: f64, frequency_mhz: f64) -> f64 {
    let total = d1_km + d2_km;
    if d1_km <= 0.0 || d2_km <= 0.0 || total <= 0.0 {
        return 0.0;
    }
    let f_ghz = frequency_mhz / 1000.0;
    FRESNEL_CONSTANT * (d1_km * d2_km / (f_ghz * total)).sqrt()
}

/// Height in metres the 4/3 Earth rises above the chord at `d1_km`/`d2_km`.
pub fn earth_bulge_m(d1_km: f64, d2_km: f64) -> f64 {
    d1_km * d2_km / (2.0 * EFFECTIVE_EARTH_RADIUS_KM) * 1000.0
}

/// Distance to the radio horizon in km between two antennas of the given heights.
pub fn radio_horizon_km(tx_height_m: f64, rx_height_m: f64) -> f64 {
    4.12 * (tx_height_m.sqrt() + rx_height_m.sqrt())
}

/// Analyse a terrain profile between two antennas.
///
/// Profiles shorter than two samples yield the default clear, empty result.
/// Only intermediate samples take part in the verdict.
pub fn analyze(profile: &[ElevationPoint], link: &LinkParams) -> LosAnalysis {
    if profile.len() < 2 {
        return LosAnalysis::default();
    }
    let first = &profile[0];
    let last = &profile[profile.len() - 1];

    let total = last.distance_km;
    let tx_top = first.elevation_m + link.tx_height_m;
    let rx_top = last.elevation_m + link.rx_height_m;

    let mut points = Vec::with_capacity(profile.len());
    let mut worst_clearance = f64::INFINITY;
    let mut worst_pct = f64::INFINITY;

    for (i, sample) in profile.iter().enumerate() {
        let endpoint = i == 0 || i == profile.len() - 1;
        let d1 = sample.distance_km;
        let d2 = total - d1;

        let fresnel = if endpoint {
            0.0
        } else {
            fresnel_radius_m(d1, d2, link.frequency_mhz)
        };
        let fraction = if total > 0.0 { d1 / total } else { 0.0 };
        let los = tx_top + (rx_top - tx_top) * fraction - earth_bulge_m(d1, d2);
        let clearance = los - sample.elevation_m;
        let pct = if fresnel > 0.0 {
            clearance / fresnel * 100.0
        } else {
            100.0
        };

        if !endpoint {
            worst_clearance = worst_clearance.min(clearance);
            worst_pct = worst_pct.min(pct);
        }

        points.push(LosPoint {
            distance_km: sample.distance_km,
            terrain_m: sample.elevation_m,
            los_m: los,
            fresnel_radius_m: fresnel,
            clearance_m: clearance,
            fresnel_clearance_pct: pct,
        });
    }

    if profile.len() == 2 {
        worst_clearance = link.tx_height_m.min(link.rx_height_m);
        worst_pct = 100.0;
    }

    let start = GeoPoint::new(first.latitude, first.longitude);
    let end = GeoPoint::new(last.latitude, last.longitude);

    LosAnalysis {
        points,
        status: classify(worst_clearance, worst_pct),
        worst_clearance_m: worst_clearance,
        worst_fresnel_pct: worst_pct,
        total_distance_km: total,
        bearing_deg: start.bearing_deg(&end),
        free_space_loss_db: free_space_path_loss_db(total, link.frequency_mhz),
    }
}

fn classify(worst_clearance_m: f64, worst_fresnel_pct: f64) -> LosStatus {
    if worst_clearance_m < 0.0 || worst_fresnel_pct < BLOCKED_FRESNEL_PCT {
        LosStatus::Blocked
    } else if worst_fresnel_pct < CLEAR_FRESNEL_PCT {
        LosStatus::Marginal
    } else {
        LosStatus::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const LINK: LinkParams = LinkParams {
        tx_height_m: 100.0,
        rx_height_m: 100.0,
        frequency_mhz: 1000.0,
    };

    /// 10 km path due east along the equator, 1 km spacing, flat terrain.
    fn flat_profile() -> Vec<ElevationPoint> {
        (0..=10)
            .map(|i| ElevationPoint {
                distance_km: i as f64,
                elevation_m: 0.0,
                latitude: 0.0,
                longitude: i as f64 * 0.009,
            })
            .collect()
    }

    #[test]
    fn fresnel_and_bulge_at_midpoint() {
        assert_abs_diff_eq!(fresnel_radius_m(5.0, 5.0, 1000.0), 27.385, epsilon = 1e-3);
        assert_eq!(fresnel_radius_m(0.0, 10.0, 1000.0), 0.0);
        assert_abs_diff_eq!(earth_bulge_m(5.0, 5.0), 1.4715, epsilon = 1e-4);
    }

    #[test]
    fn flat_terrain_is_clear() {
        let analysis = analyze(&flat_profile(), &LINK);
        assert_eq!(analysis.status, LosStatus::Clear);
        assert_eq!(analysis.points.len(), 11);
        assert_abs_diff_eq!(analysis.total_distance_km, 10.0);
        assert_abs_diff_eq!(analysis.bearing_deg, 90.0, epsilon = 1e-6);
        assert!(analysis.worst_fresnel_pct >= 60.0);

        // Endpoint conventions
        let first = analysis.points[0];
        assert_eq!(first.fresnel_radius_m, 0.0);
        assert_eq!(first.fresnel_clearance_pct, 100.0);
        assert_abs_diff_eq!(first.clearance_m, 100.0);

        // Worst clearance sits at the bulge maximum.
        assert_abs_diff_eq!(analysis.worst_clearance_m, 100.0 - 1.4715, epsilon = 1e-3);
    }

    #[test]
    fn obstruction_above_line_is_blocked() {
        let mut profile = flat_profile();
        profile[5].elevation_m = 150.0;
        let analysis = analyze(&profile, &LINK);
        assert_eq!(analysis.status, LosStatus::Blocked);
        assert!(analysis.worst_clearance_m < 0.0);
    }

    #[test]
    fn partial_fresnel_intrusion_is_marginal() {
        let mut profile = flat_profile();
        // ~40% of the first Fresnel zone left clear at mid-path.
        profile[5].elevation_m = 87.6;
        let analysis = analyze(&profile, &LINK);
        assert_eq!(analysis.status, LosStatus::Marginal);
        assert!(analysis.worst_clearance_m > 0.0);
        assert_abs_diff_eq!(analysis.worst_fresnel_pct, 39.9, epsilon = 0.1);
    }

    #[test]
    fn deep_fresnel_intrusion_is_blocked() {
        let mut profile = flat_profile();
        profile[5].elevation_m = 96.0;
        let analysis = analyze(&profile, &LINK);
        assert!(analysis.worst_clearance_m > 0.0);
        assert_eq!(analysis.status, LosStatus::Blocked);
    }

    #[test]
    fn endpoints_do_not_affect_verdict() {
        let mut profile = flat_profile();
        profile[0].elevation_m = 500.0;
        profile[10].elevation_m = 500.0;
        let analysis = analyze(&profile, &LINK);
        assert_eq!(analysis.status, LosStatus::Clear);
    }

    #[test]
    fn degenerate_profiles() {
        assert_eq!(analyze(&[], &LINK), LosAnalysis::default());
        assert_eq!(analyze(&flat_profile()[..1], &LINK), LosAnalysis::default());

        let two = analyze(&[flat_profile()[0], flat_profile()[10]], &LINK);
        assert_eq!(two.status, LosStatus::Clear);
        assert_eq!(two.points.len(), 2);
        assert_eq!(two.worst_clearance_m, 100.0);
    }

    #[test]
    fn radio_horizon() {
        assert_abs_diff_eq!(radio_horizon_km(100.0, 0.0), 41.2, epsilon = 1e-9);
    }

    #[test]
    fn status_display() {
        assert_eq!(LosStatus::Marginal.to_string(), "marginal");
    }
}
