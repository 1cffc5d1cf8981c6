use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Information about a single satellite from TLE
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: u32,
    pub tle_source: String,
    /// Epoch of the element set.
    pub epoch: DateTime<Utc>,
    /// When the element set was fetched, if known.
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Sub-satellite point and speed at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct SatellitePosition {
    pub timestamp: DateTime<Utc>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    pub velocity_km_s: f64,
}

/// Observer-relative direction and distance to a satellite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    pub range_rate_km_s: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrajectoryPoint {
    pub timestamp: DateTime<Utc>,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    pub range_rate_km_s: f64,
    pub doppler_uplink_hz: Option<f64>,
    pub doppler_downlink_hz: Option<f64>,
    /// Satellite outside the Earth's shadow.
    pub sunlit: bool,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PassQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl PassQuality {
    pub fn from_max_elevation(max_elevation_deg: f64) -> Self {
        if max_elevation_deg >= 60.0 {
            PassQuality::Excellent
        } else if max_elevation_deg >= 30.0 {
            PassQuality::Good
        } else if max_elevation_deg >= 15.0 {
            PassQuality::Fair
        } else {
            PassQuality::Poor
        }
    }
}

/// A predicted satellite pass
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pass {
    pub satellite: String,
    pub norad_id: u32,
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    pub tca: DateTime<Utc>,
    pub duration_seconds: i64,
    pub max_elevation_deg: f64,
    pub max_elevation_azimuth_deg: f64,
    pub aos_azimuth_deg: f64,
    pub los_azimuth_deg: f64,
    pub quality: PassQuality,
    /// Naked-eye visible: satellite sunlit while the observer is in darkness.
    pub visible: bool,
    pub trajectory: Vec<TrajectoryPoint>,
}
