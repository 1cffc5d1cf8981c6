//! Doppler correction for satellite links.
//!
//! Range-rate is positive while the satellite recedes and negative while it
//! approaches.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::rf::units::SPEED_OF_LIGHT_M_S;

/// Typical worst-case range-rate for a low Earth orbit pass.
pub const LEO_MAX_RANGE_RATE_KM_S: f64 = 8.0;

/// Nominal link frequencies in Hz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FrequencyPlan {
    pub uplink_hz: Option<f64>,
    pub downlink_hz: Option<f64>,
}

impl FrequencyPlan {
    /// Non-positive frequencies are treated as absent.
    pub fn from_mhz(uplink_mhz: Option<f64>, downlink_mhz: Option<f64>) -> Self {
        Self {
            uplink_hz: positive(uplink_mhz).map(|f| f * 1e6),
            downlink_hz: positive(downlink_mhz).map(|f| f * 1e6),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.uplink_hz.is_none() && self.downlink_hz.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct DopplerShift {
    pub uplink_shift_hz: Option<f64>,
    /// Frequency to transmit on so the satellite hears its nominal uplink.
    pub uplink_corrected_mhz: Option<f64>,
    pub downlink_shift_hz: Option<f64>,
    /// Frequency the downlink is heard on at the ground.
    pub downlink_corrected_mhz: Option<f64>,
    pub radial_velocity_km_s: f64,
    pub approaching: bool,
}

/// Observed shift of a signal sent by the satellite.
pub fn downlink_shift_hz(frequency_hz: f64, range_rate_km_s: f64) -> f64 {
    let v = range_rate_km_s * 1000.0;
    -frequency_hz * (v / (SPEED_OF_LIGHT_M_S + v))
}

/// Pre-correction applied to a signal sent to the satellite.
pub fn uplink_shift_hz(frequency_hz: f64, range_rate_km_s: f64) -> f64 {
    let v = range_rate_km_s * 1000.0;
    -frequency_hz * (v / SPEED_OF_LIGHT_M_S)
}

/// Shifts and corrected frequencies for whichever directions are known.
pub fn calculate_doppler(
    uplink_mhz: Option<f64>,
    downlink_mhz: Option<f64>,
    range_rate_km_s: f64,
) -> DopplerShift {
    let plan = FrequencyPlan::from_mhz(uplink_mhz, downlink_mhz);
    let uplink = plan
        .uplink_hz
        .map(|f| (f, uplink_shift_hz(f, range_rate_km_s)));
    let downlink = plan
        .downlink_hz
        .map(|f| (f, downlink_shift_hz(f, range_rate_km_s)));

    DopplerShift {
        uplink_shift_hz: uplink.map(|(_, shift)| shift),
        uplink_corrected_mhz: uplink.map(|(f, shift)| (f + shift) / 1e6),
        downlink_shift_hz: downlink.map(|(_, shift)| shift),
        downlink_corrected_mhz: downlink.map(|(f, shift)| (f + shift) / 1e6),
        radial_velocity_km_s: range_rate_km_s,
        approaching: range_rate_km_s < 0.0,
    }
}

/// Largest shift to expect on `frequency_mhz` from a LEO satellite.
pub fn max_doppler_shift_hz(frequency_mhz: f64) -> f64 {
    frequency_mhz * 1e6 * (LEO_MAX_RANGE_RATE_KM_S * 1000.0) / SPEED_OF_LIGHT_M_S
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}
