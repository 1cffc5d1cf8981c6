//! Decibel, power and wavelength conversions.
//!
//! These are total over their numeric domain: non-positive inputs to the
//! logarithmic conversions produce NaN or -inf and callers guard before display.

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

pub fn db_to_power_ratio(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

pub fn power_ratio_to_db(ratio: f64) -> f64 {
    10.0 * ratio.log10()
}

pub fn db_to_voltage_ratio(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

pub fn voltage_ratio_to_db(ratio: f64) -> f64 {
    20.0 * ratio.log10()
}

pub fn watts_to_dbm(watts: f64) -> f64 {
    10.0 * (watts * 1000.0).log10()
}

pub fn dbm_to_watts(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0) / 1000.0
}

pub fn watts_to_dbw(watts: f64) -> f64 {
    10.0 * watts.log10()
}

pub fn dbw_to_watts(dbw: f64) -> f64 {
    10f64.powf(dbw / 10.0)
}

pub fn dbm_to_dbw(dbm: f64) -> f64 {
    dbm - 30.0
}

pub fn dbw_to_dbm(dbw: f64) -> f64 {
    dbw + 30.0
}

pub fn frequency_hz_to_wavelength_m(frequency_hz: f64) -> f64 {
    SPEED_OF_LIGHT_M_S / frequency_hz
}

pub fn wavelength_m_to_frequency_hz(wavelength_m: f64) -> f64 {
    SPEED_OF_LIGHT_M_S / wavelength_m
}

pub fn frequency_mhz_to_wavelength_m(frequency_mhz: f64) -> f64 {
    frequency_hz_to_wavelength_m(frequency_mhz * 1e6)
}

pub fn wavelength_m_to_frequency_mhz(wavelength_m: f64) -> f64 {
    wavelength_m_to_frequency_hz(wavelength_m) / 1e6
}

/// Free-space path loss in dB for a distance in km and a frequency in MHz.
pub fn free_space_path_loss_db(distance_km: f64, frequency_mhz: f64) -> f64 {
    20.0 * distance_km.log10() + 20.0 * frequency_mhz.log10() + 32.44
}
