//! Antenna dimensions and Yagi estimates.
//!
//! All formulas here use the ham-radio approximation λ = 300 / f(MHz) rather
//! than the exact speed of light, so results match the usual reference tables.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::rf::error::RfError;

/// Wire shortening applied to resonant lengths.
const END_EFFECT_FACTOR: f64 = 0.95;

const REFLECTOR_FACTOR: f64 = 0.495;
const DRIVEN_FACTOR: f64 = 0.473;
const FIRST_DIRECTOR_FACTOR: f64 = 0.440;
const DIRECTOR_STEP: f64 = 0.005;
const MIN_DIRECTOR_FACTOR: f64 = 0.410;

const REFLECTOR_SPACING: f64 = 0.20;
const FIRST_DIRECTOR_SPACING: f64 = 0.10;
const DIRECTOR_SPACING: f64 = 0.20;

/// Gain of a half-wave dipole over an isotropic radiator.
pub const DIPOLE_GAIN_DBI: f64 = 2.15;

pub fn wavelength_m(frequency_mhz: f64) -> f64 {
    300.0 / frequency_mhz
}

/// Total length of a half-wave dipole.
pub fn dipole_length_m(frequency_mhz: f64) -> f64 {
    wavelength_m(frequency_mhz) / 2.0 * END_EFFECT_FACTOR
}

pub fn dipole_leg_length_m(frequency_mhz: f64) -> f64 {
    dipole_length_m(frequency_mhz) / 2.0
}

/// Radiator length of a quarter-wave vertical.
pub fn quarter_wave_vertical_m(frequency_mhz: f64) -> f64 {
    wavelength_m(frequency_mhz) / 4.0 * END_EFFECT_FACTOR
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "role", content = "index", rename_all = "snake_case")]
pub enum ElementRole {
    Reflector,
    Driven,
    /// 1-based director number counted from the driven element.
    Director(usize),
}

impl fmt::Display for ElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRole::Reflector => write!(f, "R"),
            ElementRole::Driven => write!(f, "DE"),
            ElementRole::Director(n) => write!(f, "D{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct YagiElement {
    pub role: ElementRole,
    pub length_m: f64,
    /// Distance from the reflector along the boom.
    pub position_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct YagiDesign {
    pub frequency_mhz: f64,
    pub wavelength_m: f64,
    pub elements: Vec<YagiElement>,
    pub boom_length_m: f64,
    pub gain_dbd: f64,
    pub gain_dbi: f64,
}

impl YagiDesign {
    /// Element lengths and boom positions for a Yagi with `element_count`
    /// elements (reflector + driven + directors).
    pub fn new(frequency_mhz: f64, element_count: usize) -> Result<Self, RfError> {
        if element_count < 2 {
            return Err(RfError::TooFewElements(element_count));
        }

        let lambda = wavelength_m(frequency_mhz);
        let mut elements = Vec::with_capacity(element_count);
        elements.push(YagiElement {
            role: ElementRole::Reflector,
            length_m: REFLECTOR_FACTOR * lambda,
            position_m: 0.0,
        });
        let mut position = REFLECTOR_SPACING * lambda;
        elements.push(YagiElement {
            role: ElementRole::Driven,
            length_m: DRIVEN_FACTOR * lambda,
            position_m: position,
        });

        for n in 1..=element_count - 2 {
            position += if n == 1 {
                FIRST_DIRECTOR_SPACING
            } else {
                DIRECTOR_SPACING
            } * lambda;
            elements.push(YagiElement {
                role: ElementRole::Director(n),
                length_m: director_factor(n) * lambda,
                position_m: position,
            });
        }

        let gain_dbd = yagi_gain_dbd(element_count);
        Ok(Self {
            frequency_mhz,
            wavelength_m: lambda,
            elements,
            boom_length_m: position,
            gain_dbd,
            gain_dbi: gain_dbd + DIPOLE_GAIN_DBI,
        })
    }
}

fn director_factor(n: usize) -> f64 {
    (FIRST_DIRECTOR_FACTOR - DIRECTOR_STEP * (n - 1) as f64).max(MIN_DIRECTOR_FACTOR)
}

/// Typical forward gain over a dipole for a Yagi with `element_count` elements.
///
/// Mean of four empirical curves; none of them is authoritative on its own.
pub fn yagi_gain_dbd(element_count: usize) -> f64 {
    let n = element_count as f64;
    let estimates = [
        gain_vk3auu(n),
        gain_wa2phw(n),
        gain_dbj9bv(n),
        gain_rothammel(n),
    ];
    estimates.iter().sum::<f64>() / estimates.len() as f64
}

fn gain_vk3auu(n: f64) -> f64 {
    10.0 * n.log10() + 1.0
}

fn gain_wa2phw(n: f64) -> f64 {
    8.5 * n.log10() + 2.0
}

fn gain_dbj9bv(n: f64) -> f64 {
    11.0 * n.log10() + 0.5
}

fn gain_rothammel(n: f64) -> f64 {
    9.0 * n.log10() + 1.6
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn dipole_and_vertical() {
        // 14.2 MHz: λ = 21.127 m
        assert_abs_diff_eq!(dipole_length_m(14.2), 10.035, epsilon = 1e-3);
        assert_abs_diff_eq!(dipole_leg_length_m(14.2), 5.018, epsilon = 1e-3);
        assert_abs_diff_eq!(quarter_wave_vertical_m(145.0), 0.4914, epsilon = 1e-4);
    }

    #[test]
    fn yagi_rejects_single_element() {
        assert_eq!(YagiDesign::new(145.0, 1), Err(RfError::TooFewElements(1)));
    }

    #[test]
    fn yagi_element_roles_and_lengths() {
        let yagi = YagiDesign::new(300.0, 5).unwrap();
        assert_abs_diff_eq!(yagi.wavelength_m, 1.0);
        let roles: Vec<String> = yagi.elements.iter().map(|e| e.role.to_string()).collect();
        assert_eq!(roles, ["R", "DE", "D1", "D2", "D3"]);

        let lengths: Vec<f64> = yagi.elements.iter().map(|e| e.length_m).collect();
        for (got, want) in lengths.iter().zip([0.495, 0.473, 0.440, 0.435, 0.430]) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(yagi.boom_length_m, 0.2 + 0.1 + 0.2 + 0.2, epsilon = 1e-12);
    }

    #[test]
    fn director_length_is_floored() {
        let yagi = YagiDesign::new(300.0, 20).unwrap();
        let last = yagi.elements.last().unwrap();
        assert_eq!(last.role, ElementRole::Director(18));
        assert_abs_diff_eq!(last.length_m, 0.410, epsilon = 1e-12);
        for e in &yagi.elements[2..] {
            assert!(e.length_m >= 0.410 - 1e-12);
        }
    }

    #[test]
    fn gain_is_mean_of_estimates() {
        let n = 7.0;
        let expected = (gain_vk3auu(n) + gain_wa2phw(n) + gain_dbj9bv(n) + gain_rothammel(n)) / 4.0;
        assert_abs_diff_eq!(yagi_gain_dbd(7), expected, epsilon = 1e-12);

        let yagi = YagiDesign::new(435.0, 7).unwrap();
        assert_abs_diff_eq!(yagi.gain_dbi - yagi.gain_dbd, DIPOLE_GAIN_DBI, epsilon = 1e-12);
    }

    #[test]
    fn gain_grows_with_elements() {
        let gains: Vec<f64> = (2..12).map(yagi_gain_dbd).collect();
        assert!(gains.windows(2).all(|w| w[1] > w[0]));
    }
}
