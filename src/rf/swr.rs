use serde::Serialize;
use utoipa::ToSchema;

/// Derived figures for a given SWR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct MatchReport {
    pub swr: f64,
    pub reflection_coefficient: f64,
    pub return_loss_db: f64,
    pub mismatch_loss_db: f64,
    pub reflected_power_fraction: f64,
    pub transmitted_power_fraction: f64,
}

impl MatchReport {
    /// `None` outside the physical domain (SWR < 1 or not finite).
    pub fn from_swr(swr: f64) -> Option<Self> {
        if !swr.is_finite() || swr < 1.0 {
            return None;
        }
        let gamma = swr_to_reflection_coefficient(swr);
        Some(Self {
            swr,
            reflection_coefficient: gamma,
            return_loss_db: return_loss_db(gamma),
            mismatch_loss_db: mismatch_loss_db(gamma),
            reflected_power_fraction: reflected_power_fraction(gamma),
            transmitted_power_fraction: transmitted_power_fraction(gamma),
        })
    }
}

pub fn swr_to_reflection_coefficient(swr: f64) -> f64 {
    (swr - 1.0) / (swr + 1.0)
}

pub fn reflection_coefficient_to_swr(gamma: f64) -> f64 {
    let gamma = gamma.abs();
    (1.0 + gamma) / (1.0 - gamma)
}

pub fn return_loss_db(gamma: f64) -> f64 {
    -20.0 * gamma.abs().log10()
}

pub fn mismatch_loss_db(gamma: f64) -> f64 {
    -10.0 * (1.0 - gamma * gamma).log10()
}

pub fn reflected_power_fraction(gamma: f64) -> f64 {
    gamma * gamma
}

pub fn transmitted_power_fraction(gamma: f64) -> f64 {
    1.0 - gamma * gamma
}

/// SWR from forward and reflected power readings (same units).
pub fn swr_from_power(forward: f64, reflected: f64) -> f64 {
    reflection_coefficient_to_swr((reflected / forward).sqrt())
}

/// |Γ| for a purely resistive load against a reference impedance.
pub fn reflection_coefficient_from_impedance(load_ohms: f64, reference_ohms: f64) -> f64 {
    ((load_ohms - reference_ohms) / (load_ohms + reference_ohms)).abs()
}
