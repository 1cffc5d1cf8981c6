use serde::Serialize;

use crate::rf::units::frequency_mhz_to_wavelength_m;

/// Frequencies (MHz) at which every cable's loss table is specified.
pub const REFERENCE_FREQUENCIES_MHZ: [f64; 7] = [1.0, 10.0, 50.0, 100.0, 200.0, 400.0, 1000.0];

/// Static reference data for a coaxial cable type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoaxCable {
    pub id: &'static str,
    pub name: &'static str,
    pub impedance_ohms: f64,
    pub velocity_factor: f64,
    pub outer_diameter_mm: f64,
    /// Attenuation in dB/100 m, indexed like [`REFERENCE_FREQUENCIES_MHZ`].
    pub loss_db_per_100m: [f64; 7],
}

pub static CABLES: &[CoaxCable] = &[
    CoaxCable {
        id: "rg58",
        name: "RG-58",
        impedance_ohms: 50.0,
        velocity_factor: 0.66,
        outer_diameter_mm: 4.95,
        loss_db_per_100m: [1.3, 4.6, 10.8, 16.1, 23.9, 36.7, 65.6],
    },
    CoaxCable {
        id: "rg8x",
        name: "RG-8X",
        impedance_ohms: 50.0,
        velocity_factor: 0.78,
        outer_diameter_mm: 6.1,
        loss_db_per_100m: [1.0, 3.3, 8.2, 12.1, 17.7, 26.2, 44.3],
    },
    CoaxCable {
        id: "rg213",
        name: "RG-213",
        impedance_ohms: 50.0,
        velocity_factor: 0.66,
        outer_diameter_mm: 10.3,
        loss_db_per_100m: [0.5, 2.0, 5.2, 7.2, 10.8, 15.7, 27.9],
    },
    CoaxCable {
        id: "lmr400",
        name: "LMR-400",
        impedance_ohms: 50.0,
        velocity_factor: 0.85,
        outer_diameter_mm: 10.29,
        loss_db_per_100m: [0.3, 1.3, 2.9, 4.1, 5.8, 8.4, 13.6],
    },
    CoaxCable {
        id: "aircell7",
        name: "Aircell 7",
        impedance_ohms: 50.0,
        velocity_factor: 0.83,
        outer_diameter_mm: 7.3,
        loss_db_per_100m: [1.0, 3.4, 7.5, 10.6, 15.2, 21.9, 35.6],
    },
    CoaxCable {
        id: "ecoflex10",
        name: "Ecoflex 10",
        impedance_ohms: 50.0,
        velocity_factor: 0.86,
        outer_diameter_mm: 10.2,
        loss_db_per_100m: [0.4, 1.2, 2.8, 4.0, 5.7, 8.2, 13.5],
    },
    CoaxCable {
        id: "rg6",
        name: "RG-6",
        impedance_ohms: 75.0,
        velocity_factor: 0.82,
        outer_diameter_mm: 6.9,
        loss_db_per_100m: [0.8, 2.1, 4.6, 6.6, 9.5, 13.8, 22.0],
    },
];

pub fn cable_by_id(id: &str) -> Option<&'static CoaxCable> {
    CABLES.iter().find(|c| c.id.eq_ignore_ascii_case(id))
}

impl CoaxCable {
    /// Attenuation per 100 m at `frequency_mhz`, interpolated on a log-frequency
    /// scale between the bracketing table entries and clamped at the table edges.
    pub fn loss_per_100m_db(&self, frequency_mhz: f64) -> f64 {
        let freqs = &REFERENCE_FREQUENCIES_MHZ;
        let losses = &self.loss_db_per_100m;
        let last = freqs.len() - 1;

        if frequency_mhz <= freqs[0] {
            return losses[0];
        }
        if frequency_mhz >= freqs[last] {
            return losses[last];
        }

        let Some(hi) = freqs.iter().position(|&f| f >= frequency_mhz) else {
            return f64::NAN;
        };
        if freqs[hi] == frequency_mhz {
            return losses[hi];
        }
        let lo = hi - 1;

        let ratio = (frequency_mhz.log10() - freqs[lo].log10())
            / (freqs[hi].log10() - freqs[lo].log10());
        losses[lo] + ratio * (losses[hi] - losses[lo])
    }

    /// Physical length of a cable section that is `fraction` of a wavelength long electrically.
    pub fn electrical_length_m(&self, frequency_mhz: f64, fraction: f64) -> f64 {
        frequency_mhz_to_wavelength_m(frequency_mhz) * fraction * self.velocity_factor
    }
}

/// Total loss in dB of `length_m` of `cable` at `frequency_mhz`.
pub fn calculate_cable_loss(cable: &CoaxCable, frequency_mhz: f64, length_m: f64) -> f64 {
    cable.loss_per_100m_db(frequency_mhz) * length_m / 100.0
}

/// Power left at the far end after `loss_db` of attenuation.
pub fn power_after_loss_w(power_in_w: f64, loss_db: f64) -> f64 {
    power_in_w * 10f64.powf(-loss_db / 10.0)
}
