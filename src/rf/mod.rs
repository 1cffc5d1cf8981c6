pub mod antenna;
pub mod coax;
mod error;
pub mod swr;
pub mod units;

pub use antenna::{YagiDesign, YagiElement};
pub use coax::{cable_by_id, calculate_cable_loss, CoaxCable, CABLES};
pub use error::RfError;
pub use swr::MatchReport;
