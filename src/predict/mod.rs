mod error;
mod ground_station;
mod pass_finder;
mod propagation;
pub mod sun;
mod tle_loader;
mod types;

pub use error::PredictError;
pub use ground_station::GroundStation;
pub use pass_finder::{
    build_trajectory, predict_passes, predict_passes_for_days, PassOptions,
    DEFAULT_TRAJECTORY_STEP_SECONDS,
};
pub use propagation::{look_angles, propagate_position, trajectory_point};
pub use tle_loader::{load_file, parse_tle_text, TleEntry, TleLoader};
pub use types::{
    LookAngles, Pass, PassQuality, SatelliteInfo, SatellitePosition, TrajectoryPoint,
};

#[cfg(test)]
pub(crate) use tle_loader::tests::ISS_TLE;
