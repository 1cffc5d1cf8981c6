use chrono::{DateTime, Duration, Utc};

use crate::doppler::FrequencyPlan;
use crate::predict::error::PredictError;
use crate::predict::propagation::{look_angles, round2, trajectory_point};
use crate::predict::sun::{sun_elevation_deg, CIVIL_TWILIGHT_DEG};
use crate::predict::tle_loader::TleEntry;
use crate::predict::types::{Pass, PassQuality, TrajectoryPoint};
use crate::predict::GroundStation;

const COARSE_STEP_SECONDS: i64 = 60; // 1 minute for initial scan
const FINE_STEP_SECONDS: i64 = 1; // 1 second for refinement
const HORIZON_ELEVATION: f64 = 0.0;
const VISIBLE_MIN_ELEVATION: f64 = 10.0;

pub const DEFAULT_TRAJECTORY_STEP_SECONDS: i64 = 30;

#[derive(Debug, Clone)]
pub struct PassOptions {
    /// Passes peaking below this are dropped.
    pub min_elevation_deg: f64,
    /// Cadence of the per-pass trajectory.
    pub trajectory_step: Duration,
    pub frequencies: FrequencyPlan,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            min_elevation_deg: 0.0,
            trajectory_step: Duration::seconds(DEFAULT_TRAJECTORY_STEP_SECONDS),
            frequencies: FrequencyPlan::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    Rise,
    Set,
}

/// Pass state between AOS and LOS while scanning.
struct OpenPass {
    aos: DateTime<Utc>,
    aos_azimuth: f64,
    max_elevation: f64,
    tca: DateTime<Utc>,
}

/// Passes starting within `days` days of `start`.
pub fn predict_passes_for_days(
    station: &GroundStation,
    satellite: &TleEntry,
    start: DateTime<Utc>,
    days: u32,
    options: &PassOptions,
) -> Result<Vec<Pass>, PredictError> {
    let end = start + Duration::days(i64::from(days));
    predict_passes(station, satellite, start, end, options)
}

/// Find all passes for a satellite within a time range
pub fn predict_passes(
    station: &GroundStation,
    satellite: &TleEntry,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    options: &PassOptions,
) -> Result<Vec<Pass>, PredictError> {
    if end < start {
        return Err(PredictError::InvalidWindow);
    }

    let mut passes = Vec::new();
    let mut cursor = start;
    let mut last_sample = start;
    let coarse_step = Duration::seconds(COARSE_STEP_SECONDS);
    let mut open: Option<OpenPass> = None;

    while cursor <= end {
        let angles = look_angles(station, &satellite.elements, &satellite.constants, cursor)?;
        let above = angles.elevation_deg >= HORIZON_ELEVATION;

        if above {
            if let Some(pass) = open.as_mut() {
                if angles.elevation_deg > pass.max_elevation {
                    pass.max_elevation = angles.elevation_deg;
                    pass.tca = cursor;
                }
            } else {
                // Already up when the window opens: the pass is clipped to `start`.
                let (aos, aos_azimuth) = if cursor == start {
                    (start, angles.azimuth_deg)
                } else {
                    refine_crossing(station, satellite, last_sample, cursor, Crossing::Rise)?
                };
                open = Some(OpenPass {
                    aos,
                    aos_azimuth,
                    max_elevation: angles.elevation_deg,
                    tca: cursor,
                });
            }
        } else if let Some(pass) = open.take() {
            let (los, los_azimuth) =
                refine_crossing(station, satellite, last_sample, cursor, Crossing::Set)?;
            if let Some(pass) = close_pass(station, satellite, pass, los, los_azimuth, options)? {
                passes.push(pass);
            }
        }

        last_sample = cursor;
        cursor += coarse_step;
    }

    // Pass still open after the last coarse sample: it may set before `end`.
    if let Some(pass) = open.take() {
        let angles = look_angles(station, &satellite.elements, &satellite.constants, end)?;
        let (los, los_azimuth) = if angles.elevation_deg >= HORIZON_ELEVATION {
            (end, angles.azimuth_deg)
        } else {
            refine_crossing(station, satellite, last_sample, end, Crossing::Set)?
        };
        if let Some(pass) = close_pass(station, satellite, pass, los, los_azimuth, options)? {
            passes.push(pass);
        }
    }

    log::debug!(
        "{}: {} passes between {} and {}",
        satellite.info.name,
        passes.len(),
        start,
        end
    );

    Ok(passes)
}

fn close_pass(
    station: &GroundStation,
    satellite: &TleEntry,
    open: OpenPass,
    los: DateTime<Utc>,
    los_azimuth: f64,
    options: &PassOptions,
) -> Result<Option<Pass>, PredictError> {
    let trajectory = build_trajectory(station, satellite, open.aos, los, options)?;

    // The trajectory samples may catch a higher peak than the coarse scan did.
    let mut max_elevation = open.max_elevation;
    let mut tca = open.tca;
    for point in &trajectory {
        if point.elevation_deg > max_elevation {
            max_elevation = point.elevation_deg;
            tca = point.timestamp;
        }
    }

    if max_elevation < options.min_elevation_deg {
        return Ok(None);
    }

    let peak = look_angles(station, &satellite.elements, &satellite.constants, tca)?;

    Ok(Some(Pass {
        satellite: satellite.info.name.clone(),
        norad_id: satellite.info.norad_id,
        aos: open.aos,
        los,
        tca,
        duration_seconds: (los - open.aos).num_seconds(),
        max_elevation_deg: round2(max_elevation),
        max_elevation_azimuth_deg: round2(peak.azimuth_deg),
        aos_azimuth_deg: round2(open.aos_azimuth),
        los_azimuth_deg: round2(los_azimuth),
        quality: PassQuality::from_max_elevation(max_elevation),
        visible: is_naked_eye_visible(station, &trajectory),
        trajectory,
    }))
}

/// Samples from `start` to `end` at the configured cadence, `end` always included.
pub fn build_trajectory(
    station: &GroundStation,
    satellite: &TleEntry,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    options: &PassOptions,
) -> Result<Vec<TrajectoryPoint>, PredictError> {
    let step = options.trajectory_step.max(Duration::seconds(1));
    let mut cursor = start;
    let mut points = Vec::new();

    while cursor < end {
        points.push(trajectory_point(
            station,
            &satellite.elements,
            &satellite.constants,
            cursor,
            &options.frequencies,
        )?);
        cursor += step;
    }
    points.push(trajectory_point(
        station,
        &satellite.elements,
        &satellite.constants,
        end,
        &options.frequencies,
    )?);

    Ok(points)
}

/// Sunlit satellite, reasonably high, against a dark sky.
fn is_naked_eye_visible(station: &GroundStation, trajectory: &[TrajectoryPoint]) -> bool {
    trajectory.iter().any(|p| {
        p.sunlit
            && p.elevation_deg >= VISIBLE_MIN_ELEVATION
            && sun_elevation_deg(station, p.timestamp) <= CIVIL_TWILIGHT_DEG
    })
}

/// Binary search to find exact horizon crossing time
fn refine_crossing(
    station: &GroundStation,
    satellite: &TleEntry,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    crossing: Crossing,
) -> Result<(DateTime<Utc>, f64), PredictError> {
    let mut low = before;
    let mut high = after;

    while (high - low).num_seconds() > FINE_STEP_SECONDS {
        let mid = low + (high - low) / 2;
        let angles = look_angles(station, &satellite.elements, &satellite.constants, mid)?;

        let above = angles.elevation_deg >= HORIZON_ELEVATION;
        // Keep the horizon crossing between low and high.
        if above == (crossing == Crossing::Rise) {
            high = mid;
        } else {
            low = mid;
        }
    }

    let at = match crossing {
        Crossing::Rise => high,
        Crossing::Set => low,
    };
    let final_angles = look_angles(station, &satellite.elements, &satellite.constants, at)?;

    Ok((at, final_angles.azimuth_deg))
}
