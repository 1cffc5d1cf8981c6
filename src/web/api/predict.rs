use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::doppler::FrequencyPlan;
use crate::predict::{
    predict_passes, GroundStation, Pass, PassOptions, SatelliteInfo, TleEntry, TleLoader,
};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PredictQuery {
    /// Defaults to now.
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start: Option<DateTime<Utc>>,
    /// Defaults to `start` plus the configured window.
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub min_elevation: Option<f64>,
    #[serde(default)]
    pub norad_id: Option<u32>,
    #[serde(default)]
    pub uplink_mhz: Option<f64>,
    #[serde(default)]
    pub downlink_mhz: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PredictResponse {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub passes: Vec<Pass>,
    pub satellite_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SatelliteSummary {
    #[serde(flatten)]
    pub info: SatelliteInfo,
    /// Hours since the element set was fetched, if known.
    pub tle_age_hours: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/api/satellites",
    tag = "predict",
    responses(
        (status = 200, description = "Loaded satellites", body = Vec<SatelliteSummary>),
        (status = 503, description = "Predictions not configured", body = ErrorResponse)
    )
)]
pub async fn list_satellites(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SatelliteSummary>>> {
    let tle_loader = state
        .tle_loader
        .as_ref()
        .ok_or(ApiError::Unavailable("predictions_not_configured"))?;

    let now = Utc::now();
    let loader = tle_loader.read().await;
    let satellites = loader
        .satellites()
        .into_iter()
        .map(|sat| SatelliteSummary {
            info: sat.info.clone(),
            tle_age_hours: sat
                .age(now)
                .map(|age| age.num_seconds() as f64 / 3600.0),
        })
        .collect();

    Ok(Json(satellites))
}

#[utoipa::path(
    get,
    path = "/api/predict",
    tag = "predict",
    params(
        ("start" = Option<String>, Query, description = "Start time (RFC3339), defaults to now"),
        ("end" = Option<String>, Query, description = "End time (RFC3339), defaults to start plus the configured window; capped at the configured maximum"),
        ("min_elevation" = Option<f64>, Query, description = "Minimum elevation filter (degrees)"),
        ("norad_id" = Option<u32>, Query, description = "Restrict to one satellite"),
        ("uplink_mhz" = Option<f64>, Query, description = "Uplink frequency for Doppler"),
        ("downlink_mhz" = Option<f64>, Query, description = "Downlink frequency for Doppler")
    ),
    responses(
        (status = 200, description = "Pass predictions", body = PredictResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "Unknown satellite", body = ErrorResponse),
        (status = 503, description = "No satellites loaded or predictions not configured", body = ErrorResponse)
    )
)]
pub async fn list_predictions(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
) -> ApiResult<Json<PredictResponse>> {
    let tle_loader = state
        .tle_loader
        .as_ref()
        .ok_or(ApiError::Unavailable("predictions_not_configured"))?;
    let predict_config = state
        .config
        .predict
        .as_ref()
        .ok_or(ApiError::Unavailable("predictions_not_configured"))?;

    let start = query.start.unwrap_or_else(Utc::now);
    let end = match query.end {
        Some(end) => end,
        None => {
            let window = Duration::from_std(predict_config.default_window)
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            start + window
        }
    };
    if end < start {
        return Err(ApiError::Validation("end must not be before start".into()));
    }
    let max_window = Duration::from_std(predict_config.max_window)
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    if end - start > max_window {
        return Err(ApiError::Validation(format!(
            "window must not exceed {}",
            humantime::format_duration(predict_config.max_window)
        )));
    }

    let options = PassOptions {
        min_elevation_deg: query
            .min_elevation
            .unwrap_or(predict_config.default_min_elevation),
        trajectory_step: Duration::from_std(predict_config.trajectory_step)
            .map_err(|e| ApiError::Validation(e.to_string()))?,
        frequencies: FrequencyPlan::from_mhz(query.uplink_mhz, query.downlink_mhz),
    };

    // SGP4 scanning is CPU bound, keep it off the async workers.
    let tle_loader = Arc::clone(tle_loader);
    let station = state.station;
    let norad_id = query.norad_id;
    let all_passes = tokio::task::spawn_blocking(move || {
        let loader = tle_loader.blocking_read();
        search_passes(&loader, &station, norad_id, start, end, &options)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let satellite_count: HashSet<_> = all_passes.iter().map(|p| p.norad_id).collect();

    Ok(Json(PredictResponse {
        start,
        end,
        passes: all_passes,
        satellite_count: satellite_count.len(),
    }))
}

/// Passes of the selected satellites, ordered by AOS.
fn search_passes(
    loader: &TleLoader,
    station: &GroundStation,
    norad_id: Option<u32>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    options: &PassOptions,
) -> ApiResult<Vec<Pass>> {
    let satellites = select_satellites(loader, norad_id)?;

    let mut all_passes = Vec::new();
    for sat in satellites {
        match predict_passes(station, sat, start, end, options) {
            Ok(passes) => all_passes.extend(passes),
            Err(e) => {
                log::warn!("Failed to predict passes for {}: {}", sat.info.name, e);
            }
        }
    }

    all_passes.sort_by_key(|p| p.aos);
    Ok(all_passes)
}

fn select_satellites(
    loader: &TleLoader,
    norad_id: Option<u32>,
) -> ApiResult<Vec<&TleEntry>> {
    match norad_id {
        Some(id) => loader
            .get(id)
            .map(|sat| vec![sat])
            .ok_or(ApiError::NotFound("satellite_not_found")),
        None => {
            let satellites = loader.satellites();
            if satellites.is_empty() {
                return Err(ApiError::Unavailable("no_satellites_loaded"));
            }
            Ok(satellites)
        }
    }
}

fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    s.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    })
    .transpose()
}
