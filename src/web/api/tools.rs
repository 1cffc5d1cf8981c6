use axum::{
    extract::{Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::doppler::{calculate_doppler, DopplerShift};
use crate::geo::GeoPoint;
use crate::locator::{locator_bounds, to_lat_lon, to_locator, LocatorPrecision};
use crate::los::{analyze, ElevationPoint, LinkParams, LosAnalysis};
use crate::rf::coax::power_after_loss_w;
use crate::rf::{cable_by_id, calculate_cable_loss, RfError, CABLES};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct EncodeQuery {
    pub lat: f64,
    pub lon: f64,
    /// 4 or 6 characters, defaults to 6.
    #[serde(default)]
    pub precision: Option<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EncodeResponse {
    pub locator: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DecodeResponse {
    pub locator: String,
    pub center: GeoPoint,
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DistanceQuery {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DistanceResponse {
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    pub bearing_deg: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DopplerQuery {
    /// Positive when the satellite recedes.
    pub range_rate: f64,
    #[serde(default)]
    pub uplink_mhz: Option<f64>,
    #[serde(default)]
    pub downlink_mhz: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LosRequest {
    pub profile: Vec<ElevationPoint>,
    pub link: LinkParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CableSummary {
    pub id: String,
    pub name: String,
    pub impedance_ohms: f64,
    pub velocity_factor: f64,
    pub outer_diameter_mm: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CableLossQuery {
    pub frequency_mhz: f64,
    pub length_m: f64,
    #[serde(default)]
    pub power_w: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CableLossResponse {
    pub cable: String,
    pub frequency_mhz: f64,
    pub length_m: f64,
    pub loss_per_100m_db: f64,
    pub loss_db: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_out_w: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/api/locator/encode",
    tag = "locator",
    params(
        ("lat" = f64, Query, description = "Latitude in degrees"),
        ("lon" = f64, Query, description = "Longitude in degrees"),
        ("precision" = Option<u8>, Query, description = "Locator length, 4 or 6")
    ),
    responses(
        (status = 200, description = "Locator for the coordinate", body = EncodeResponse),
        (status = 400, description = "Coordinate or precision out of range", body = ErrorResponse)
    )
)]
pub async fn encode_locator(Query(query): Query<EncodeQuery>) -> ApiResult<Json<EncodeResponse>> {
    let precision = match query.precision {
        Some(chars) => LocatorPrecision::try_from(chars)?,
        None => LocatorPrecision::default(),
    };
    let locator = to_locator(query.lat, query.lon, precision)?;

    Ok(Json(EncodeResponse {
        locator,
        latitude: query.lat,
        longitude: query.lon,
    }))
}

#[utoipa::path(
    get,
    path = "/api/locator/decode/{locator}",
    tag = "locator",
    params(("locator" = String, Path, description = "4 or 6 character locator")),
    responses(
        (status = 200, description = "Cell centre and corners", body = DecodeResponse),
        (status = 400, description = "Malformed locator", body = ErrorResponse)
    )
)]
pub async fn decode_locator(Path(locator): Path<String>) -> ApiResult<Json<DecodeResponse>> {
    let invalid = || ApiError::Validation(format!("invalid locator: {}", locator));
    let center = to_lat_lon(&locator).ok_or_else(invalid)?;
    let (south_west, north_east) = locator_bounds(&locator).ok_or_else(invalid)?;

    Ok(Json(DecodeResponse {
        locator: normalize(&locator),
        center,
        south_west,
        north_east,
    }))
}

#[utoipa::path(
    get,
    path = "/api/locator/distance",
    tag = "locator",
    params(
        ("from" = String, Query, description = "Origin locator"),
        ("to" = String, Query, description = "Destination locator")
    ),
    responses(
        (status = 200, description = "Distance and bearing between cell centres", body = DistanceResponse),
        (status = 400, description = "Malformed locator", body = ErrorResponse)
    )
)]
pub async fn locator_distance(
    Query(query): Query<DistanceQuery>,
) -> ApiResult<Json<DistanceResponse>> {
    let from = to_lat_lon(&query.from)
        .ok_or_else(|| ApiError::Validation(format!("invalid locator: {}", query.from)))?;
    let to = to_lat_lon(&query.to)
        .ok_or_else(|| ApiError::Validation(format!("invalid locator: {}", query.to)))?;

    Ok(Json(DistanceResponse {
        from: normalize(&query.from),
        to: normalize(&query.to),
        distance_km: from.distance_km(&to),
        bearing_deg: from.bearing_deg(&to),
    }))
}

#[utoipa::path(
    get,
    path = "/api/doppler",
    tag = "rf",
    params(
        ("range_rate" = f64, Query, description = "Range rate in km/s, negative when approaching"),
        ("uplink_mhz" = Option<f64>, Query, description = "Uplink frequency in MHz"),
        ("downlink_mhz" = Option<f64>, Query, description = "Downlink frequency in MHz")
    ),
    responses(
        (status = 200, description = "Doppler shifts", body = DopplerShift)
    )
)]
pub async fn doppler(Query(query): Query<DopplerQuery>) -> Json<DopplerShift> {
    Json(calculate_doppler(
        query.uplink_mhz,
        query.downlink_mhz,
        query.range_rate,
    ))
}

#[utoipa::path(
    post,
    path = "/api/los",
    tag = "rf",
    request_body = LosRequest,
    responses(
        (status = 200, description = "Line-of-sight analysis", body = LosAnalysis),
        (status = 400, description = "Invalid link parameters", body = ErrorResponse)
    )
)]
pub async fn line_of_sight(Json(request): Json<LosRequest>) -> ApiResult<Json<LosAnalysis>> {
    let link = &request.link;
    if !(link.frequency_mhz > 0.0) {
        return Err(ApiError::Validation(
            "frequency_mhz must be positive".into(),
        ));
    }
    if link.tx_height_m < 0.0 || link.rx_height_m < 0.0 {
        return Err(ApiError::Validation(
            "antenna heights must not be negative".into(),
        ));
    }

    Ok(Json(analyze(&request.profile, link)))
}

#[utoipa::path(
    get,
    path = "/api/cables",
    tag = "rf",
    responses(
        (status = 200, description = "Known coaxial cables", body = Vec<CableSummary>)
    )
)]
pub async fn list_cables() -> Json<Vec<CableSummary>> {
    Json(
        CABLES
            .iter()
            .map(|c| CableSummary {
                id: c.id.to_string(),
                name: c.name.to_string(),
                impedance_ohms: c.impedance_ohms,
                velocity_factor: c.velocity_factor,
                outer_diameter_mm: c.outer_diameter_mm,
            })
            .collect(),
    )
}

#[utoipa::path(
    get,
    path = "/api/cables/{id}/loss",
    tag = "rf",
    params(
        ("id" = String, Path, description = "Cable identifier, e.g. rg213"),
        ("frequency_mhz" = f64, Query, description = "Frequency in MHz"),
        ("length_m" = f64, Query, description = "Cable length in metres"),
        ("power_w" = Option<f64>, Query, description = "Input power in watts")
    ),
    responses(
        (status = 200, description = "Cable loss", body = CableLossResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "Unknown cable", body = ErrorResponse)
    )
)]
pub async fn cable_loss(
    Path(id): Path<String>,
    Query(query): Query<CableLossQuery>,
) -> ApiResult<Json<CableLossResponse>> {
    let cable = cable_by_id(&id).ok_or_else(|| RfError::UnknownCable(id.clone()))?;
    if !(query.frequency_mhz > 0.0) || query.length_m < 0.0 {
        return Err(ApiError::Validation(
            "frequency_mhz must be positive and length_m not negative".into(),
        ));
    }

    let loss_db = calculate_cable_loss(cable, query.frequency_mhz, query.length_m);

    Ok(Json(CableLossResponse {
        cable: cable.id.to_string(),
        frequency_mhz: query.frequency_mhz,
        length_m: query.length_m,
        loss_per_100m_db: cable.loss_per_100m_db(query.frequency_mhz),
        loss_db,
        power_out_w: query.power_w.map(|p| power_after_loss_w(p, loss_db)),
    }))
}

fn normalize(locator: &str) -> String {
    locator
        .char_indices()
        .map(|(i, c)| {
            if i < 4 {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::los::LosStatus;
    use approx::assert_abs_diff_eq;

    #[tokio::test]
    async fn encodes_and_decodes() {
        let Json(encoded) = encode_locator(Query(EncodeQuery {
            lat: 38.7223,
            lon: -9.1393,
            precision: None,
        }))
        .await
        .unwrap();
        assert_eq!(encoded.locator, "IM58kr");

        let Json(decoded) = decode_locator(Path("im58KR".to_string())).await.unwrap();
        assert_eq!(decoded.locator, "IM58kr");
        assert!(decoded.south_west.latitude < decoded.center.latitude);
        assert!(decoded.north_east.longitude > decoded.center.longitude);
    }

    #[tokio::test]
    async fn rejects_bad_locator_input() {
        let err = encode_locator(Query(EncodeQuery {
            lat: 95.0,
            lon: 0.0,
            precision: None,
        }))
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = encode_locator(Query(EncodeQuery {
            lat: 0.0,
            lon: 0.0,
            precision: Some(5),
        }))
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        assert!(decode_locator(Path("ZZ99".to_string())).await.is_err());
    }

    #[tokio::test]
    async fn distance_between_locators() {
        let Json(result) = locator_distance(Query(DistanceQuery {
            from: "IM58".into(),
            to: "in80".into(),
        }))
        .await
        .unwrap();
        assert_eq!(result.to, "IN80");
        assert!(result.distance_km > 400.0 && result.distance_km < 600.0);
        assert!(result.bearing_deg > 45.0 && result.bearing_deg < 90.0);
    }

    #[tokio::test]
    async fn doppler_downlink_only() {
        let Json(shift) = doppler(Query(DopplerQuery {
            range_rate: -7.0,
            uplink_mhz: None,
            downlink_mhz: Some(145.8),
        }))
        .await;
        assert!(shift.approaching);
        assert!(shift.uplink_shift_hz.is_none());
        assert_abs_diff_eq!(shift.downlink_shift_hz.unwrap(), 3404.4, epsilon = 0.5);
    }

    #[tokio::test]
    async fn line_of_sight_over_flat_ground() {
        let profile = (0..=10)
            .map(|i| ElevationPoint {
                distance_km: i as f64,
                elevation_m: 0.0,
                latitude: 0.0,
                longitude: 0.0,
            })
            .collect();
        let link = LinkParams {
            tx_height_m: 30.0,
            rx_height_m: 30.0,
            frequency_mhz: 145.0,
        };
        let Json(analysis) = line_of_sight(Json(LosRequest { profile, link }))
            .await
            .unwrap();
        assert_eq!(analysis.status, LosStatus::Clear);

        let bad = LinkParams {
            frequency_mhz: 0.0,
            ..link
        };
        let err = line_of_sight(Json(LosRequest {
            profile: Vec::new(),
            link: bad,
        }))
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn cable_catalogue_and_loss() {
        let Json(cables) = list_cables().await;
        assert_eq!(cables.len(), CABLES.len());
        assert!(cables.iter().any(|c| c.id == "rg213"));

        let Json(loss) = cable_loss(
            Path("RG213".to_string()),
            Query(CableLossQuery {
                frequency_mhz: 145.0,
                length_m: 20.0,
                power_w: Some(100.0),
            }),
        )
        .await
        .unwrap();
        assert_eq!(loss.cable, "rg213");
        assert_abs_diff_eq!(loss.loss_db, loss.loss_per_100m_db / 5.0, epsilon = 1e-9);
        let out = loss.power_out_w.unwrap();
        assert!(out > 0.0 && out < 100.0);

        let err = cable_loss(
            Path("rg999".to_string()),
            Query(CableLossQuery {
                frequency_mhz: 145.0,
                length_m: 20.0,
                power_w: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
