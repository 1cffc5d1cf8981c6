use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::predict::{PredictResponse, SatelliteSummary};
use super::api::tools::{
    CableLossResponse, CableSummary, DecodeResponse, DistanceResponse, EncodeResponse, LosRequest,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::tools::encode_locator,
        super::api::tools::decode_locator,
        super::api::tools::locator_distance,
        super::api::tools::doppler,
        super::api::tools::line_of_sight,
        super::api::tools::list_cables,
        super::api::tools::cable_loss,
        super::api::predict::list_satellites,
        super::api::predict::list_predictions,
    ),
    components(
        schemas(
            EncodeResponse,
            DecodeResponse,
            DistanceResponse,
            LosRequest,
            CableSummary,
            CableLossResponse,
            SatelliteSummary,
            PredictResponse,
            ErrorResponse,
            crate::geo::GeoPoint,
            crate::doppler::DopplerShift,
            crate::los::ElevationPoint,
            crate::los::LinkParams,
            crate::los::LosAnalysis,
            crate::los::LosPoint,
            crate::los::LosStatus,
            crate::predict::Pass,
            crate::predict::PassQuality,
            crate::predict::TrajectoryPoint,
            crate::predict::SatelliteInfo,
        )
    ),
    info(
        title = "qthkit API",
        description = "Ham radio station tools: locators, RF calculations and satellite pass predictions",
        version = "0.1.0"
    ),
    tags(
        (name = "locator", description = "Maidenhead grid locators"),
        (name = "rf", description = "Doppler, line of sight and feedline calculations"),
        (name = "predict", description = "Satellite pass predictions")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/locator/encode",
            "/api/locator/decode/{locator}",
            "/api/locator/distance",
            "/api/doppler",
            "/api/los",
            "/api/cables",
            "/api/cables/{id}/loss",
            "/api/satellites",
            "/api/predict",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
