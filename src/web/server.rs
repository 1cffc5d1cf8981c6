use axum::{routing::get, routing::post, Router};
use std::io;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::predict::{GroundStation, TleLoader};

use super::api::predict as predict_handlers;
use super::api::tools as tool_handlers;
use super::api_doc::ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub station: GroundStation,
    pub tle_loader: Option<Arc<RwLock<TleLoader>>>,
}

impl AppState {
    pub fn new(config: Config) -> io::Result<Self> {
        let station = config
            .station
            .ground_station()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        // Predictions are only served when a TLE folder is configured
        let tle_loader = if let Some(ref predict_config) = config.predict {
            let mut loader = TleLoader::new(predict_config.tle_folder.clone());
            if let Err(e) = loader.load_all() {
                log::warn!("Failed to initialize TLE loader: {}", e);
            }
            Some(Arc::new(RwLock::new(loader)))
        } else {
            None
        };

        Ok(AppState {
            config: Arc::new(config),
            station,
            tle_loader,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Locator endpoints
        .route("/api/locator/encode", get(tool_handlers::encode_locator))
        .route(
            "/api/locator/decode/{locator}",
            get(tool_handlers::decode_locator),
        )
        .route("/api/locator/distance", get(tool_handlers::locator_distance))
        // RF endpoints
        .route("/api/doppler", get(tool_handlers::doppler))
        .route("/api/los", post(tool_handlers::line_of_sight))
        .route("/api/cables", get(tool_handlers::list_cables))
        .route("/api/cables/{id}/loss", get(tool_handlers::cable_loss))
        // Predict endpoints
        .route("/api/satellites", get(predict_handlers::list_satellites))
        .route("/api/predict", get(predict_handlers::list_predictions))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let state = AppState::new(config)?;
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
