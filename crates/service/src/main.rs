use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use freight_quote_core::{
    load_path, Coordinates, CostBreakdown, OriginSite, QuoteConfig, QuoteEngine, QuoteError,
    DEFAULT_CONFIG,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<QuoteEngine>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let config_path =
        std::env::var("FREIGHTQ_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let config = QuoteConfig::load(&PathBuf::from(config_path))?;
    // The dataset must load before anything is served.
    let store = load_path(&config.dataset)?;
    let state = AppState {
        engine: Arc::new(QuoteEngine::new(store)),
    };
    let app = router(state);
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening" = %addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/origins", get(handle_origins))
        .route("/quote", post(handle_quote))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct QuoteRequest {
    fob: String,
    #[serde(default)]
    destination_name: String,
    distance_km: f64,
    dest_lat: Option<f64>,
    dest_lon: Option<f64>,
}

#[derive(Debug, Serialize)]
struct QuoteResponse {
    distance_km: f64,
    basis: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<Coordinates>,
    costs: CostBreakdown,
}

async fn healthz() -> &'static str {
    "ok"
}

async fn handle_origins(State(state): State<AppState>) -> Json<Vec<OriginSite>> {
    Json(state.engine.store().origin_sites().to_vec())
}

async fn handle_quote(
    State(state): State<AppState>,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    let resolution =
        state
            .engine
            .resolve_known_origin(&body.fob, &body.destination_name, body.distance_km)?;
    let destination = match (body.dest_lat, body.dest_lon) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
        _ => None,
    };
    info!(
        fob = %body.fob,
        destination = %body.destination_name,
        basis = resolution.basis(),
        "quote served"
    );
    Ok(Json(QuoteResponse {
        distance_km: body.distance_km,
        basis: resolution.basis(),
        destination,
        costs: resolution.into_breakdown(),
    }))
}

#[derive(Debug, Error)]
enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<QuoteError> for AppError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::UnknownOrigin(_) => Self::BadRequest("FOB not found in dataset".to_string()),
            err if err.is_rejected_input() => Self::BadRequest(err.to_string()),
            err => Self::Internal(err.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                warn!("rejected_request" = %msg);
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Internal(err) => {
                error!("internal_error" = %err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal error" })),
                )
                    .into_response()
            }
        }
    }
}
