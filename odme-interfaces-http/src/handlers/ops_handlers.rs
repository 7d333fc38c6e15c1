use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tokio::time::{timeout, Duration};
use tracing::error;

use odme_application::dtos::MessageOut;
use odme_application::AppState;

pub async fn service_banner() -> Json<MessageOut> {
    Json(MessageOut::new("ODME API is running"))
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

/// Ready once the anomaly store answers a ping within the request timeout.
pub async fn health_ready(State(state): State<AppState>) -> StatusCode {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    match timeout(timeout_duration, state.anomaly_repo.ping()).await {
        Ok(Ok(_)) => StatusCode::OK,
        Ok(Err(err)) => {
            error!("anomaly store is not ready: {:#}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            error!("anomaly store did not answer ping within {}s", timeout_secs);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// ODME counters in the Prometheus text exposition format.
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload)
}
