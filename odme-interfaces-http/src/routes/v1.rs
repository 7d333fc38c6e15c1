use axum::routing::{get, post};
use axum::Router;

use odme_application::AppState;

use crate::handlers::{anomaly_handlers, ops_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ops_handlers::service_banner))
        .route(
            "/v1/anomalies",
            get(anomaly_handlers::list_anomalies).post(anomaly_handlers::ingest_anomaly),
        )
        .route(
            "/v1/anomalies/summary",
            get(anomaly_handlers::anomaly_summary),
        )
        .route(
            "/v1/anomalies/:anomaly_id/report",
            post(anomaly_handlers::attach_report),
        )
        .route(
            "/v1/anomalies/:anomaly_id/resolve",
            post(anomaly_handlers::resolve_anomaly),
        )
        .route("/v1/ops/health/live", get(ops_handlers::health_live))
        .route("/v1/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v1/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
