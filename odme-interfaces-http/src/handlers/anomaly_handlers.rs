use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use odme_application::commands::{ingest_commands, report_commands, resolve_commands};
use odme_application::dtos::{
    AgentReportIn,
    AgentReportOut,
    AnomalyIn,
    AnomalyOut,
    AnomalyQueryParams,
    AnomalySummaryOut,
    MessageOut,
};
use odme_application::queries::anomaly_queries;
use odme_application::AppState;

use crate::error::HttpError;

pub async fn ingest_anomaly(
    State(state): State<AppState>,
    Json(payload): Json<AnomalyIn>,
) -> Result<(StatusCode, Json<AnomalyOut>), HttpError> {
    let anomaly = ingest_commands::ingest_anomaly(&state, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(anomaly.into())))
}

pub async fn list_anomalies(
    State(state): State<AppState>,
    Query(params): Query<AnomalyQueryParams>,
) -> Result<Json<Vec<AnomalyOut>>, HttpError> {
    let anomalies = anomaly_queries::list_anomalies(&state, params.into()).await?;
    Ok(Json(anomalies.into_iter().map(AnomalyOut::from).collect()))
}

pub async fn anomaly_summary(
    State(state): State<AppState>,
) -> Result<Json<AnomalySummaryOut>, HttpError> {
    let summary = anomaly_queries::anomaly_summary(&state).await?;
    Ok(Json(summary.into()))
}

pub async fn attach_report(
    State(state): State<AppState>,
    Path(anomaly_id): Path<String>,
    Json(payload): Json<AgentReportIn>,
) -> Result<(StatusCode, Json<AgentReportOut>), HttpError> {
    let report = report_commands::attach_report(&state, &anomaly_id, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(report.into())))
}

pub async fn resolve_anomaly(
    State(state): State<AppState>,
    Path(anomaly_id): Path<String>,
) -> Result<Json<MessageOut>, HttpError> {
    let outcome = resolve_commands::resolve_anomaly(&state, &anomaly_id).await?;
    Ok(Json(MessageOut::new(outcome.message())))
}
