use crate::validation::drop_blank;
use crate::{AppError, AppState};
use odme_domain::{Anomaly, AnomalyQuery, AnomalySummary};

pub async fn list_anomalies(
    state: &AppState,
    query: AnomalyQuery,
) -> Result<Vec<Anomaly>, AppError> {
    // A blank category means "no filter"; any other value must match exactly.
    let query = AnomalyQuery {
        category: drop_blank(query.category),
        min_threat: query.min_threat,
    };
    state
        .anomaly_repo
        .list_anomalies_with_attributes(&query)
        .await
        .map_err(|err| state.storage_failure("failed to fetch anomalies", err))
}

pub async fn anomaly_summary(state: &AppState) -> Result<AnomalySummary, AppError> {
    state
        .anomaly_repo
        .fetch_summary()
        .await
        .map_err(|err| state.storage_failure("failed to fetch anomaly summary", err))
}
