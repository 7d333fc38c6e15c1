use tracing::{info, warn};

use crate::{AppError, AppState};
use odme_domain::ResolveOutcome;

/// Marks an anomaly resolved. Resolving twice is a no-op reported as
/// `AlreadyResolved`.
pub async fn resolve_anomaly(state: &AppState, anomaly_id: &str) -> Result<ResolveOutcome, AppError> {
    let anomaly = state
        .anomaly_repo
        .find_anomaly(anomaly_id)
        .await
        .map_err(|err| state.storage_failure("failed to look up anomaly", err))?
        .ok_or(AppError::NotFound)?;
    if anomaly.is_resolved {
        return Ok(ResolveOutcome::AlreadyResolved);
    }

    let mut tx = state
        .anomaly_repo
        .begin()
        .await
        .map_err(|err| state.storage_failure("failed to open resolve transaction", err))?;
    if let Err(err) = tx.mark_resolved(anomaly_id).await {
        if let Err(rollback_err) = tx.rollback().await {
            warn!("failed to roll back resolve: {:#}", rollback_err);
        }
        return Err(state.storage_failure("failed to mark anomaly resolved", err));
    }
    tx.commit()
        .await
        .map_err(|err| state.storage_failure("failed to commit resolve", err))?;

    state.metrics.record_resolve();
    info!(anomaly_id = %anomaly_id, "anomaly resolved");
    Ok(ResolveOutcome::Resolved)
}
