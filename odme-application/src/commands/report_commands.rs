use anyhow::anyhow;
use chrono::Utc;
use tracing::{info, warn};

use crate::validation::require_text;
use crate::{AppError, AppState};
use odme_domain::{AgentReport, NewAgentReport};

/// Files an agent report against an existing anomaly.
pub async fn attach_report(
    state: &AppState,
    anomaly_id: &str,
    report: NewAgentReport,
) -> Result<AgentReport, AppError> {
    let exists = state
        .anomaly_repo
        .find_anomaly(anomaly_id)
        .await
        .map_err(|err| state.storage_failure("failed to look up anomaly", err))?
        .is_some();
    if !exists {
        return Err(AppError::NotFound);
    }
    require_text("agent_name", &report.agent_name)?;

    let mut tx = state
        .anomaly_repo
        .begin()
        .await
        .map_err(|err| state.storage_failure("failed to open report transaction", err))?;
    let report_id = match tx.insert_report(anomaly_id, &report, Utc::now()).await {
        Ok(id) => id,
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("failed to roll back report: {:#}", rollback_err);
            }
            return Err(state.storage_failure("failed to store agent report", err));
        }
    };
    tx.commit()
        .await
        .map_err(|err| state.storage_failure("failed to commit agent report", err))?;

    let stored = state
        .anomaly_repo
        .find_report(&report_id)
        .await
        .and_then(|found| found.ok_or_else(|| anyhow!("report {} missing after commit", report_id)))
        .map_err(|err| state.storage_failure("failed to read back agent report", err))?;

    state.metrics.record_report();
    info!(
        anomaly_id = %stored.anomaly_id,
        report_id = %stored.id,
        agent = %stored.agent_name,
        "agent report attached"
    );
    Ok(stored)
}
