use anyhow::anyhow;
use tracing::{info, warn};

use crate::validation::require_text;
use crate::{AppError, AppState};
use odme_domain::ports::UnitOfWork;
use odme_domain::{Anomaly, NewAnomaly, ThreatLevel};

/// Scores and stores a new anomaly with all of its attributes in one
/// transaction, then returns the stored record.
pub async fn ingest_anomaly(state: &AppState, anomaly: NewAnomaly) -> Result<Anomaly, AppError> {
    require_text("category", &anomaly.category)?;
    require_text("location", &anomaly.location)?;

    let threat_level = state.scoring.score(&anomaly.category, &anomaly.attributes);

    let mut tx = state
        .anomaly_repo
        .begin()
        .await
        .map_err(|err| state.storage_failure("failed to open ingest transaction", err))?;
    let anomaly_id = match write_anomaly(tx.as_mut(), &anomaly, threat_level).await {
        Ok(id) => id,
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("failed to roll back ingest: {:#}", rollback_err);
            }
            return Err(state.storage_failure("failed to store anomaly", err));
        }
    };
    tx.commit()
        .await
        .map_err(|err| state.storage_failure("failed to commit anomaly", err))?;

    let stored = state
        .anomaly_repo
        .find_anomaly_with_attributes(&anomaly_id)
        .await
        .and_then(|found| found.ok_or_else(|| anyhow!("anomaly {} missing after commit", anomaly_id)))
        .map_err(|err| state.storage_failure("failed to read back anomaly", err))?;

    state.metrics.record_ingest(stored.attributes.len());
    info!(
        anomaly_id = %stored.id,
        category = %stored.category,
        threat_level = %stored.threat_level,
        attributes = stored.attributes.len(),
        "anomaly ingested"
    );
    Ok(stored)
}

async fn write_anomaly(
    tx: &mut dyn UnitOfWork,
    anomaly: &NewAnomaly,
    threat_level: ThreatLevel,
) -> anyhow::Result<String> {
    let anomaly_id = tx.insert_anomaly(anomaly, threat_level).await?;
    for attribute in &anomaly.attributes {
        tx.insert_attribute(&anomaly_id, attribute).await?;
    }
    Ok(anomaly_id)
}
