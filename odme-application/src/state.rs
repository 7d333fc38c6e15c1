use std::sync::Arc;

use odme_domain::ports::AnomalyRepository;
use odme_domain::{RuntimeConfig, ScoringTable};

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub anomaly_repo: Arc<dyn AnomalyRepository>,
    pub scoring: Arc<ScoringTable>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Logs a persistence error with its full chain and wraps it into the
    /// generic storage failure returned to callers.
    pub(crate) fn storage_failure(&self, context: &'static str, err: anyhow::Error) -> crate::AppError {
        tracing::error!("{}: {:#}", context, err);
        self.metrics.record_storage_failure();
        crate::AppError::Storage(err.context(context))
    }
}
