use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use odme_application::{AppState, Metrics};
use odme_domain::ports::{AnomalyRepository, ScoringConfigRepository};
use odme_infrastructure::{
    open_pool, AppConfig, ScoringTableFileRepository, SqliteAnomalyRepository,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    /// Opens the store, migrates it and loads the scoring table.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();

        let pool = open_pool(&db_config)?;
        let repo = Arc::new(SqliteAnomalyRepository::new(pool));
        repo.ensure_schema()
            .await
            .context("failed to prepare database schema")?;
        info!(
            "database ready at {} (pool size {})",
            db_config.database_path, db_config.pool_size
        );

        let scoring_path = &runtime_config.scoring_table_path;
        if !Path::new(scoring_path).exists() {
            warn!("{} not found, using built-in scoring table", scoring_path);
        }
        let scoring = ScoringTableFileRepository::new()
            .load_scoring_table(scoring_path)
            .await?;
        info!(
            "scoring table ready: {} categories, default base {}",
            scoring.category_base.len(),
            scoring.default_base
        );

        let state = AppState {
            config: runtime_config,
            anomaly_repo: repo,
            scoring: Arc::new(scoring),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
