use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    AgentReport,
    Anomaly,
    AnomalyQuery,
    AnomalySummary,
    NewAgentReport,
    NewAnomaly,
    NewAttribute,
};
use crate::services::ScoringTable;
use crate::value_objects::ThreatLevel;

#[async_trait]
pub trait AnomalyRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;

    /// Opens a transaction scope. Dropping the returned unit of work without
    /// committing rolls every write in it back.
    async fn begin(&self) -> anyhow::Result<Box<dyn UnitOfWork>>;

    /// Loads the anomaly row only; `attributes` is left empty.
    async fn find_anomaly(&self, id: &str) -> anyhow::Result<Option<Anomaly>>;
    async fn find_anomaly_with_attributes(&self, id: &str) -> anyhow::Result<Option<Anomaly>>;
    async fn find_report(&self, id: &str) -> anyhow::Result<Option<AgentReport>>;
    async fn list_anomalies_with_attributes(
        &self,
        query: &AnomalyQuery,
    ) -> anyhow::Result<Vec<Anomaly>>;
    async fn fetch_summary(&self) -> anyhow::Result<AnomalySummary>;
    async fn ping(&self) -> anyhow::Result<()>;
}

/// Writes performed inside a single store transaction.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Inserts an unresolved anomaly and returns its generated id.
    async fn insert_anomaly(
        &mut self,
        anomaly: &NewAnomaly,
        threat_level: ThreatLevel,
    ) -> anyhow::Result<String>;
    async fn insert_attribute(
        &mut self,
        anomaly_id: &str,
        attribute: &NewAttribute,
    ) -> anyhow::Result<i64>;
    async fn insert_report(
        &mut self,
        anomaly_id: &str,
        report: &NewAgentReport,
        report_time: DateTime<Utc>,
    ) -> anyhow::Result<String>;
    async fn mark_resolved(&mut self, anomaly_id: &str) -> anyhow::Result<()>;
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ScoringConfigRepository: Send + Sync {
    async fn load_scoring_table(&self, path: &str) -> anyhow::Result<ScoringTable>;
}
