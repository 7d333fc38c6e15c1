// In-memory store used by the application tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::{AppState, Metrics};
use odme_domain::ports::{AnomalyRepository, UnitOfWork};
use odme_domain::{
    AgentReport,
    Anomaly,
    AnomalyAttribute,
    AnomalyQuery,
    AnomalySummary,
    NewAgentReport,
    NewAnomaly,
    NewAttribute,
    RuntimeConfig,
    ScoringTable,
    ThreatLevel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    InsertAttribute,
    InsertReport,
    MarkResolved,
    Commit,
}

#[derive(Default)]
struct StoreState {
    anomalies: Vec<Anomaly>,
    reports: Vec<AgentReport>,
    next_id: u64,
    next_attr_id: i64,
    begins: usize,
    commits: usize,
    rollbacks: usize,
}

impl StoreState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<StoreState>>,
    fail: Option<FailPoint>,
}

pub fn sample_anomaly() -> NewAnomaly {
    NewAnomaly {
        category: "Elementál".to_string(),
        location: "Černé jezero, Šumava".to_string(),
        detected_at: detected_at(),
        attributes: vec![
            NewAttribute::new("puvod", "Slovanský"),
            NewAttribute::new("entita", "Vodník"),
            NewAttribute::new("agresivita", "3"),
            NewAttribute::new("agresivita_odhad", "vysoká"),
        ],
    }
}

fn detected_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 24, 22, 15, 0)
        .single()
        .expect("valid timestamp")
}

impl FakeStore {
    pub fn failing_at(fail: FailPoint) -> Self {
        Self {
            fail: Some(fail),
            ..Self::default()
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            config: RuntimeConfig {
                bind_addr: "127.0.0.1:0".to_string(),
                scoring_table_path: "scoring.yaml".to_string(),
                max_body_bytes: 1024 * 1024,
                request_timeout_seconds: 15,
            },
            anomaly_repo: Arc::new(self.clone()),
            scoring: Arc::new(ScoringTable::default()),
            metrics: Arc::new(Metrics::default()),
        }
    }

    /// Inserts a committed anomaly directly, bypassing the transaction counters.
    pub fn seed_anomaly(&self, category: &str, threat_level: i64, is_resolved: bool) -> String {
        let mut state = self.lock();
        let id = state.next_id("anomaly");
        state.anomalies.push(Anomaly {
            id: id.clone(),
            category: category.to_string(),
            location: "Šumava".to_string(),
            detected_at: detected_at(),
            threat_level: ThreatLevel::clamped(i128::from(threat_level)),
            is_resolved,
            attributes: Vec::new(),
        });
        id
    }

    pub fn begins(&self) -> usize {
        self.lock().begins
    }

    pub fn commits(&self) -> usize {
        self.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.lock().rollbacks
    }

    pub fn anomaly_count(&self) -> usize {
        self.lock().anomalies.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.lock()
            .anomalies
            .iter()
            .map(|anomaly| anomaly.attributes.len())
            .sum()
    }

    pub fn report_count(&self) -> usize {
        self.lock().reports.len()
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        self.lock()
            .anomalies
            .iter()
            .any(|anomaly| anomaly.id == id && anomaly.is_resolved)
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store lock")
    }
}

#[async_trait]
impl AnomalyRepository for FakeStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn begin(&self) -> anyhow::Result<Box<dyn UnitOfWork>> {
        self.lock().begins += 1;
        Ok(Box::new(FakeUnitOfWork {
            state: self.state.clone(),
            fail: self.fail,
            pending: Vec::new(),
            finished: false,
        }))
    }

    async fn find_anomaly(&self, id: &str) -> anyhow::Result<Option<Anomaly>> {
        Ok(self
            .lock()
            .anomalies
            .iter()
            .find(|anomaly| anomaly.id == id)
            .map(|anomaly| Anomaly {
                attributes: Vec::new(),
                ..anomaly.clone()
            }))
    }

    async fn find_anomaly_with_attributes(&self, id: &str) -> anyhow::Result<Option<Anomaly>> {
        Ok(self.lock().anomalies.iter().find(|anomaly| anomaly.id == id).cloned())
    }

    async fn find_report(&self, id: &str) -> anyhow::Result<Option<AgentReport>> {
        Ok(self.lock().reports.iter().find(|report| report.id == id).cloned())
    }

    async fn list_anomalies_with_attributes(
        &self,
        query: &AnomalyQuery,
    ) -> anyhow::Result<Vec<Anomaly>> {
        Ok(self
            .lock()
            .anomalies
            .iter()
            .filter(|anomaly| {
                query
                    .category
                    .as_ref()
                    .map_or(true, |category| &anomaly.category == category)
            })
            .filter(|anomaly| {
                query
                    .min_threat
                    .map_or(true, |min| i64::from(anomaly.threat_level) >= min)
            })
            .cloned()
            .collect())
    }

    async fn fetch_summary(&self) -> anyhow::Result<AnomalySummary> {
        let state = self.lock();
        let unresolved: Vec<&Anomaly> = state
            .anomalies
            .iter()
            .filter(|anomaly| !anomaly.is_resolved)
            .collect();
        let avg_threat_level = if unresolved.is_empty() {
            None
        } else {
            let total: f64 = unresolved
                .iter()
                .map(|anomaly| f64::from(anomaly.threat_level.value()))
                .sum();
            Some(total / unresolved.len() as f64)
        };

        let mut counts: HashMap<&str, u64> = HashMap::new();
        for anomaly in &state.anomalies {
            *counts.entry(anomaly.category.as_str()).or_default() += 1;
        }
        let most_common_category = counts
            .into_iter()
            .max_by(|(left_name, left), (right_name, right)| {
                left.cmp(right).then_with(|| right_name.cmp(left_name))
            })
            .map(|(category, _)| category.to_string());

        Ok(AnomalySummary {
            total_anomalies: state.anomalies.len() as u64,
            unresolved_anomalies: unresolved.len() as u64,
            most_common_category,
            avg_threat_level,
        })
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

enum PendingWrite {
    Anomaly(Anomaly),
    Attribute(AnomalyAttribute),
    Report(AgentReport),
    Resolve(String),
}

struct FakeUnitOfWork {
    state: Arc<Mutex<StoreState>>,
    fail: Option<FailPoint>,
    pending: Vec<PendingWrite>,
    finished: bool,
}

impl FakeUnitOfWork {
    fn check(&self, point: FailPoint) -> anyhow::Result<()> {
        if self.fail == Some(point) {
            return Err(anyhow!("injected failure at {:?}", point));
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store lock")
    }
}

#[async_trait]
impl UnitOfWork for FakeUnitOfWork {
    async fn insert_anomaly(
        &mut self,
        anomaly: &NewAnomaly,
        threat_level: ThreatLevel,
    ) -> anyhow::Result<String> {
        let id = self.lock().next_id("anomaly");
        self.pending.push(PendingWrite::Anomaly(Anomaly {
            id: id.clone(),
            category: anomaly.category.clone(),
            location: anomaly.location.clone(),
            detected_at: anomaly.detected_at,
            threat_level,
            is_resolved: false,
            attributes: Vec::new(),
        }));
        Ok(id)
    }

    async fn insert_attribute(
        &mut self,
        anomaly_id: &str,
        attribute: &NewAttribute,
    ) -> anyhow::Result<i64> {
        self.check(FailPoint::InsertAttribute)?;
        let id = {
            let mut state = self.lock();
            state.next_attr_id += 1;
            state.next_attr_id
        };
        self.pending.push(PendingWrite::Attribute(AnomalyAttribute {
            id,
            anomaly_id: anomaly_id.to_string(),
            key: attribute.key.clone(),
            value: attribute.value.clone(),
        }));
        Ok(id)
    }

    async fn insert_report(
        &mut self,
        anomaly_id: &str,
        report: &NewAgentReport,
        report_time: DateTime<Utc>,
    ) -> anyhow::Result<String> {
        self.check(FailPoint::InsertReport)?;
        let id = self.lock().next_id("report");
        self.pending.push(PendingWrite::Report(AgentReport {
            id: id.clone(),
            anomaly_id: anomaly_id.to_string(),
            agent_name: report.agent_name.clone(),
            summary: report.summary.clone(),
            report_time,
        }));
        Ok(id)
    }

    async fn mark_resolved(&mut self, anomaly_id: &str) -> anyhow::Result<()> {
        self.check(FailPoint::MarkResolved)?;
        self.pending.push(PendingWrite::Resolve(anomaly_id.to_string()));
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> anyhow::Result<()> {
        self.check(FailPoint::Commit)?;
        let pending = std::mem::take(&mut self.pending);
        {
            let mut state = self.lock();
            for write in pending {
                match write {
                    PendingWrite::Anomaly(anomaly) => state.anomalies.push(anomaly),
                    PendingWrite::Attribute(attribute) => {
                        if let Some(owner) = state
                            .anomalies
                            .iter_mut()
                            .find(|anomaly| anomaly.id == attribute.anomaly_id)
                        {
                            owner.attributes.push(attribute);
                        }
                    }
                    PendingWrite::Report(report) => state.reports.push(report),
                    PendingWrite::Resolve(id) => {
                        if let Some(anomaly) = state.anomalies.iter_mut().find(|anomaly| anomaly.id == id) {
                            anomaly.is_resolved = true;
                        }
                    }
                }
            }
            state.commits += 1;
        }
        self.finished = true;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> anyhow::Result<()> {
        self.pending.clear();
        self.lock().rollbacks += 1;
        self.finished = true;
        Ok(())
    }
}

impl Drop for FakeUnitOfWork {
    fn drop(&mut self) {
        if !self.finished {
            if let Ok(mut state) = self.state.lock() {
                state.rollbacks += 1;
            }
        }
    }
}
