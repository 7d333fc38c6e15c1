use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    anomalies_ingested: AtomicU64,
    attributes_ingested: AtomicU64,
    reports_attached: AtomicU64,
    anomalies_resolved: AtomicU64,
    storage_failures: AtomicU64,
}

impl Metrics {
    pub fn record_ingest(&self, attribute_count: usize) {
        self.anomalies_ingested.fetch_add(1, Ordering::Relaxed);
        self.attributes_ingested
            .fetch_add(attribute_count as u64, Ordering::Relaxed);
    }

    pub fn record_report(&self) {
        self.reports_attached.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resolve(&self) {
        self.anomalies_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_storage_failure(&self) {
        self.storage_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let ingested = self.anomalies_ingested.load(Ordering::Relaxed);
        let attributes = self.attributes_ingested.load(Ordering::Relaxed);
        let reports = self.reports_attached.load(Ordering::Relaxed);
        let resolved = self.anomalies_resolved.load(Ordering::Relaxed);
        let failures = self.storage_failures.load(Ordering::Relaxed);

        format!(
            "# TYPE odme_anomalies_ingested_total counter\n\
odme_anomalies_ingested_total {}\n\
# TYPE odme_attributes_ingested_total counter\n\
odme_attributes_ingested_total {}\n\
# TYPE odme_reports_attached_total counter\n\
odme_reports_attached_total {}\n\
# TYPE odme_anomalies_resolved_total counter\n\
odme_anomalies_resolved_total {}\n\
# TYPE odme_storage_failures_total counter\n\
odme_storage_failures_total {}\n",
            ingested, attributes, reports, resolved, failures
        )
    }
}
