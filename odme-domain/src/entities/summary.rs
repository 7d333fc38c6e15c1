use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub total_anomalies: u64,
    pub unresolved_anomalies: u64,
    pub most_common_category: Option<String>,
    /// Average over unresolved anomalies only.
    pub avg_threat_level: Option<f64>,
}
