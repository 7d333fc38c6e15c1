// Agent report entity
// Append-only note filed by an agent against an existing anomaly

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReport {
    pub id: String,
    pub anomaly_id: String,
    pub agent_name: String,
    pub summary: Option<String>,
    pub report_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAgentReport {
    pub agent_name: String,
    pub summary: Option<String>,
}
