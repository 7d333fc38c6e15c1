// Transport DTOs
// Wire names follow the localized field vocabulary; the English names are
// accepted on input as aliases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use odme_domain::{
    AgentReport,
    Anomaly,
    AnomalyAttribute,
    AnomalyQuery,
    AnomalySummary,
    NewAgentReport,
    NewAnomaly,
    NewAttribute,
};

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeIn {
    #[serde(rename = "klic", alias = "key")]
    pub key: String,
    #[serde(rename = "hodnota", alias = "value")]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnomalyIn {
    #[serde(rename = "kategorie", alias = "category")]
    pub category: String,
    #[serde(rename = "lokace", alias = "location")]
    pub location: String,
    #[serde(rename = "cas_detekce", alias = "detected_at")]
    pub detected_at: DateTime<Utc>,
    #[serde(rename = "atributy", alias = "attributes")]
    pub attributes: Vec<AttributeIn>,
}

impl From<AnomalyIn> for NewAnomaly {
    fn from(input: AnomalyIn) -> Self {
        NewAnomaly {
            category: input.category,
            location: input.location,
            detected_at: input.detected_at,
            attributes: input
                .attributes
                .into_iter()
                .map(|attr| NewAttribute::new(attr.key, attr.value))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttributeOut {
    pub id: i64,
    #[serde(rename = "klic")]
    pub key: String,
    #[serde(rename = "hodnota")]
    pub value: String,
}

impl From<AnomalyAttribute> for AttributeOut {
    fn from(attr: AnomalyAttribute) -> Self {
        AttributeOut {
            id: attr.id,
            key: attr.key,
            value: attr.value,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnomalyOut {
    pub id: String,
    #[serde(rename = "kategorie")]
    pub category: String,
    #[serde(rename = "lokace")]
    pub location: String,
    #[serde(rename = "cas_detekce")]
    pub detected_at: DateTime<Utc>,
    #[serde(rename = "uroven_hrozby")]
    pub threat_level: u8,
    #[serde(rename = "je_vyresen")]
    pub is_resolved: bool,
    #[serde(rename = "atributy")]
    pub attributes: Vec<AttributeOut>,
}

impl From<Anomaly> for AnomalyOut {
    fn from(anomaly: Anomaly) -> Self {
        AnomalyOut {
            id: anomaly.id,
            category: anomaly.category,
            location: anomaly.location,
            detected_at: anomaly.detected_at,
            threat_level: anomaly.threat_level.value(),
            is_resolved: anomaly.is_resolved,
            attributes: anomaly.attributes.into_iter().map(AttributeOut::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentReportIn {
    #[serde(rename = "jmeno_strazce", alias = "agent_name")]
    pub agent_name: String,
    #[serde(default, rename = "shrnuti_hlaseni", alias = "summary")]
    pub summary: Option<String>,
}

impl From<AgentReportIn> for NewAgentReport {
    fn from(input: AgentReportIn) -> Self {
        NewAgentReport {
            agent_name: input.agent_name,
            summary: input.summary,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReportOut {
    pub id: String,
    #[serde(rename = "projev_id")]
    pub anomaly_id: String,
    #[serde(rename = "jmeno_strazce")]
    pub agent_name: String,
    #[serde(rename = "shrnuti_hlaseni")]
    pub summary: Option<String>,
    #[serde(rename = "cas_hlaseni")]
    pub report_time: DateTime<Utc>,
}

impl From<AgentReport> for AgentReportOut {
    fn from(report: AgentReport) -> Self {
        AgentReportOut {
            id: report.id,
            anomaly_id: report.anomaly_id,
            agent_name: report.agent_name,
            summary: report.summary,
            report_time: report.report_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnomalySummaryOut {
    #[serde(rename = "celkem_projevu")]
    pub total_anomalies: u64,
    #[serde(rename = "nevyresenych_projevu")]
    pub unresolved_anomalies: u64,
    #[serde(rename = "nejcastejsi_kategorie")]
    pub most_common_category: Option<String>,
    #[serde(rename = "prumerna_uroven_hrozby")]
    pub avg_threat_level: Option<f64>,
}

impl From<AnomalySummary> for AnomalySummaryOut {
    fn from(summary: AnomalySummary) -> Self {
        AnomalySummaryOut {
            total_anomalies: summary.total_anomalies,
            unresolved_anomalies: summary.unresolved_anomalies,
            most_common_category: summary.most_common_category,
            avg_threat_level: summary.avg_threat_level,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnomalyQueryParams {
    #[serde(default, rename = "kategorie", alias = "category")]
    pub category: Option<String>,
    #[serde(default, rename = "min_hrozba", alias = "min_threat")]
    pub min_threat: Option<i64>,
}

impl From<AnomalyQueryParams> for AnomalyQuery {
    fn from(params: AnomalyQueryParams) -> Self {
        AnomalyQuery {
            category: params.category,
            min_threat: params.min_threat,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageOut {
    pub message: String,
}

impl MessageOut {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
