// Anomaly entity
// A reported incident together with the attributes captured at ingest time

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::ThreatLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: String,
    pub category: String,
    pub location: String,
    pub detected_at: DateTime<Utc>,
    pub threat_level: ThreatLevel,
    pub is_resolved: bool,
    /// Only populated by the "with attributes" store reads.
    pub attributes: Vec<AnomalyAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyAttribute {
    pub id: i64,
    pub anomaly_id: String,
    pub key: String,
    pub value: String,
}

/// A free-form key/value pair as submitted by the reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttribute {
    pub key: String,
    pub value: String,
}

impl NewAttribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnomaly {
    pub category: String,
    pub location: String,
    pub detected_at: DateTime<Utc>,
    pub attributes: Vec<NewAttribute>,
}
