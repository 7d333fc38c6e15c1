use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyQuery {
    pub category: Option<String>,
    pub min_threat: Option<i64>,
}
