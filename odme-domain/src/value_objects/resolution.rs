// Resolve outcome value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveOutcome {
    Resolved,
    AlreadyResolved,
}

impl ResolveOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            ResolveOutcome::Resolved => "Anomaly marked as resolved",
            ResolveOutcome::AlreadyResolved => "Anomaly already resolved",
        }
    }
}
