// Threat level value object

use serde::{Deserialize, Serialize};

/// Severity score of an anomaly, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreatLevel(u8);

impl ThreatLevel {
    pub const MIN: ThreatLevel = ThreatLevel(0);
    pub const MAX: ThreatLevel = ThreatLevel(100);

    /// Clamps an accumulated raw score into the valid range.
    pub fn clamped(raw: i128) -> Self {
        let bounded = raw.clamp(Self::MIN.0 as i128, Self::MAX.0 as i128);
        ThreatLevel(bounded as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<ThreatLevel> for i64 {
    fn from(level: ThreatLevel) -> Self {
        i64::from(level.0)
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
