// Domain entities
pub mod agent_report;
pub mod anomaly;
pub mod config;
pub mod query;
pub mod summary;

pub use agent_report::*;
pub use anomaly::*;
pub use config::*;
pub use query::*;
pub use summary::*;
