pub mod anomaly_handlers;
pub mod ops_handlers;

pub use anomaly_handlers::*;
pub use ops_handlers::*;
