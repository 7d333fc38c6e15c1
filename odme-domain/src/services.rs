// Pure domain services
pub mod scoring;

pub use scoring::*;
