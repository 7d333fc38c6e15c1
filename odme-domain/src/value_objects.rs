// Domain value objects
pub mod resolution;
pub mod threat_level;

pub use resolution::*;
pub use threat_level::*;
