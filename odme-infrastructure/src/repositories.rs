pub mod config_files;
pub mod schema;
pub mod sqlite_store;

pub use config_files::*;
pub use sqlite_store::*;
