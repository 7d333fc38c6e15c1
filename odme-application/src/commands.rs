pub mod ingest_commands;
pub mod report_commands;
pub mod resolve_commands;
