//! Database schema and migrations.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

pub const SCHEMA_VERSION: i64 = 1;

/// Create every table and index if missing, then record the schema version.
/// Safe to run on every startup.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS anomalies (
            id TEXT PRIMARY KEY,
            category TEXT NOT NULL,
            location TEXT NOT NULL,
            detected_at TEXT NOT NULL,
            threat_level INTEGER NOT NULL CHECK (threat_level BETWEEN 0 AND 100),
            is_resolved INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS anomaly_attributes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            anomaly_id TEXT NOT NULL REFERENCES anomalies(id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS agent_reports (
            id TEXT PRIMARY KEY,
            anomaly_id TEXT NOT NULL REFERENCES anomalies(id) ON DELETE CASCADE,
            agent_name TEXT NOT NULL,
            summary TEXT,
            report_time TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_anomalies_category ON anomalies(category);
        CREATE INDEX IF NOT EXISTS idx_anomalies_threat ON anomalies(threat_level);
        CREATE INDEX IF NOT EXISTS idx_attributes_anomaly ON anomaly_attributes(anomaly_id);
        CREATE INDEX IF NOT EXISTS idx_reports_anomaly ON agent_reports(anomaly_id);",
    )
    .context("failed to create schema")?;

    let current: Option<i64> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .optional()?
        .flatten();
    if current.unwrap_or(0) < SCHEMA_VERSION {
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
    }
    Ok(())
}
