//! SQLite implementation of the anomaly store ports.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use odme_domain::ports::{AnomalyRepository, UnitOfWork};
use odme_domain::{
    AgentReport,
    Anomaly,
    AnomalyAttribute,
    AnomalyQuery,
    AnomalySummary,
    DbConfig,
    NewAgentReport,
    NewAnomaly,
    NewAttribute,
    ThreatLevel,
};

use crate::repositories::schema;
use crate::utils::{parse_storage_time, to_storage_time};

pub type SqlitePool = Pool<SqliteConnectionManager>;
type SqliteConnection = PooledConnection<SqliteConnectionManager>;

const ANOMALY_COLUMNS: &str = "id, category, location, detected_at, threat_level, is_resolved";
const REPORT_COLUMNS: &str = "id, anomaly_id, agent_name, summary, report_time";

/// Open (or create) the database file and return a connection pool.
/// Every pooled connection runs in WAL mode with foreign keys enforced.
pub fn open_pool(config: &DbConfig) -> Result<SqlitePool> {
    let path = Path::new(&config.database_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
    let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;
        conn.busy_timeout(busy_timeout)
    });

    Pool::builder()
        .max_size(config.pool_size)
        .build(manager)
        .with_context(|| format!("failed to open database {}", path.display()))
}

#[derive(Clone)]
pub struct SqliteAnomalyRepository {
    pool: SqlitePool,
}

impl SqliteAnomalyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<SqliteConnection> {
        self.pool.get().context("failed to check out database connection")
    }
}

#[async_trait]
impl AnomalyRepository for SqliteAnomalyRepository {
    async fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        schema::migrate(&conn)
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let repo = self.clone();
        // Checkout and the write lock can each wait up to the busy timeout.
        let uow = tokio::task::spawn_blocking(move || -> Result<SqliteUnitOfWork> {
            let conn = repo.conn()?;
            conn.execute_batch("BEGIN IMMEDIATE")
                .context("failed to begin transaction")?;
            Ok(SqliteUnitOfWork {
                conn,
                finished: false,
            })
        })
        .await
        .context("begin task failed")??;
        debug!("transaction started");
        Ok(Box::new(uow))
    }

    async fn find_anomaly(&self, id: &str) -> Result<Option<Anomaly>> {
        let conn = self.conn()?;
        select_anomaly(&conn, id)
    }

    async fn find_anomaly_with_attributes(&self, id: &str) -> Result<Option<Anomaly>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let anomaly = match select_anomaly(&tx, id)? {
            Some(mut anomaly) => {
                anomaly.attributes = select_attributes(&tx, id)?;
                Some(anomaly)
            }
            None => None,
        };
        tx.commit()?;
        Ok(anomaly)
    }

    async fn find_report(&self, id: &str) -> Result<Option<AgentReport>> {
        let conn = self.conn()?;
        select_report(&conn, id)
    }

    async fn list_anomalies_with_attributes(&self, query: &AnomalyQuery) -> Result<Vec<Anomaly>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let anomalies = select_anomalies(&tx, query)?;
        tx.commit()?;
        Ok(anomalies)
    }

    async fn fetch_summary(&self) -> Result<AnomalySummary> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let summary = select_summary(&tx)?;
        tx.commit()?;
        Ok(summary)
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

/// One `BEGIN IMMEDIATE` transaction on a pooled connection. Dropping it
/// without `commit` rolls the transaction back.
pub struct SqliteUnitOfWork {
    conn: SqliteConnection,
    finished: bool,
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn insert_anomaly(&mut self, anomaly: &NewAnomaly, threat_level: ThreatLevel) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO anomalies (id, category, location, detected_at, threat_level, is_resolved)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                params![
                    id,
                    anomaly.category,
                    anomaly.location,
                    to_storage_time(&anomaly.detected_at),
                    i64::from(threat_level)
                ],
            )
            .context("failed to insert anomaly")?;
        Ok(id)
    }

    async fn insert_attribute(&mut self, anomaly_id: &str, attribute: &NewAttribute) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO anomaly_attributes (anomaly_id, key, value) VALUES (?1, ?2, ?3)",
                params![anomaly_id, attribute.key, attribute.value],
            )
            .context("failed to insert anomaly attribute")?;
        Ok(self.conn.last_insert_rowid())
    }

    async fn insert_report(
        &mut self,
        anomaly_id: &str,
        report: &NewAgentReport,
        report_time: DateTime<Utc>,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO agent_reports (id, anomaly_id, agent_name, summary, report_time)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id,
                    anomaly_id,
                    report.agent_name,
                    report.summary,
                    to_storage_time(&report_time)
                ],
            )
            .context("failed to insert agent report")?;
        Ok(id)
    }

    async fn mark_resolved(&mut self, anomaly_id: &str) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE anomalies SET is_resolved = 1 WHERE id = ?1",
                params![anomaly_id],
            )
            .context("failed to update anomaly")?;
        if changed == 0 {
            return Err(anyhow!("anomaly {} does not exist", anomaly_id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut uow = self;
            uow.conn
                .execute_batch("COMMIT")
                .context("failed to commit transaction")?;
            uow.finished = true;
            Ok(())
        })
        .await
        .context("commit task failed")?
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        self.finished = true;
        self.conn
            .execute_batch("ROLLBACK")
            .context("failed to roll back transaction")?;
        debug!("transaction rolled back");
        Ok(())
    }
}

impl Drop for SqliteUnitOfWork {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => debug!("unfinished transaction rolled back"),
            Err(err) => warn!("failed to roll back unfinished transaction: {}", err),
        }
    }
}

fn anomaly_from_row(row: &Row<'_>) -> rusqlite::Result<Anomaly> {
    let detected_at: String = row.get(3)?;
    let threat_level: i64 = row.get(4)?;
    Ok(Anomaly {
        id: row.get(0)?,
        category: row.get(1)?,
        location: row.get(2)?,
        detected_at: time_column(3, &detected_at)?,
        threat_level: ThreatLevel::clamped(i128::from(threat_level)),
        is_resolved: row.get(5)?,
        attributes: Vec::new(),
    })
}

fn attribute_from_row(row: &Row<'_>) -> rusqlite::Result<AnomalyAttribute> {
    Ok(AnomalyAttribute {
        id: row.get(0)?,
        anomaly_id: row.get(1)?,
        key: row.get(2)?,
        value: row.get(3)?,
    })
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<AgentReport> {
    let report_time: String = row.get(4)?;
    Ok(AgentReport {
        id: row.get(0)?,
        anomaly_id: row.get(1)?,
        agent_name: row.get(2)?,
        summary: row.get(3)?,
        report_time: time_column(4, &report_time)?,
    })
}

fn time_column(index: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    parse_storage_time(raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, err.into()))
}

fn select_anomaly(conn: &Connection, id: &str) -> Result<Option<Anomaly>> {
    let sql = format!("SELECT {} FROM anomalies WHERE id = ?1", ANOMALY_COLUMNS);
    Ok(conn.query_row(&sql, params![id], anomaly_from_row).optional()?)
}

fn select_attributes(conn: &Connection, anomaly_id: &str) -> Result<Vec<AnomalyAttribute>> {
    let mut stmt = conn.prepare(
        "SELECT id, anomaly_id, key, value FROM anomaly_attributes
         WHERE anomaly_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![anomaly_id], attribute_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn select_report(conn: &Connection, id: &str) -> Result<Option<AgentReport>> {
    let sql = format!("SELECT {} FROM agent_reports WHERE id = ?1", REPORT_COLUMNS);
    Ok(conn.query_row(&sql, params![id], report_from_row).optional()?)
}

/// Anomalies matching `query` in insertion order, each with its attributes.
/// Attributes are fetched in one batched query instead of one per anomaly.
fn select_anomalies(conn: &Connection, query: &AnomalyQuery) -> Result<Vec<Anomaly>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(category) = &query.category {
        values.push(Value::Text(category.clone()));
        clauses.push(format!("category = ?{}", values.len()));
    }
    if let Some(min_threat) = query.min_threat {
        values.push(Value::Integer(min_threat));
        clauses.push(format!("threat_level >= ?{}", values.len()));
    }
    let filter = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let sql = format!("SELECT {} FROM anomalies{} ORDER BY rowid", ANOMALY_COLUMNS, filter);
    let mut stmt = conn.prepare(&sql)?;
    let mut anomalies = stmt
        .query_map(params_from_iter(values.iter()), anomaly_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    if anomalies.is_empty() {
        return Ok(anomalies);
    }

    let sql = format!(
        "SELECT id, anomaly_id, key, value FROM anomaly_attributes
         WHERE anomaly_id IN (SELECT id FROM anomalies{}) ORDER BY id",
        filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), attribute_from_row)?;
    let mut grouped: HashMap<String, Vec<AnomalyAttribute>> = HashMap::new();
    for row in rows {
        let attribute = row?;
        grouped
            .entry(attribute.anomaly_id.clone())
            .or_default()
            .push(attribute);
    }
    for anomaly in &mut anomalies {
        anomaly.attributes = grouped.remove(&anomaly.id).unwrap_or_default();
    }
    Ok(anomalies)
}

fn select_summary(conn: &Connection) -> Result<AnomalySummary> {
    let (total, unresolved, avg_threat_level): (i64, i64, Option<f64>) = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN is_resolved = 0 THEN 1 ELSE 0 END), 0),
                AVG(CASE WHEN is_resolved = 0 THEN threat_level END)
         FROM anomalies",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    // Ties go to the lexicographically smallest category.
    let most_common_category: Option<String> = conn
        .query_row(
            "SELECT category FROM anomalies
             GROUP BY category
             ORDER BY COUNT(*) DESC, category ASC
             LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(AnomalySummary {
        total_anomalies: total as u64,
        unresolved_anomalies: unresolved as u64,
        most_common_category,
        avg_threat_level,
    })
}
