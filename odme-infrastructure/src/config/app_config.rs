use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tokio::fs;

use odme_domain::{DbConfig, RuntimeConfig};

pub const CONFIG_ENV: &str = "ODME_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.toml";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_path: String,
    pub db_pool_size: u32,
    pub db_busy_timeout_ms: u64,
    pub scoring_table_path: String,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub log_level: String,
    pub log_format: String,
    pub log_dir: Option<String>,
    /// File the settings were read from; `None` when running on defaults.
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            database_path: "./data/odme.sqlite".to_string(),
            db_pool_size: 8,
            db_busy_timeout_ms: 5000,
            scoring_table_path: "./scoring.yaml".to_string(),
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            log_dir: None,
            loaded_from: None,
        }
    }
}

impl AppConfig {
    /// Reads the file named by `ODME_CONFIG`, then applies `ODME_*`
    /// overrides. Runs before logging is installed, so it reports through
    /// `loaded_from` instead of logging.
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path)).await
    }

    pub async fn load_from(file_path: &Path) -> Result<Self> {
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path)
                .await
                .with_context(|| format!("failed to read {}", file_path.display()))?;
            let mut config = Self::from_toml(&content)
                .with_context(|| format!("failed to parse {}", file_path.display()))?;
            config.loaded_from = Some(file_path.to_path_buf());
            config
        } else {
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(file_path.parent());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn normalize(&mut self) {
        if let Some(dir) = &self.log_dir {
            if dir.trim().is_empty() {
                self.log_dir = None;
            }
        }
        self.log_level = self.log_level.trim().to_string();
        if self.log_level.is_empty() {
            self.log_level = "info".to_string();
        }
        self.log_format = self.log_format.trim().to_lowercase();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.database_path = resolve_path(base, &self.database_path);
        self.scoring_table_path = resolve_path(base, &self.scoring_table_path);
        if let Some(dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.database_path.trim().is_empty() {
            return Err(anyhow!("database_path must not be empty"));
        }
        if self.db_pool_size == 0 {
            return Err(anyhow!("db_pool_size must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(anyhow!(
                "log_format must be \"text\" or \"json\", got {:?}",
                self.log_format
            ));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            scoring_table_path: self.scoring_table_path.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            database_path: self.database_path.clone(),
            pool_size: self.db_pool_size,
            busy_timeout_ms: self.db_busy_timeout_ms,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("ODME_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("ODME_DATABASE_PATH") {
            self.database_path = value;
        }
        if let Ok(value) = env::var("ODME_DB_POOL_SIZE") {
            self.db_pool_size = value.parse().unwrap_or(self.db_pool_size);
        }
        if let Ok(value) = env::var("ODME_DB_BUSY_TIMEOUT_MS") {
            self.db_busy_timeout_ms = value.parse().unwrap_or(self.db_busy_timeout_ms);
        }
        if let Ok(value) = env::var("ODME_SCORING_TABLE_PATH") {
            self.scoring_table_path = value;
        }
        if let Ok(value) = env::var("ODME_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("ODME_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("ODME_LOG_LEVEL") {
            self.log_level = value;
        }
        if let Ok(value) = env::var("ODME_LOG_FORMAT") {
            self.log_format = value;
        }
        if let Ok(value) = env::var("ODME_LOG_DIR") {
            self.log_dir = Some(value);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
