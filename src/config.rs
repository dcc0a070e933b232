use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::repository::RepositoryConfig;
use crate::store::{ClickHouseConfig, StoreConfig};

/// Top-level application configuration loaded from file + environment.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreSection,
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Load configuration from disk and environment.
    pub fn load() -> Result<Self> {
        let config_path = env::var("TODOSVC_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        let mut builder = config::Config::builder();

        if Path::new(&config_path).exists() {
            builder = builder.add_source(config::File::from(PathBuf::from(&config_path)));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TODOSVC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        Self::from_settings(settings)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> Result<Self> {
        let mut config: Self = settings.try_deserialize()?;

        if config.logging.level.trim().is_empty() {
            config.logging.level = "info".to_string();
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub backend: StoreBackendKind,
    /// Bound on startup and `/db-health` pings
    pub ping_timeout_secs: u64,
    pub clickhouse: Option<ClickHouseSection>,
}

impl StoreSection {
    pub fn to_runtime(&self) -> Result<RepositoryConfig> {
        if self.ping_timeout_secs == 0 {
            bail!("store.ping_timeout_secs must be greater than zero");
        }
        let ping_timeout = Duration::from_secs(self.ping_timeout_secs);

        match self.backend {
            StoreBackendKind::Memory => Ok(RepositoryConfig {
                store: StoreConfig::Memory,
                table: String::new(),
                ensure_table: false,
                ping_timeout,
            }),
            StoreBackendKind::ClickHouse => {
                let ch = self
                    .clickhouse
                    .clone()
                    .context("store.clickhouse configuration required when backend is 'clickhouse'")?;

                if ch.url.trim().is_empty() {
                    bail!("store.clickhouse.url must be specified");
                }
                if ch.database.trim().is_empty() {
                    bail!("store.clickhouse.database must be specified");
                }
                if !is_identifier(&ch.table) {
                    bail!(
                        "store.clickhouse.table '{}' is not a valid table name",
                        ch.table
                    );
                }
                if ch.connect_timeout_secs == 0 || ch.query_timeout_secs == 0 {
                    bail!("store.clickhouse timeouts must be greater than zero");
                }

                Ok(RepositoryConfig {
                    store: StoreConfig::ClickHouse(ClickHouseConfig {
                        url: ch.url.trim().to_string(),
                        database: ch.database,
                        username: ch.username,
                        password: ch.password,
                        connect_timeout: Duration::from_secs(ch.connect_timeout_secs),
                        query_timeout: Duration::from_secs(ch.query_timeout_secs),
                        wait_for_mutations: ch.wait_for_mutations,
                    }),
                    table: ch.table,
                    ensure_table: ch.ensure_table,
                    ping_timeout,
                })
            }
        }
    }
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackendKind::ClickHouse,
            ping_timeout_secs: 5,
            clickhouse: Some(ClickHouseSection::default()),
        }
    }
}

/// Letters, digits and underscores, optionally qualified as `database.table`
fn is_identifier(name: &str) -> bool {
    let part_ok = |part: &str| {
        !part.is_empty()
            && !part.starts_with(|c: char| c.is_ascii_digit())
            && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2 && parts.into_iter().all(part_ok)
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    #[default]
    ClickHouse,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClickHouseSection {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub table: String,
    pub connect_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub ensure_table: bool,
    pub wait_for_mutations: bool,
}

impl Default for ClickHouseSection {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".to_string(),
            database: "default".to_string(),
            username: "default".to_string(),
            password: String::new(),
            table: "todos".to_string(),
            connect_timeout_secs: 5,
            query_timeout_secs: 5,
            ensure_table: true,
            wait_for_mutations: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}
