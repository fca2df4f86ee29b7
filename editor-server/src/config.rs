//! Configuration for the editor server
//!
//! Loaded once at start-up from a TOML file. `DATABASE_URL` in the environment
//! overrides `database.url`.

use anyhow::{anyhow, bail, Context, Result};
use axum_sql_editor::EditorSettings;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable that overrides `database.url`
pub const DATABASE_URL_VARIABLE: &str = "DATABASE_URL";

/// Complete server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub editor: EditorSettings,
}

/// Database connection parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL, `sqlite:...` or `postgres://...`
    pub url: Option<String>,

    /// Pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Mount point of the editor, "" for the root
    #[serde(default)]
    pub base_path: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_path: String::new(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Supported database backends, chosen by URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Ok(Backend::Postgres)
        } else {
            Err(anyhow!("Unsupported database URL scheme: {}", url))
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file and apply environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!("Loading configuration from: {:?}", path);

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        if let Ok(url) = env::var(DATABASE_URL_VARIABLE) {
            config.database.url = Some(url);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration text without touching the environment
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<()> {
        let url = self.database_url()?;
        Backend::from_url(url)?;

        if self.database.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }
        if !self.server.base_path.is_empty() && !self.server.base_path.starts_with('/') {
            bail!("server.base_path must start with '/'");
        }
        self.editor.validate()?;
        Ok(())
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database.url.as_deref().ok_or_else(|| {
            anyhow!(
                "database.url is not set; add it to the config file or set {}",
                DATABASE_URL_VARIABLE
            )
        })
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
