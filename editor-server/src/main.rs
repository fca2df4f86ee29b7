use anyhow::{bail, Context, Result};
use axum::Router;
use axum_sql_editor::SqlEditorLayer;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod demo;

use config::{Backend, ServerConfig};

/// Browse and edit the tables of a SQL database in the browser
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path of the TOML configuration file
    #[arg(long, env = "EDITOR_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Create and fill demo tables before serving (SQLite only)
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load_from(&cli.config)?;
    let database_url = config.database_url()?;
    let base_path = config.server.base_path.clone();

    let editor_router = match Backend::from_url(database_url)? {
        Backend::Sqlite => {
            let pool = SqlitePoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(database_url)
                .await
                .context("Failed to connect to SQLite database")?;

            if cli.seed_demo {
                demo::setup(&pool)
                    .await
                    .context("Failed to set up demo tables")?;
            }

            SqlEditorLayer::sqlite(base_path, pool)
                .with_settings(config.editor.clone())
                .into_router()
        }
        Backend::Postgres => {
            if cli.seed_demo {
                bail!("--seed-demo is only supported for SQLite databases");
            }

            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(database_url)
                .await
                .context("Failed to connect to PostgreSQL database")?;

            SqlEditorLayer::postgres(base_path, pool)
                .with_settings(config.editor.clone())
                .into_router()
        }
    };

    let app = Router::new().merge(editor_router);

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;

    tracing::info!(
        "SQL editor available at http://{}{}/",
        address,
        config.server.base_path
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
