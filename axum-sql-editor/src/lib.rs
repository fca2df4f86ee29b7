//! # axum-sql-editor
//!
//! A schema-driven table browser and record editor for SQL databases, easily
//! integrable as an Axum router.
//!
//! ## Features
//!
//! - Table schemas discovered from live metadata on every request
//! - Paginated row lists with truncated values
//! - Create, edit and delete forms with widgets chosen by column type
//! - Server-rendered HTML, no JavaScript required
//! - Support for SQLite and PostgreSQL
//!
//! ## Security Warning
//!
//! **This is an administration tool without access control!**
//!
//! - No authentication/authorization built-in
//! - Exposes and modifies every table the connection can reach
//! - Should never be exposed on public networks
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use axum_sql_editor::SqlEditorLayer;
//! use sqlx::SqlitePool;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = SqlitePool::connect("sqlite::memory:")
//!         .await
//!         .unwrap();
//!
//!     let app = Router::new()
//!         .route("/", get(|| async { "Hello, World!" }))
//!         .merge(SqlEditorLayer::sqlite("/sql-editor", pool).into_router());
//!
//!     // Serve the application...
//! }
//! ```

// Public modules
pub mod database;
pub mod editor;
pub mod handlers;
pub mod layer;
pub mod pagination;
pub mod schema;
pub mod settings;
pub mod views;

// Public exports
pub use editor::{ListPage, RecordView, TableEditor};
pub use layer::SqlEditorLayer;
pub use pagination::PageContext;
pub use schema::{ColumnDescriptor, ColumnKind, RecordValues, TableDescriptor};
pub use settings::{EditorSettings, OutputFormat};

// Re-export database providers
pub use database::traits::{DatabaseError, DatabaseProvider};

#[cfg(feature = "sqlite")]
pub use database::sqlite::SqliteProvider;

#[cfg(feature = "postgres")]
pub use database::postgres::PostgresProvider;

// Error type
use thiserror::Error;

/// Errors raised while configuring the editor
///
/// Request-time failures are [`DatabaseError`]s and are rendered as error
/// pages by the handlers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid settings: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, Error>;
