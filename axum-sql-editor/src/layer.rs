//! SqlEditorLayer - Main Axum integration layer
//!
//! This module provides the main entry point for integrating axum-sql-editor
//! into an Axum application.

use crate::database::traits::DatabaseProvider;
use crate::settings::EditorSettings;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[cfg(feature = "sqlite")]
use crate::database::sqlite::SqliteProvider;

#[cfg(feature = "postgres")]
use crate::database::postgres::PostgresProvider;

use crate::handlers::{
    create_record_handler, delete_record_handler, edit_record_handler, list_rows_handler,
    list_rows_page_handler, list_tables_handler, new_record_handler, stylesheet_handler,
    update_record_handler, EditorState,
};

/// Main layer for integrating the SQL editor into an Axum application
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use axum_sql_editor::{EditorSettings, SqlEditorLayer};
/// use sqlx::SqlitePool;
///
/// # async fn example() {
/// let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
/// let editor = SqlEditorLayer::sqlite("/sql-editor", pool)
///     .with_settings(EditorSettings::default());
/// let app = Router::new().merge(editor.into_router());
/// # }
/// ```
pub struct SqlEditorLayer<DB: DatabaseProvider> {
    base_path: String,
    database: Arc<DB>,
    settings: Arc<EditorSettings>,
}

impl<DB: DatabaseProvider> SqlEditorLayer<DB> {
    /// Create a new SQL editor at the given base path with default settings
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the editor will be mounted (e.g., "/sql-editor"),
    ///   or "" to serve it at the root
    /// * `database` - The database provider implementation
    pub fn new(base_path: impl Into<String>, database: DB) -> Self {
        Self {
            base_path: base_path.into().trim_end_matches('/').to_string(),
            database: Arc::new(database),
            settings: Arc::new(EditorSettings::default()),
        }
    }

    /// Replace the editor settings
    pub fn with_settings(mut self, settings: EditorSettings) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    /// Convert into an Axum Router that can be merged
    ///
    /// Every response carries headers that disable caching, and each request
    /// is traced through `tower_http::trace`.
    pub fn into_router(self) -> Router {
        let state = EditorState::new(self.database, self.settings, &self.base_path);

        // Note: Axum 0.8 uses {param} syntax instead of :param
        let editor_router = Router::new()
            .route("/", get(list_tables_handler::<DB>))
            .route("/resource/css", get(stylesheet_handler))
            .route("/list/{table}", get(list_rows_handler::<DB>))
            .route("/list/{table}/{page}", get(list_rows_page_handler::<DB>))
            .route("/new/{table}", get(new_record_handler::<DB>))
            .route(
                "/view/{table}",
                post(create_record_handler::<DB>).put(create_record_handler::<DB>),
            )
            .route(
                "/view/{table}/{primary}",
                get(edit_record_handler::<DB>)
                    .post(update_record_handler::<DB>)
                    .delete(delete_record_handler::<DB>),
            )
            .with_state(state);

        // Nesting at the root is not allowed in Axum 0.8
        let router = if self.base_path.is_empty() {
            editor_router
        } else {
            Router::new().nest(&self.base_path, editor_router)
        };

        router
            .layer(SetResponseHeaderLayer::overriding(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::PRAGMA,
                HeaderValue::from_static("no-cache"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::EXPIRES,
                HeaderValue::from_static("0"),
            ))
            .layer(TraceLayer::new_for_http())
    }
}

#[cfg(feature = "sqlite")]
impl SqlEditorLayer<SqliteProvider> {
    /// Create a new SQL editor for SQLite
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the editor will be mounted
    /// * `pool` - The SQLite connection pool
    pub fn sqlite(base_path: impl Into<String>, pool: sqlx::SqlitePool) -> Self {
        Self::new(base_path, SqliteProvider::new(pool))
    }
}

#[cfg(feature = "postgres")]
impl SqlEditorLayer<PostgresProvider> {
    /// Create a new SQL editor for PostgreSQL
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the editor will be mounted
    /// * `pool` - The PostgreSQL connection pool
    pub fn postgres(base_path: impl Into<String>, pool: sqlx::PgPool) -> Self {
        Self::new(base_path, PostgresProvider::new(pool))
    }
}
