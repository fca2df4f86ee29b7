//! HTML page handlers
//!
//! This module contains the route handlers for the editor and the shared
//! mapping from database errors to error pages.

use axum::{http::StatusCode, response::Response};
use std::sync::Arc;

use crate::database::{DatabaseError, DatabaseProvider};
use crate::editor::TableEditor;
use crate::settings::EditorSettings;
use crate::views::{render_template, ErrorView, Links};

pub mod records;
pub mod resources;
pub mod tables;

// Re-export handlers for convenience
pub use records::{
    create_record_handler, delete_record_handler, edit_record_handler, new_record_handler,
    update_record_handler,
};
pub use resources::stylesheet_handler;
pub use tables::{list_rows_handler, list_rows_page_handler, list_tables_handler};

/// Router state shared by all handlers
pub struct EditorState<DB: DatabaseProvider> {
    pub editor: TableEditor<DB>,
    pub links: Arc<Links>,
}

impl<DB: DatabaseProvider> Clone for EditorState<DB> {
    fn clone(&self) -> Self {
        Self {
            editor: self.editor.clone(),
            links: self.links.clone(),
        }
    }
}

impl<DB: DatabaseProvider> EditorState<DB> {
    pub fn new(database: Arc<DB>, settings: Arc<EditorSettings>, base_path: &str) -> Self {
        Self {
            editor: TableEditor::new(database, settings),
            links: Arc::new(Links::new(base_path)),
        }
    }

    /// Render an error page with the status matching the error
    ///
    /// Unknown tables and records are 404s. A table without a usable primary
    /// key is shown as an inline message, not a server fault.
    pub fn error_page(&self, error: DatabaseError) -> Response {
        let status = match &error {
            DatabaseError::TableNotFound(_) | DatabaseError::RecordNotFound { .. } => {
                tracing::warn!("{}", error);
                StatusCode::NOT_FOUND
            }
            DatabaseError::MissingPrimaryKey(_) => {
                tracing::warn!("{}", error);
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DatabaseError::Query(_) => {
                tracing::error!("{}", error);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        render_template(
            status,
            ErrorView::new(error.to_string(), &self.links, self.editor.settings()),
        )
    }
}
