//! Record form and mutation endpoints
//!
//! HTML forms can only GET and POST, so a POST to a record URL may carry a
//! `_method` field naming the intended verb. `_method=delete` deletes the
//! record; anything else updates it.
//!
//! A `key` query parameter, when present, addresses the record instead of the
//! path segment. Links use it for keys that cannot be path segments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::database::DatabaseProvider;
use crate::handlers::EditorState;
use crate::views::{render_template, RecordFormView};

/// Form field that overrides the request method
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// Submitted form fields in request order
type FormFields = Vec<(String, String)>;

/// Intended verb of a POST to a record URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Update,
    Delete,
}

impl RecordAction {
    /// Read the method override from submitted fields; the last one wins
    pub fn from_fields(fields: &[(String, String)]) -> Self {
        let method = fields
            .iter()
            .rev()
            .find(|(name, _)| name == METHOD_OVERRIDE_FIELD)
            .map(|(_, value)| value.trim().to_ascii_lowercase());

        match method.as_deref() {
            Some("delete") => RecordAction::Delete,
            _ => RecordAction::Update,
        }
    }
}

/// Record key passed in the query string
#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

impl KeyQuery {
    /// The query key if given, otherwise the path segment
    pub fn resolve(self, path_key: String) -> String {
        self.key.unwrap_or(path_key)
    }
}

/// Handler for GET /new/{table}
///
/// Empty form in create mode.
pub async fn new_record_handler<DB: DatabaseProvider>(
    State(state): State<EditorState<DB>>,
    Path(table_name): Path<String>,
) -> Response {
    match state.editor.describe(&table_name).await {
        Ok(table) => render_template(
            StatusCode::OK,
            RecordFormView::create(table, &state.links, state.editor.settings()),
        ),
        Err(error) => state.error_page(error),
    }
}

/// Handler for GET /view/{table}/{primary}
///
/// Form in edit mode with the full record values.
pub async fn edit_record_handler<DB: DatabaseProvider>(
    State(state): State<EditorState<DB>>,
    Path((table_name, key)): Path<(String, String)>,
    Query(key_query): Query<KeyQuery>,
) -> Response {
    let key = key_query.resolve(key);
    match state.editor.record(&table_name, &key).await {
        Ok(record) => render_template(
            StatusCode::OK,
            RecordFormView::edit(record, &state.links, state.editor.settings()),
        ),
        Err(error) => state.error_page(error),
    }
}

/// Handler for PUT and POST /view/{table}
///
/// Inserts a record and redirects to the table list.
pub async fn create_record_handler<DB: DatabaseProvider>(
    State(state): State<EditorState<DB>>,
    Path(table_name): Path<String>,
    Form(fields): Form<FormFields>,
) -> Response {
    match state.editor.create(&table_name, &fields).await {
        Ok(_) => Redirect::to(&state.links.list(&table_name, 1)).into_response(),
        Err(error) => state.error_page(error),
    }
}

/// Handler for POST /view/{table}/{primary}
///
/// Updates the record, or deletes it when `_method=delete` is submitted.
pub async fn update_record_handler<DB: DatabaseProvider>(
    State(state): State<EditorState<DB>>,
    Path((table_name, key)): Path<(String, String)>,
    Query(key_query): Query<KeyQuery>,
    Form(fields): Form<FormFields>,
) -> Response {
    let key = key_query.resolve(key);
    let result = match RecordAction::from_fields(&fields) {
        RecordAction::Update => state.editor.update(&table_name, &key, &fields).await,
        RecordAction::Delete => state.editor.delete(&table_name, &key).await,
    };

    match result {
        Ok(_) => Redirect::to(&state.links.list(&table_name, 1)).into_response(),
        Err(error) => state.error_page(error),
    }
}

/// Handler for DELETE /view/{table}/{primary}
///
/// Deleting a record that does not exist still redirects to the list.
pub async fn delete_record_handler<DB: DatabaseProvider>(
    State(state): State<EditorState<DB>>,
    Path((table_name, key)): Path<(String, String)>,
    Query(key_query): Query<KeyQuery>,
) -> Response {
    let key = key_query.resolve(key);
    match state.editor.delete(&table_name, &key).await {
        Ok(_) => Redirect::to(&state.links.list(&table_name, 1)).into_response(),
        Err(error) => state.error_page(error),
    }
}
