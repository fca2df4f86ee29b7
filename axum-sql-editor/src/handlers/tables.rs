//! Table index and row list pages

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::database::DatabaseProvider;
use crate::handlers::EditorState;
use crate::pagination::parse_page;
use crate::views::{render_template, IndexView, ListView};

/// Handler for GET /
///
/// Lists every table with a link to its first page of rows.
pub async fn list_tables_handler<DB: DatabaseProvider>(
    State(state): State<EditorState<DB>>,
) -> Response {
    match state.editor.tables().await {
        Ok(tables) => render_template(
            StatusCode::OK,
            IndexView::new(tables, &state.links, state.editor.settings()),
        ),
        Err(error) => state.error_page(error),
    }
}

/// Handler for GET /list/{table}
pub async fn list_rows_handler<DB: DatabaseProvider>(
    State(state): State<EditorState<DB>>,
    Path(table_name): Path<String>,
) -> Response {
    render_list(&state, &table_name, 1).await
}

/// Handler for GET /list/{table}/{page}
///
/// The page segment is free text: anything that is not a positive number
/// shows the first page.
pub async fn list_rows_page_handler<DB: DatabaseProvider>(
    State(state): State<EditorState<DB>>,
    Path((table_name, page)): Path<(String, String)>,
) -> Response {
    render_list(&state, &table_name, parse_page(Some(&page))).await
}

async fn render_list<DB: DatabaseProvider>(
    state: &EditorState<DB>,
    table_name: &str,
    page: u64,
) -> Response {
    match state.editor.list_page(table_name, page).await {
        Ok(list) => render_template(
            StatusCode::OK,
            ListView::new(list, &state.links, state.editor.settings()),
        ),
        Err(error) => state.error_page(error),
    }
}
