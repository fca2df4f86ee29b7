//! View models for the HTML pages
//!
//! Each view model turns editor results into presentation-ready values and is
//! rendered by an askama template under `templates/`. The `.html` templates
//! escape every interpolated value, so view models carry raw text only.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::editor::{ListPage, RecordView};
use crate::schema::{ColumnDescriptor, ColumnKind, TableDescriptor, TableInfo};
use crate::settings::EditorSettings;

/// Characters escaped inside a single URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Query parameter carrying a record key that cannot be a path segment
pub const KEY_QUERY_PARAMETER: &str = "key";

/// Path segment standing in for a key passed through [`KEY_QUERY_PARAMETER`]
const KEY_PLACEHOLDER_SEGMENT: &str = "-";

/// Builds links relative to the mount point of the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    base_path: String,
}

impl Links {
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    fn segment(value: &str) -> String {
        utf8_percent_encode(value, PATH_SEGMENT).to_string()
    }

    pub fn index(&self) -> String {
        if self.base_path.is_empty() {
            "/".to_string()
        } else {
            self.base_path.clone()
        }
    }

    pub fn stylesheet(&self) -> String {
        format!("{}/resource/css", self.base_path)
    }

    /// List view link; page 1 has no page segment
    pub fn list(&self, table: &str, page: u64) -> String {
        if page <= 1 {
            format!("{}/list/{}", self.base_path, Self::segment(table))
        } else {
            format!("{}/list/{}/{}", self.base_path, Self::segment(table), page)
        }
    }

    pub fn new_record(&self, table: &str) -> String {
        format!("{}/new/{}", self.base_path, Self::segment(table))
    }

    /// Target for create submissions
    pub fn records(&self, table: &str) -> String {
        format!("{}/view/{}", self.base_path, Self::segment(table))
    }

    /// Record link; `.` and `..` are dot segments that clients resolve away,
    /// so those keys travel in the query string instead
    pub fn record(&self, table: &str, key: &str) -> String {
        if key == "." || key == ".." {
            return format!(
                "{}/view/{}/{}?{}={}",
                self.base_path,
                Self::segment(table),
                KEY_PLACEHOLDER_SEGMENT,
                KEY_QUERY_PARAMETER,
                Self::segment(key)
            );
        }
        format!(
            "{}/view/{}/{}",
            self.base_path,
            Self::segment(table),
            Self::segment(key)
        )
    }
}

/// Shorten a value for list display
///
/// Counts characters, not bytes, and appends `...` only when something was cut.
pub fn truncate(text: &str, max_characters: usize) -> String {
    match text.char_indices().nth(max_characters) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// Values shared by every page through the layout template
#[derive(Debug, Clone)]
pub struct PageFrame {
    pub title: String,
    pub index_url: String,
    pub stylesheet_url: String,
    pub xhtml: bool,
}

impl PageFrame {
    pub fn new(title: impl Into<String>, links: &Links, settings: &EditorSettings) -> Self {
        Self {
            title: title.into(),
            index_url: links.index(),
            stylesheet_url: links.stylesheet(),
            xhtml: settings.output_format.is_xhtml(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableLink {
    pub name: String,
    pub url: String,
}

/// List of tables
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexView {
    pub frame: PageFrame,
    pub tables: Vec<TableLink>,
}

impl IndexView {
    pub fn new(tables: Vec<TableInfo>, links: &Links, settings: &EditorSettings) -> Self {
        Self {
            frame: PageFrame::new("List of tables", links, settings),
            tables: tables
                .into_iter()
                .map(|table| TableLink {
                    url: links.list(&table.name, 1),
                    name: table.name,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListCell {
    pub text: String,
    pub is_key: bool,
}

#[derive(Debug, Clone)]
pub struct ListRow {
    pub edit_url: String,
    pub cells: Vec<ListCell>,
}

/// One page of rows
#[derive(Template)]
#[template(path = "list.html")]
pub struct ListView {
    pub frame: PageFrame,
    pub columns: Vec<String>,
    pub rows: Vec<ListRow>,
    pub total_count: u64,
    pub page: u64,
    pub max_page: u64,
    pub show_navigation: bool,
    pub head_url: Option<String>,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    pub last_url: Option<String>,
    pub new_url: String,
}

impl ListView {
    pub fn new(list: ListPage, links: &Links, settings: &EditorSettings) -> Self {
        let ListPage { table, rows, page } = list;
        let key_column = table
            .primary_key()
            .map(|column| column.name.clone())
            .unwrap_or_default();
        let name = table.name.as_str();

        let rows = rows
            .iter()
            .map(|record| ListRow {
                edit_url: links.record(name, &record.display(&key_column)),
                cells: table
                    .columns
                    .iter()
                    .map(|column| ListCell {
                        text: truncate(&record.display(&column.name), settings.truncation_length),
                        is_key: column.name == key_column,
                    })
                    .collect(),
            })
            .collect();

        Self {
            frame: PageFrame::new(format!("List of {}", name), links, settings),
            columns: table.column_names(),
            rows,
            total_count: page.total_count,
            page: page.page,
            max_page: page.max_page,
            show_navigation: page.has_multiple_pages(),
            head_url: page.head.map(|target| links.list(name, target)),
            prev_url: page.prev.map(|target| links.list(name, target)),
            next_url: page.next.map(|target| links.list(name, target)),
            last_url: page.last.map(|target| links.list(name, target)),
            new_url: links.new_record(name),
        }
    }
}

/// One input of the record form
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub data_type: String,
    pub value: String,
    pub kind: ColumnKind,
    pub max_length: Option<u32>,
    /// False for placeholders such as binary data; rendered without a name
    pub editable: bool,
    /// Offer a NULL checkbox next to the input
    pub null_choice: bool,
    pub is_null: bool,
}

impl FormField {
    fn new(column: &ColumnDescriptor, value: String) -> Self {
        Self {
            name: column.name.clone(),
            data_type: column.data_type.clone(),
            value,
            kind: column.kind,
            max_length: column.declared_length(),
            editable: true,
            null_choice: column.nullable && column.kind != ColumnKind::Other,
            is_null: false,
        }
    }
}

/// Create or edit form for a single record
#[derive(Template)]
#[template(path = "record.html")]
pub struct RecordFormView {
    pub frame: PageFrame,
    pub table: String,
    pub action_url: String,
    pub list_url: String,
    pub key_name: String,
    /// Present in edit mode only
    pub key_value: Option<String>,
    pub delete_url: Option<String>,
    pub fields: Vec<FormField>,
}

impl RecordFormView {
    /// Empty form for a new record; the primary key is left to the database
    pub fn create(table: TableDescriptor, links: &Links, settings: &EditorSettings) -> Self {
        let key_name = table
            .primary_key()
            .map(|column| column.name.clone())
            .unwrap_or_default();
        let fields = table
            .columns
            .iter()
            .filter(|column| !column.is_primary_key)
            .map(|column| FormField::new(column, String::new()))
            .collect();

        Self {
            frame: PageFrame::new(format!("New record in {}", table.name), links, settings),
            action_url: links.records(&table.name),
            list_url: links.list(&table.name, 1),
            key_name,
            key_value: None,
            delete_url: None,
            fields,
            table: table.name,
        }
    }

    /// Form filled with the full, untruncated values of a record
    pub fn edit(view: RecordView, links: &Links, settings: &EditorSettings) -> Self {
        let RecordView { table, key, values } = view;
        let key_name = table
            .primary_key()
            .map(|column| column.name.clone())
            .unwrap_or_default();
        let fields = table
            .columns
            .iter()
            .filter(|column| !column.is_primary_key)
            .map(|column| {
                let mut field = FormField::new(column, values.display(&column.name));
                if values.is_opaque(&column.name) {
                    field.editable = false;
                    field.null_choice = false;
                }
                field.is_null = values.is_null(&column.name);
                field
            })
            .collect();
        let record_url = links.record(&table.name, &key);
        let key_value = values.display(&key_name);

        Self {
            frame: PageFrame::new(format!("Record {} of {}", key, table.name), links, settings),
            action_url: record_url.clone(),
            list_url: links.list(&table.name, 1),
            key_name,
            key_value: Some(key_value),
            delete_url: Some(record_url),
            fields,
            table: table.name,
        }
    }
}

/// Error page
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorView {
    pub frame: PageFrame,
    pub message: String,
}

impl ErrorView {
    pub fn new(message: impl Into<String>, links: &Links, settings: &EditorSettings) -> Self {
        Self {
            frame: PageFrame::new("Error", links, settings),
            message: message.into(),
        }
    }
}

/// Render a template, falling back to a plain-text 500 if rendering fails
pub fn render_template<T: Template>(status: StatusCode, template: T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(error) => {
            tracing::error!("Template rendering failed: {}", error);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageContext;
    use crate::schema::RecordValues;
    use serde_json::Value;

    fn people() -> TableDescriptor {
        TableDescriptor::new(
            "people",
            vec![
                ColumnDescriptor::new("id", "INTEGER", false, None, true),
                ColumnDescriptor::new("name", "VARCHAR(40)", true, None, false),
                ColumnDescriptor::new("bio", "TEXT", true, None, false),
                ColumnDescriptor::new("age", "INTEGER", true, None, false),
            ],
        )
        .unwrap()
    }

    fn record(id: i64, name: &str, bio: &str) -> RecordValues {
        let mut values = RecordValues::default();
        values.insert("id", Value::from(id));
        values.insert("name", Value::from(name));
        values.insert("bio", Value::from(bio));
        values.insert("age", Value::Null);
        values
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 32), "short");
        assert_eq!(truncate("abcdef", 6), "abcdef");
        assert_eq!(truncate("abcdefg", 6), "abcdef...");
        assert_eq!(truncate("", 0), "");
        assert_eq!(truncate("äöüß", 2), "äö...");
    }

    #[test]
    fn test_links_encode_segments() {
        let links = Links::new("/editor/");
        assert_eq!(links.index(), "/editor");
        assert_eq!(links.stylesheet(), "/editor/resource/css");
        assert_eq!(links.list("people", 1), "/editor/list/people");
        assert_eq!(links.list("people", 3), "/editor/list/people/3");
        assert_eq!(links.record("my table", "a/b"), "/editor/view/my%20table/a%2Fb");
        assert_eq!(links.new_record("people"), "/editor/new/people");
        assert_eq!(links.records("people"), "/editor/view/people");
    }

    #[test]
    fn test_links_move_dot_keys_to_query() {
        let links = Links::new("");
        assert_eq!(links.record("tags", ".."), "/view/tags/-?key=..");
        assert_eq!(links.record("tags", "."), "/view/tags/-?key=.");
        assert_eq!(links.record("tags", "..."), "/view/tags/...");
        assert_eq!(links.record("tags", "-"), "/view/tags/-");
    }

    #[test]
    fn test_links_at_root() {
        let links = Links::new("");
        assert_eq!(links.index(), "/");
        assert_eq!(links.list("people", 2), "/list/people/2");
    }

    #[test]
    fn test_list_view_truncates_and_links() {
        let settings = EditorSettings {
            truncation_length: 5,
            ..Default::default()
        };
        let links = Links::new("");
        let list = ListPage {
            table: people(),
            rows: vec![record(7, "Ada Lovelace", "x")],
            page: PageContext::new("people", 1, 30, 1),
        };

        let view = ListView::new(list, &links, &settings);
        assert_eq!(view.columns, vec!["id", "name", "bio", "age"]);
        assert_eq!(view.rows[0].edit_url, "/view/people/7");
        assert_eq!(view.rows[0].cells[1].text, "Ada L...");
        assert!(view.rows[0].cells[0].is_key);
        assert_eq!(view.rows[0].cells[3].text, "");
        assert!(!view.show_navigation);
        assert_eq!(view.prev_url, None);
    }

    #[test]
    fn test_list_view_navigation_urls() {
        let links = Links::new("");
        let list = ListPage {
            table: people(),
            rows: Vec::new(),
            page: PageContext::new("people", 3, 10, 95),
        };

        let view = ListView::new(list, &links, &EditorSettings::default());
        assert_eq!(view.head_url.as_deref(), Some("/list/people"));
        assert_eq!(view.prev_url.as_deref(), Some("/list/people/2"));
        assert_eq!(view.next_url.as_deref(), Some("/list/people/4"));
        assert_eq!(view.last_url.as_deref(), Some("/list/people/10"));
    }

    #[test]
    fn test_edit_form_keeps_full_values() {
        let settings = EditorSettings {
            truncation_length: 3,
            ..Default::default()
        };
        let view = RecordView {
            table: people(),
            key: "7".to_string(),
            values: record(7, "Ada Lovelace", "Analyst"),
        };

        let form = RecordFormView::edit(view, &Links::new(""), &settings);
        assert_eq!(form.key_value.as_deref(), Some("7"));
        assert_eq!(form.fields.len(), 3);
        assert_eq!(form.fields[0].value, "Ada Lovelace");
        assert_eq!(form.fields[0].kind, ColumnKind::ShortText);
        assert_eq!(form.fields[0].max_length, Some(40));
        assert_eq!(form.fields[1].kind, ColumnKind::LongText);
        assert_eq!(form.fields[2].kind, ColumnKind::Other);
        assert_eq!(form.delete_url.as_deref(), Some("/view/people/7"));
    }

    #[test]
    fn test_edit_form_marks_opaque_and_null_values() {
        let mut values = record(7, "Ada", "x");
        values.insert("bio", Value::Null);
        values.insert_opaque("age", "[BLOB: 3 bytes]");
        let view = RecordView {
            table: people(),
            key: "7".to_string(),
            values,
        };

        let form = RecordFormView::edit(view, &Links::new(""), &EditorSettings::default());
        assert!(form.fields[0].editable);
        assert!(form.fields[0].null_choice);
        assert!(!form.fields[0].is_null);
        assert!(form.fields[1].is_null);
        assert!(!form.fields[2].editable);
        assert!(!form.fields[2].null_choice);

        let html = form.render().unwrap();
        assert!(html.contains("value=\"[BLOB: 3 bytes]\" size=\"20\" readonly=\"readonly\""));
        assert!(!html.contains("name=\"age\""));
        assert!(html.contains("name=\"_null\" value=\"bio\" checked=\"checked\""));
        assert!(html.contains("name=\"_null\" value=\"name\" />"));
    }

    #[test]
    fn test_create_form_omits_key() {
        let form = RecordFormView::create(people(), &Links::new(""), &EditorSettings::default());
        assert_eq!(form.key_value, None);
        assert_eq!(form.delete_url, None);
        assert_eq!(form.action_url, "/view/people");
        assert!(form.fields.iter().all(|field| field.name != "id"));
        assert!(form.fields.iter().all(|field| field.value.is_empty()));
    }

    #[test]
    fn test_widgets_rendered_by_kind() {
        let form = RecordFormView::create(people(), &Links::new(""), &EditorSettings::default());
        let html = form.render().unwrap();
        assert!(html.contains("<textarea"));
        assert!(html.contains("size=\"60\""));
        assert!(html.contains("maxlength=\"40\""));
        assert!(html.contains("size=\"20\""));
    }

    #[test]
    fn test_error_view_escapes_message() {
        let view = ErrorView::new("<b>bad</b>", &Links::new(""), &EditorSettings::default());
        let html = view.render().unwrap();
        assert!(html.contains("&lt;b&gt;bad"));
        assert!(!html.contains("<b>bad"));
    }

    #[test]
    fn test_layout_doctype_follows_output_format() {
        let settings = EditorSettings {
            output_format: crate::settings::OutputFormat::Xhtml,
            ..Default::default()
        };
        let html = ErrorView::new("oops", &Links::new(""), &settings).render().unwrap();
        assert!(html.starts_with("<!DOCTYPE html PUBLIC"));

        let html = ErrorView::new("oops", &Links::new(""), &EditorSettings::default())
            .render()
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
