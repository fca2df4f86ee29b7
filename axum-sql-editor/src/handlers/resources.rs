//! Static resources

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// Stylesheet shared by all pages, embedded at compile time
static STYLESHEET: &str = include_str!("../../templates/style.css");

/// Handler for GET /resource/css
pub async fn stylesheet_handler() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLESHEET,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stylesheet_content_type() {
        let response = stylesheet_handler().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css; charset=utf-8"
        );
    }
}
