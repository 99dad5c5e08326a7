//! Landing page

use axum::{response::Html, routing::get, Router};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}
