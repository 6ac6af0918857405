use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::error;

use crate::web::static_files::get_embedded_file;

/// Serves the single-page form. The page is compiled into the binary, so a
/// miss here means the build itself is broken — report it as a server
/// error rather than rendering a stub page.
pub async fn index_handler() -> impl IntoResponse {
    match get_embedded_file("index.html") {
        Some(page) => Html(page).into_response(),
        None => {
            error!("index.html missing from embedded assets");
            (StatusCode::INTERNAL_SERVER_ERROR, "UI asset missing from build").into_response()
        }
    }
}
