use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// The whole UI ships inside the binary. Today that is one page; anything
/// else dropped under static/ is picked up at compile time without route
/// changes.
#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

pub async fn static_handler(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');

    match StaticAssets::get(path) {
        Some(asset) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref())],
                asset.data.to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}

/// Fetches an embedded asset as text; the index handler uses this to serve
/// the page inline rather than via the asset route.
pub fn get_embedded_file(path: &str) -> Option<String> {
    StaticAssets::get(path).map(|asset| String::from_utf8_lossy(&asset.data).into_owned())
}
