//! Static frontend serving.
//!
//! Serves the built frontend from the configured dist directory with an SPA
//! fallback to `index.html` for unmatched paths. Only GET and HEAD are
//! answered; anything else on a non-API path is a 404.

use std::path::{Component, Path, PathBuf};

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::AppState;

/// Resolve a request path inside `dist`, rejecting traversal.
///
/// Returns `None` for paths that escape the root or contain non-normal
/// components.
fn resolve_path(dist: &Path, request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    let relative = Path::new(trimmed);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(dist.join(relative))
}

async fn read_file(path: &Path) -> Option<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(bytes),
        Err(_) => None,
    }
}

fn file_response(path: &Path, bytes: Vec<u8>, head: bool) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let body = if head { Vec::new() } else { bytes };
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.as_ref().to_string())],
        body,
    )
        .into_response()
}

/// Fallback handler for everything outside `/api`.
pub async fn serve_static(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::NOT_FOUND.into_response();
    }
    let head = method == Method::HEAD;
    let dist = &state.config.dist_dir;

    if let Some(path) = resolve_path(dist, uri.path()) {
        let path = if uri.path() == "/" || uri.path().is_empty() {
            dist.join("index.html")
        } else {
            path
        };
        if path.is_file() {
            if let Some(bytes) = read_file(&path).await {
                return file_response(&path, bytes, head);
            }
        }
    } else {
        tracing::debug!(path = uri.path(), "rejecting traversal attempt");
        return StatusCode::NOT_FOUND.into_response();
    }

    // SPA fallback: unmatched routes get the app shell.
    let index = dist.join("index.html");
    match read_file(&index).await {
        Some(bytes) => file_response(&index, bytes, head),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
