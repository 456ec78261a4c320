//! Public page endpoint.
//!
//! Resolves a URL path through the current route table and renders the page
//! when it is active and published.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;
use folio_pages::DeletedFilter;
use md5::{Digest, Md5};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /.
pub(crate) async fn get_root_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    serve_page(String::new(), &state, &headers).await
}

/// Handle GET /{*path}.
pub(crate) async fn get_page(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    serve_page(path, &state, &headers).await
}

async fn serve_page(
    path: String,
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let routes = state.routes.snapshot();
    let Some(page_id) = routes.resolve(&path) else {
        return Err(ServerError::PageNotFound(path));
    };

    let now = Utc::now();
    let page = state
        .store
        .get(page_id, DeletedFilter::ExcludeDeleted)
        .await?
        .filter(|page| page.is_visible_at(now));
    let Some(page) = page else {
        tracing::debug!(page_id, path = %path, "Page not visible");
        return Err(ServerError::PageNotFound(path));
    };

    let url = routes
        .url_for(page_id)
        .unwrap_or_else(|| format!("/{path}"));
    let html = state.renderer.render(&page, &url);
    let etag = compute_etag(&state.version, &html);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (
                header::LAST_MODIFIED,
                page.updated_at
                    .format("%a, %d %b %Y %H:%M:%S GMT")
                    .to_string(),
            ),
            (header::CACHE_CONTROL, "public, max-age=60".to_owned()),
        ],
        Html(html),
    )
        .into_response())
}

/// Compute `ETag` from version and rendered HTML.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_etag_includes_version_and_content() {
        assert_ne!(compute_etag("1.0.0", "html"), compute_etag("1.0.1", "html"));
        assert_ne!(compute_etag("1.0.0", "a"), compute_etag("1.0.0", "b"));
    }

    #[test]
    fn test_compute_etag_format() {
        let etag = compute_etag("1.0.0", "content");

        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert_eq!(etag.len(), 18);
    }
}
