//! Link generation endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use folio_pages::{PageId, Visibility, route_name};
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Response for GET /api/links/{id}.
#[derive(Debug, Serialize)]
pub(crate) struct LinkResponse {
    /// Page id.
    id: PageId,
    /// Route name of the page.
    name: String,
    /// Canonical URL path.
    url: String,
}

/// Handle GET /api/links/{id}.
///
/// Resolves the canonical URL through the page's route name, so only pages
/// with a registered route have a link. Without a route the 404 tells a
/// purged id apart from a soft-deleted or unroutable page.
pub(crate) async fn get_link(
    Path(id): Path<PageId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<LinkResponse>, ServerError> {
    let name = route_name(id);
    let url = state.routes.snapshot().url_for_name(&name);
    let Some(url) = url else {
        return Err(match state.store.visibility(id).await? {
            Visibility::Purged => ServerError::PageIdNotFound(id),
            visibility => ServerError::NoRoute { id, visibility },
        });
    };

    Ok(Json(LinkResponse { id, name, url }))
}
