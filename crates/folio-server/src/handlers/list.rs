//! Admin list endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use folio_pages::{ListRecord, ListRequest, Paginated};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle POST /manage/api/pages/list.
///
/// Lists one level of the tree (top level unless `parent_id` is given) or,
/// with `filters.show_all`, every page.
pub(crate) async fn list_pages(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ListRequest>,
) -> Result<Json<Paginated<ListRecord>>, ServerError> {
    let query = request.into_query();
    let now = Utc::now();
    let page = state.store.list(&query, state.page_size, now).await?;

    Ok(Json(page.map(|summary| ListRecord::format(&summary, now))))
}
