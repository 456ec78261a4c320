//! Bulk admin actions on selected pages.
//!
//! Each action takes a JSON array of page ids and skips ids that are not in a
//! suitable state (e.g. deleting an already deleted page). Skipped ids are
//! reported with their storage visibility.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use folio_pages::{DeletedFilter, ListRecord, PageId, Visibility};
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Result of a bulk action.
#[derive(Debug, Serialize)]
pub(crate) struct ActionResponse {
    message: &'static str,
    /// Ids the action applied to.
    affected: Vec<PageId>,
    /// Reformatted records of pages whose publication changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    changed: Option<BTreeMap<PageId, ListRecord>>,
    /// Requested ids the action did not apply to.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    skipped: BTreeMap<PageId, Visibility>,
}

impl ActionResponse {
    fn success(affected: Vec<PageId>) -> Self {
        Self {
            message: "success",
            affected,
            changed: None,
            skipped: BTreeMap::new(),
        }
    }
}

/// Look up the visibility of every requested id missing from `affected`.
async fn skipped_visibility(
    state: &AppState,
    requested: &[PageId],
    affected: &[PageId],
) -> Result<BTreeMap<PageId, Visibility>, ServerError> {
    let mut skipped = BTreeMap::new();
    for &id in requested {
        if affected.contains(&id) || skipped.contains_key(&id) {
            continue;
        }
        skipped.insert(id, state.store.visibility(id).await?);
    }
    Ok(skipped)
}

/// Handle POST /manage/api/pages/actions/enable.
pub(crate) async fn enable_pages(
    State(state): State<Arc<AppState>>,
    Json(ids): Json<Vec<PageId>>,
) -> Result<Json<ActionResponse>, ServerError> {
    set_published(&state, &ids, true).await
}

/// Handle POST /manage/api/pages/actions/disable.
pub(crate) async fn disable_pages(
    State(state): State<Arc<AppState>>,
    Json(ids): Json<Vec<PageId>>,
) -> Result<Json<ActionResponse>, ServerError> {
    set_published(&state, &ids, false).await
}

async fn set_published(
    state: &AppState,
    ids: &[PageId],
    published: bool,
) -> Result<Json<ActionResponse>, ServerError> {
    let now = Utc::now();
    let affected = state.store.set_published(ids, published, now).await?;
    let changed = state
        .store
        .get_many(&affected, DeletedFilter::ExcludeDeleted)
        .await?
        .iter()
        .map(|summary| (summary.page.id, ListRecord::format(summary, now)))
        .collect();

    let skipped = skipped_visibility(state, ids, &affected).await?;

    tracing::info!(published, pages = ?affected, "Publication changed");
    Ok(Json(ActionResponse {
        changed: Some(changed),
        skipped,
        ..ActionResponse::success(affected)
    }))
}

/// Handle POST /manage/api/pages/actions/delete.
pub(crate) async fn delete_pages(
    State(state): State<Arc<AppState>>,
    Json(ids): Json<Vec<PageId>>,
) -> Result<Json<ActionResponse>, ServerError> {
    let affected = state.store.soft_delete(&ids).await?;
    tracing::info!(pages = ?affected, "Pages deleted");
    state.rebuild_routes().await?;
    let skipped = skipped_visibility(&state, &ids, &affected).await?;
    Ok(Json(ActionResponse {
        skipped,
        ..ActionResponse::success(affected)
    }))
}

/// Handle POST /manage/api/pages/actions/restore.
pub(crate) async fn restore_pages(
    State(state): State<Arc<AppState>>,
    Json(ids): Json<Vec<PageId>>,
) -> Result<Json<ActionResponse>, ServerError> {
    let affected = state.store.restore(&ids).await?;
    tracing::info!(pages = ?affected, "Pages restored");
    state.rebuild_routes().await?;
    let skipped = skipped_visibility(&state, &ids, &affected).await?;
    Ok(Json(ActionResponse {
        skipped,
        ..ActionResponse::success(affected)
    }))
}
