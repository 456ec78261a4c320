//! Admin add/edit form endpoints.
//!
//! GET endpoints describe the form for a new or existing page. POST
//! endpoints either re-resolve the form after a field change (`__reload`)
//! or validate and persist the submitted values.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use folio_pages::{
    DeletedFilter, FormInitiator, Page, PageId, PageInput, ROOT_PARENT, TemplateChoice,
    ValidationError, creates_cycle,
};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

const ADD_CAPTION: &str = "pages.add_page";
const EDIT_CAPTION: &str = "pages.edit_page";
const CREATE_URL: &str = "/manage/api/pages/form/create";
const SAVE_URL: &str = "/manage/api/pages/form/save";

/// Query of GET /manage/api/pages/form/add.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AddQuery {
    parent_id: PageId,
    template: Option<String>,
    #[serde(rename = "__initiator")]
    initiator: FormInitiator,
}

/// Query of GET /manage/api/pages/form/edit.
#[derive(Debug, Deserialize)]
pub(crate) struct EditQuery {
    id: PageId,
    parent_id: Option<PageId>,
    template: Option<String>,
    #[serde(default, rename = "__initiator")]
    initiator: FormInitiator,
}

/// Body of POST /form/create and /form/save.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FormSubmission {
    /// Page being edited; required by /form/save.
    id: Option<PageId>,
    /// Re-resolve the form instead of saving.
    #[serde(rename = "__reload")]
    reload: bool,
    #[serde(rename = "__initiator")]
    initiator: FormInitiator,
    #[serde(flatten)]
    input: PageInput,
}

/// Form description returned to the admin UI.
#[derive(Debug, Serialize)]
pub(crate) struct FormResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<PageId>,
    caption: &'static str,
    submit: &'static str,
    template: String,
    layout: String,
    values: PageInput,
    templates: Vec<String>,
    layouts: Vec<String>,
}

/// Result of a successful create or save.
#[derive(Debug, Serialize)]
pub(crate) struct SavedResponse {
    message: &'static str,
    id: PageId,
    /// Where the UI continues after creating a page.
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

impl FormResponse {
    fn new(
        state: &AppState,
        id: Option<PageId>,
        choice: TemplateChoice,
        mut values: PageInput,
    ) -> Self {
        let (caption, submit) = if id.is_some() {
            (EDIT_CAPTION, SAVE_URL)
        } else {
            (ADD_CAPTION, CREATE_URL)
        };
        values.template.clone_from(&choice.template);
        values.layout.clone_from(&choice.layout);

        Self {
            id,
            caption,
            submit,
            template: choice.template,
            layout: choice.layout,
            values,
            templates: state.catalog.templates.clone(),
            layouts: state.catalog.layouts.clone(),
        }
    }
}

/// Load the parent whose child settings a form may inherit.
async fn load_parent(state: &AppState, parent_id: PageId) -> Result<Option<Page>, ServerError> {
    if parent_id == ROOT_PARENT {
        return Ok(None);
    }
    Ok(state.store.get(parent_id, DeletedFilter::WithDeleted).await?)
}

async fn load_page(state: &AppState, id: PageId) -> Result<Page, ServerError> {
    state
        .store
        .get(id, DeletedFilter::WithDeleted)
        .await?
        .ok_or(ServerError::PageIdNotFound(id))
}

/// Handle GET /manage/api/pages/form/add.
pub(crate) async fn add_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AddQuery>,
) -> Result<Json<FormResponse>, ServerError> {
    let parent = load_parent(&state, query.parent_id).await?;
    let choice = state.catalog.resolve_for_add(
        query.initiator,
        query.parent_id,
        query.template.as_deref(),
        parent.as_ref(),
    );
    let values = PageInput {
        parent_id: query.parent_id,
        ..PageInput::default()
    };

    Ok(Json(FormResponse::new(&state, None, choice, values)))
}

/// Handle GET /manage/api/pages/form/edit.
pub(crate) async fn edit_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EditQuery>,
) -> Result<Json<FormResponse>, ServerError> {
    let page = load_page(&state, query.id).await?;
    let parent_id = query.parent_id.unwrap_or(page.parent_id);
    let parent = load_parent(&state, parent_id).await?;
    let choice = state.catalog.resolve_for_edit(
        &page,
        query.initiator,
        parent_id,
        query.template.as_deref(),
        parent.as_ref(),
    );
    let values = PageInput {
        parent_id,
        ..PageInput::from_page(&page)
    };

    Ok(Json(FormResponse::new(&state, Some(page.id), choice, values)))
}

/// Handle POST /manage/api/pages/form/create.
pub(crate) async fn create_page(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<FormSubmission>,
) -> Result<Response, ServerError> {
    let FormSubmission {
        reload,
        initiator,
        input,
        ..
    } = submission;

    if reload {
        let parent = load_parent(&state, input.parent_id).await?;
        let choice = state.catalog.resolve_for_add(
            initiator,
            input.parent_id,
            Some(input.template.as_str()).filter(|t| !t.is_empty()),
            parent.as_ref(),
        );
        return Ok(Json(FormResponse::new(&state, None, choice, input)).into_response());
    }

    let input = input.normalized();
    validate(&state, &input, None).await?;

    let page = state.store.create(&input).await?;
    tracing::info!(page_id = page.id, alias = %page.alias, "Page created");
    state.rebuild_routes().await?;

    Ok(Json(SavedResponse {
        message: "success",
        id: page.id,
        redirect: Some(format!("/pages/edit/{}", page.id)),
    })
    .into_response())
}

/// Handle POST /manage/api/pages/form/save.
pub(crate) async fn save_page(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<FormSubmission>,
) -> Result<Response, ServerError> {
    let Some(id) = submission.id else {
        let mut errors = ValidationError::default();
        errors.add("id", "The id field is required.");
        return Err(errors.into());
    };
    let page = load_page(&state, id).await?;
    let FormSubmission {
        reload,
        initiator,
        input,
        ..
    } = submission;

    if reload {
        let parent = load_parent(&state, input.parent_id).await?;
        let choice = state.catalog.resolve_for_edit(
            &page,
            initiator,
            input.parent_id,
            Some(input.template.as_str()).filter(|t| !t.is_empty()),
            parent.as_ref(),
        );
        return Ok(Json(FormResponse::new(&state, Some(id), choice, input)).into_response());
    }

    let input = input.normalized();
    validate(&state, &input, Some(id)).await?;

    let (page, changed) = state.store.update(id, &input).await?;
    tracing::info!(page_id = page.id, ?changed, "Page saved");
    if changed.affects_routes() {
        state.rebuild_routes().await?;
    }

    Ok(Json(SavedResponse {
        message: "success",
        id: page.id,
        redirect: None,
    })
    .into_response())
}

/// Validate field rules, then that the parent exists and does not close a loop.
async fn validate(
    state: &AppState,
    input: &PageInput,
    own_id: Option<PageId>,
) -> Result<(), ServerError> {
    let mut errors = match input.validate(&state.catalog.rules(), own_id) {
        Ok(()) => ValidationError::default(),
        Err(errors) => errors,
    };

    if input.parent_id != ROOT_PARENT && !errors.fields.contains_key("parent_id") {
        let parents = state.store.parent_links().await?;
        if !parents.contains_key(&input.parent_id) {
            errors.add("parent_id", "The selected parent id is invalid.");
        } else if let Some(id) = own_id
            && creates_cycle(&parents, id, input.parent_id)
        {
            errors.add("parent_id", "A page cannot be placed under its own descendant.");
        }
    }

    errors.into_result().map_err(ServerError::from)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_submission_separates_control_fields() {
        let submission: FormSubmission = serde_json::from_value(serde_json::json!({
            "id": 4,
            "__reload": true,
            "__initiator": "parent_id",
            "parent_id": 2,
            "alias": "team",
            "_color": "red"
        }))
        .unwrap();

        assert_eq!(submission.id, Some(4));
        assert!(submission.reload);
        assert_eq!(submission.initiator, FormInitiator::ParentId);
        assert_eq!(submission.input.parent_id, 2);
        assert_eq!(submission.input.alias, "team");
        assert_eq!(submission.input.custom_data().len(), 1);
    }

    #[test]
    fn test_submission_defaults() {
        let submission: FormSubmission =
            serde_json::from_value(serde_json::json!({"alias": "about"})).unwrap();

        assert_eq!(submission.id, None);
        assert!(!submission.reload);
        assert_eq!(submission.initiator, FormInitiator::None);
    }
}
