//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower::ServiceBuilder;

use crate::handlers;
use crate::middleware::{auth, security};
use crate::state::AppState;

/// Prefix of the admin API.
pub(crate) const ADMIN_PREFIX: &str = "/manage/api/pages";

/// Create the application router.
///
/// Admin and API routes take priority over page paths, so a page whose path
/// collides with them is shadowed.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    // Admin routes
    let admin_routes = Router::new()
        .route("/list", post(handlers::list::list_pages))
        .route("/routes", get(handlers::routes::get_routes))
        .route("/form/add", get(handlers::form::add_form))
        .route("/form/edit", get(handlers::form::edit_form))
        .route("/form/create", post(handlers::form::create_page))
        .route("/form/save", post(handlers::form::save_page))
        .route("/actions/enable", post(handlers::actions::enable_pages))
        .route("/actions/disable", post(handlers::actions::disable_pages))
        .route("/actions/delete", post(handlers::actions::delete_pages))
        .route("/actions/restore", post(handlers::actions::restore_pages))
        .route_layer(from_fn_with_state(
            Arc::clone(&state),
            auth::require_admin_token,
        ))
        .layer(security::api_csp_layer());

    // Link API
    let api_routes = Router::new()
        .route("/api/links/{id}", get(handlers::links::get_link))
        .layer(security::api_csp_layer());

    // Public pages
    let page_routes = Router::new()
        .route("/", get(handlers::public::get_root_page))
        .route("/{*path}", get(handlers::public::get_page))
        .layer(security::page_csp_layer());

    Router::new()
        .nest(ADMIN_PREFIX, admin_routes)
        .merge(api_routes)
        .merge(page_routes)
        .layer(
            ServiceBuilder::new()
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer())
                .layer(security::referrer_policy_layer()),
        )
        .with_state(state)
}
