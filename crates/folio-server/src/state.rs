//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use folio_pages::TemplateCatalog;
use folio_store::{PageStore, StoreError};

use crate::registry::RouteRegistry;
use crate::render::PageRenderer;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Page storage.
    pub(crate) store: Arc<dyn PageStore>,
    /// Current public routes.
    pub(crate) routes: RouteRegistry,
    /// Page renderer chosen at startup.
    pub(crate) renderer: Arc<dyn PageRenderer>,
    /// Selectable templates and layouts.
    pub(crate) catalog: TemplateCatalog,
    /// Admin list page size.
    pub(crate) page_size: u32,
    /// Bearer token required by the admin API, if any.
    pub(crate) admin_token: Option<String>,
    /// Pages module activation flag.
    pub(crate) pages_enabled: bool,
    /// Application version for cache invalidation.
    pub(crate) version: String,
}

impl AppState {
    /// Rebuild public routes after a change to aliases, parents or deletion state.
    pub(crate) async fn rebuild_routes(&self) -> Result<(), StoreError> {
        self.routes
            .rebuild(self.store.as_ref(), self.pages_enabled)
            .await?;
        Ok(())
    }
}
