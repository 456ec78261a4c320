//! Page storage for Folio.
//!
//! [`PageStore`] is the persistence seam used by the server and the CLI.
//! [`SqlitePageStore`] implements it on top of `sqlx` and SQLite.
//!
//! Every query that can see soft-deleted rows takes a [`DeletedFilter`] so
//! visibility is decided in one place. Purging rows is not supported.

mod schema;
mod sqlite;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_pages::{
    DeletedFilter, ListQuery, Page, PageId, PageInput, PageSummary, Paginated, RouteNode,
    Visibility,
};

pub use sqlite::SqlitePageStore;

/// Error returned by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database query or connection failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// No row with the given id.
    #[error("Page {0} not found")]
    NotFound(PageId),
    /// A stored value could not be converted into the page model.
    #[error("Invalid value in column {column}: {message}")]
    Decode {
        /// Column name.
        column: &'static str,
        /// Conversion failure.
        message: String,
    },
    /// Custom attributes could not be encoded or decoded.
    #[error("Invalid page data: {0}")]
    Data(#[from] serde_json::Error),
}

/// Route-relevant fields changed by an update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChangedFields {
    /// The alias changed.
    pub alias: bool,
    /// The parent changed.
    pub parent_id: bool,
}

impl ChangedFields {
    /// Whether the change can alter any public route path.
    #[must_use]
    pub fn affects_routes(self) -> bool {
        self.alias || self.parent_id
    }
}

/// Persistence of pages.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Create the schema if it does not exist.
    async fn migrate(&self) -> Result<(), StoreError>;

    /// Whether the schema exists.
    async fn is_migrated(&self) -> Result<bool, StoreError>;

    /// Route projection of every non-deleted page, ordered by id.
    async fn route_nodes(&self) -> Result<Vec<RouteNode>, StoreError>;

    /// Parent id of every stored page, deleted pages included.
    async fn parent_links(&self) -> Result<HashMap<PageId, PageId>, StoreError>;

    /// Storage visibility of a page. Ids without a row are [`Visibility::Purged`].
    async fn visibility(&self, id: PageId) -> Result<Visibility, StoreError>;

    /// Load a single page.
    async fn get(&self, id: PageId, deleted: DeletedFilter) -> Result<Option<Page>, StoreError>;

    /// Load pages with their children counts, ordered by id.
    async fn get_many(
        &self,
        ids: &[PageId],
        deleted: DeletedFilter,
    ) -> Result<Vec<PageSummary>, StoreError>;

    /// Run a list query.
    ///
    /// `now` decides which pages count as published.
    async fn list(
        &self,
        query: &ListQuery,
        per_page: u32,
        now: DateTime<Utc>,
    ) -> Result<Paginated<PageSummary>, StoreError>;

    /// Insert a page.
    async fn create(&self, input: &PageInput) -> Result<Page, StoreError>;

    /// Update a page, deleted or not.
    async fn update(
        &self,
        id: PageId,
        input: &PageInput,
    ) -> Result<(Page, ChangedFields), StoreError>;

    /// Soft-delete non-deleted pages. Returns the ids actually deleted.
    async fn soft_delete(&self, ids: &[PageId]) -> Result<Vec<PageId>, StoreError>;

    /// Restore soft-deleted pages. Returns the ids actually restored.
    async fn restore(&self, ids: &[PageId]) -> Result<Vec<PageId>, StoreError>;

    /// Publish or unpublish non-deleted pages as seen at `now`.
    ///
    /// Publishing also clears window bounds that keep a page hidden. Pages
    /// already in the requested state are left untouched. Returns the ids
    /// actually changed.
    async fn set_published(
        &self,
        ids: &[PageId],
        published: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<PageId>, StoreError>;
}
