//! Public route registry.
//!
//! Holds the current [`RouteTable`] snapshot and rebuilds it in full from the
//! store whenever an alias, a parent or a page's deletion state changes.

use std::sync::{Arc, RwLock};

use folio_pages::{RouteTable, build_routes};
use folio_store::{PageStore, StoreError};
use tokio::sync::Mutex;

/// Current public routes.
///
/// # Thread Safety
///
/// - Uses internal `RwLock<Arc<RouteTable>>` for the current snapshot
/// - Uses an async `Mutex<()>` for serializing rebuilds
///
/// Readers keep the `Arc` they obtained, so a rebuild never changes routes
/// under an in-flight request.
pub struct RouteRegistry {
    rebuild_lock: Mutex<()>,
    current: RwLock<Arc<RouteTable>>,
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteRegistry {
    /// Create a registry with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rebuild_lock: Mutex::new(()),
            current: RwLock::new(Arc::new(RouteTable::default())),
        }
    }

    /// Current route table snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RouteTable> {
        Arc::clone(&self.current.read().unwrap())
    }

    /// Rebuild the route table from the store.
    ///
    /// Registers nothing when `enabled` is false or the schema is missing.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub async fn rebuild(
        &self,
        store: &dyn PageStore,
        enabled: bool,
    ) -> Result<Arc<RouteTable>, StoreError> {
        let _guard = self.rebuild_lock.lock().await;

        let nodes = if enabled && store.is_migrated().await? {
            store.route_nodes().await?
        } else {
            tracing::debug!(enabled, "Pages module inactive, no routes registered");
            Vec::new()
        };

        let table = Arc::new(RouteTable::register(build_routes(&nodes)));
        for rejected in table.rejected() {
            tracing::warn!(error = %rejected, "Page route not registered");
        }
        tracing::info!(
            routes = table.len(),
            rejected = table.rejected().len(),
            "Page routes rebuilt"
        );

        *self.current.write().unwrap() = Arc::clone(&table);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use folio_pages::{PageInput, ROOT_PARENT};
    use folio_store::SqlitePageStore;
    use pretty_assertions::assert_eq;

    use super::*;

    fn input(parent_id: i64, alias: &str) -> PageInput {
        PageInput {
            parent_id,
            alias: alias.to_owned(),
            name: alias.to_owned(),
            template: "page".to_owned(),
            layout: "page.html".to_owned(),
            ..PageInput::default()
        }
    }

    #[tokio::test]
    async fn test_rebuild_registers_store_pages() {
        let store = SqlitePageStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        let about = store.create(&input(ROOT_PARENT, "about")).await.unwrap().id;
        let team = store.create(&input(about, "team")).await.unwrap().id;

        let registry = RouteRegistry::new();
        registry.rebuild(&store, true).await.unwrap();

        let table = registry.snapshot();
        assert_eq!(table.resolve("about/team"), Some(team));
        assert_eq!(table.url_for(about).as_deref(), Some("/about"));
    }

    #[tokio::test]
    async fn test_rebuild_disabled_registers_nothing() {
        let store = SqlitePageStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store.create(&input(ROOT_PARENT, "about")).await.unwrap();

        let registry = RouteRegistry::new();
        registry.rebuild(&store, false).await.unwrap();

        assert!(registry.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_rebuild_without_schema_registers_nothing() {
        let store = SqlitePageStore::in_memory().await.unwrap();

        let registry = RouteRegistry::new();
        let table = registry.rebuild(&store, true).await.unwrap();

        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_survives_rebuild() {
        let store = SqlitePageStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        let about = store.create(&input(ROOT_PARENT, "about")).await.unwrap().id;

        let registry = RouteRegistry::new();
        registry.rebuild(&store, true).await.unwrap();
        let before = registry.snapshot();

        store.soft_delete(&[about]).await.unwrap();
        registry.rebuild(&store, true).await.unwrap();

        assert_eq!(before.resolve("about"), Some(about));
        assert_eq!(registry.snapshot().resolve("about"), None);
    }
}
