//! Registered public routes.
//!
//! [`RouteTable`] is the registration step that follows [`build_routes`]:
//! it accepts each [`PageRoute`] whose path is well-formed and unique, and
//! rejects the rest with a [`RouteError`]. The accepted set answers path
//! lookups for dispatch and id or name lookups for link generation.
//!
//! [`build_routes`]: crate::build_routes

use std::collections::HashMap;

use crate::page::PageId;
use crate::routes::{PageRoute, page_id_from_route_name};
use crate::validation::is_valid_alias;

/// Reason a route was not registered.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A path segment contains characters the router cannot accept.
    #[error("Route {name} has invalid path segment {segment:?} in \"{path}\"")]
    InvalidSegment {
        /// Route name.
        name: String,
        /// Full route path.
        path: String,
        /// Offending segment.
        segment: String,
    },
    /// Another route already uses the same path.
    #[error("Route {name} path \"{path}\" is already registered by {existing}")]
    Collision {
        /// Route name.
        name: String,
        /// Full route path.
        path: String,
        /// Name of the route that owns the path.
        existing: String,
    },
}

/// Set of registered public page routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<PageRoute>,
    by_path: HashMap<String, usize>,
    by_page: HashMap<PageId, usize>,
    rejected: Vec<RouteError>,
}

impl RouteTable {
    /// Register routes in order. The first route claiming a path wins.
    ///
    /// A later route never overwrites an earlier one with the same path. It
    /// is rejected with [`RouteError::Collision`] and listed in
    /// [`RouteTable::rejected`], so the page registered first keeps its URL
    /// regardless of later siblings.
    #[must_use]
    pub fn register(routes: Vec<PageRoute>) -> Self {
        let mut table = Self::default();
        for route in routes {
            if let Err(err) = table.insert(route) {
                table.rejected.push(err);
            }
        }
        table
    }

    fn insert(&mut self, route: PageRoute) -> Result<(), RouteError> {
        let invalid = route
            .path
            .split('/')
            .find(|s| !is_valid_alias(s))
            .map(str::to_owned);
        if let Some(segment) = invalid {
            return Err(RouteError::InvalidSegment {
                segment,
                name: route.name,
                path: route.path,
            });
        }

        if let Some(&idx) = self.by_path.get(&route.path) {
            return Err(RouteError::Collision {
                existing: self.routes[idx].name.clone(),
                name: route.name,
                path: route.path,
            });
        }

        let idx = self.routes.len();
        self.by_path.insert(route.path.clone(), idx);
        self.by_page.insert(route.page_id, idx);
        self.routes.push(route);
        Ok(())
    }

    /// Resolve a URL path to the page it renders.
    ///
    /// Leading and trailing slashes are ignored.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<PageId> {
        let path = path.trim_matches('/');
        self.by_path.get(path).map(|&i| self.routes[i].page_id)
    }

    /// Route registered for a page.
    #[must_use]
    pub fn route_for(&self, id: PageId) -> Option<&PageRoute> {
        self.by_page.get(&id).map(|&i| &self.routes[i])
    }

    /// Canonical URL (with leading slash) of a page.
    #[must_use]
    pub fn url_for(&self, id: PageId) -> Option<String> {
        self.route_for(id).map(|route| format!("/{}", route.path))
    }

    /// Canonical URL (with leading slash) for a route name.
    #[must_use]
    pub fn url_for_name(&self, name: &str) -> Option<String> {
        self.url_for(page_id_from_route_name(name)?)
    }

    /// Registered routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[PageRoute] {
        &self.routes
    }

    /// Routes that were built but not registered.
    #[must_use]
    pub fn rejected(&self) -> &[RouteError] {
        &self.rejected
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True if no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
