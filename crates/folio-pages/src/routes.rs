//! Public route projection of the page tree.
//!
//! Turns the flat set of non-deleted pages into one [`PageRoute`] per page
//! reachable from the root, with the route path built from the alias chain of
//! its ancestors. The walk is pure: registering the routes with a router is a
//! separate step (see [`RouteTable`](crate::RouteTable)).
//!
//! # Algorithm
//!
//! 1. Group the nodes by `parent_id`, keeping input order within a group.
//! 2. Starting from [`ROOT_PARENT`], emit a route for each node of the group,
//!    then open a prefix scope with the node's alias and walk the group keyed
//!    by the node's id.
//!
//! Nodes whose parent is missing from the input are never reached, so a
//! deleted or dangling ancestor hides its whole subtree.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::page::{PageId, ROOT_PARENT};

/// Namespace of page route names.
pub const ROUTE_NAME_PREFIX: &str = "folio_pages::page::";

/// Path separator between alias segments.
const SEPARATOR: &str = "/";

/// Projection of a page row used for route building.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNode {
    /// Page id.
    pub id: PageId,
    /// Parent page id.
    pub parent_id: PageId,
    /// URL path segment.
    pub alias: String,
}

impl RouteNode {
    /// Create a route node.
    #[must_use]
    pub fn new(id: PageId, parent_id: PageId, alias: impl Into<String>) -> Self {
        Self {
            id,
            parent_id,
            alias: alias.into(),
        }
    }
}

/// Route for a single page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageRoute {
    /// Route name derived from the page id (see [`route_name`]).
    pub name: String,
    /// URL path without leading slash (e.g., "about/team").
    pub path: String,
    /// Page rendered by this route.
    pub page_id: PageId,
}

/// Deterministic route name for a page id.
#[must_use]
pub fn route_name(id: PageId) -> String {
    format!("{ROUTE_NAME_PREFIX}{id}")
}

/// Page id encoded in a route name, if it is a page route name.
#[must_use]
pub fn page_id_from_route_name(name: &str) -> Option<PageId> {
    name.strip_prefix(ROUTE_NAME_PREFIX)?.parse().ok()
}

/// Build the public routes for a set of non-deleted pages.
///
/// Returns routes in depth-first order: each page is followed by its
/// descendants. Every page reachable from [`ROOT_PARENT`] through existing
/// nodes gets exactly one route. An empty input yields no routes.
#[must_use]
pub fn build_routes(nodes: &[RouteNode]) -> Vec<PageRoute> {
    let mut groups: HashMap<PageId, Vec<&RouteNode>> = HashMap::new();
    for node in nodes {
        groups.entry(node.parent_id).or_default().push(node);
    }

    let mut routes = Vec::with_capacity(nodes.len());
    let mut expanded = HashSet::from([ROOT_PARENT]);
    let mut prefix = Vec::new();
    walk(
        &groups,
        ROOT_PARENT,
        &mut prefix,
        &mut expanded,
        &mut routes,
    );
    routes
}

/// Register the group keyed by `parent` inside the current prefix scope.
///
/// `expanded` holds every group already walked. Each group is walked at most
/// once, so a parent chain that loops back (a page whose id equals the root
/// sentinel) cannot recurse forever.
fn walk<'a>(
    groups: &HashMap<PageId, Vec<&'a RouteNode>>,
    parent: PageId,
    prefix: &mut Vec<&'a str>,
    expanded: &mut HashSet<PageId>,
    routes: &mut Vec<PageRoute>,
) {
    let Some(children) = groups.get(&parent) else {
        return;
    };

    for &node in children {
        prefix.push(&node.alias);
        routes.push(PageRoute {
            name: route_name(node.id),
            path: prefix.join(SEPARATOR),
            page_id: node.id,
        });

        if expanded.insert(node.id) {
            walk(groups, node.id, prefix, expanded, routes);
        } else {
            tracing::warn!(
                page_id = node.id,
                path = %prefix.join(SEPARATOR),
                "Page parent chain loops back, children not registered"
            );
        }
        prefix.pop();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn paths(routes: &[PageRoute]) -> Vec<&str> {
        routes.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn test_route_name_is_namespaced_by_id() {
        assert_eq!(route_name(42), "folio_pages::page::42");
    }

    #[test]
    fn test_page_id_from_route_name() {
        assert_eq!(page_id_from_route_name("folio_pages::page::42"), Some(42));
        assert_eq!(page_id_from_route_name("other::42"), None);
        assert_eq!(page_id_from_route_name("folio_pages::page::x"), None);
    }

    #[test]
    fn test_build_routes_empty_input() {
        assert!(build_routes(&[]).is_empty());
    }

    #[test]
    fn test_build_routes_single_root() {
        let routes = build_routes(&[RouteNode::new(1, ROOT_PARENT, "about")]);

        assert_eq!(
            routes,
            vec![PageRoute {
                name: "folio_pages::page::1".to_owned(),
                path: "about".to_owned(),
                page_id: 1,
            }]
        );
    }

    #[test]
    fn test_build_routes_composes_ancestor_aliases() {
        let nodes = vec![
            RouteNode::new(1, ROOT_PARENT, "a"),
            RouteNode::new(2, 1, "b"),
            RouteNode::new(3, 2, "c"),
            RouteNode::new(4, 3, "d"),
        ];

        let routes = build_routes(&nodes);

        assert_eq!(paths(&routes), vec!["a", "a/b", "a/b/c", "a/b/c/d"]);
        assert_eq!(routes[3].page_id, 4);
        assert_eq!(routes[3].name, "folio_pages::page::4");
    }

    #[test]
    fn test_build_routes_input_order_independent_of_hierarchy() {
        // Children listed before their parents
        let nodes = vec![
            RouteNode::new(3, 2, "bios"),
            RouteNode::new(2, 1, "team"),
            RouteNode::new(1, ROOT_PARENT, "about"),
        ];

        let routes = build_routes(&nodes);

        assert_eq!(paths(&routes), vec!["about", "about/team", "about/team/bios"]);
    }

    #[test]
    fn test_build_routes_forest_keeps_sibling_order() {
        let nodes = vec![
            RouteNode::new(1, ROOT_PARENT, "about"),
            RouteNode::new(2, ROOT_PARENT, "contact"),
            RouteNode::new(3, 1, "team"),
            RouteNode::new(4, 1, "history"),
            RouteNode::new(5, 2, "map"),
        ];

        let routes = build_routes(&nodes);

        assert_eq!(
            paths(&routes),
            vec!["about", "about/team", "about/history", "contact", "contact/map"]
        );
    }

    #[test]
    fn test_build_routes_same_alias_under_different_parents() {
        let nodes = vec![
            RouteNode::new(1, ROOT_PARENT, "docs"),
            RouteNode::new(2, ROOT_PARENT, "blog"),
            RouteNode::new(3, 1, "intro"),
            RouteNode::new(4, 2, "intro"),
        ];

        let routes = build_routes(&nodes);

        assert_eq!(paths(&routes), vec!["docs", "docs/intro", "blog", "blog/intro"]);
    }

    #[test]
    fn test_build_routes_deleted_ancestor_hides_subtree() {
        // Page 3 ("bios") is soft-deleted and therefore absent from the input;
        // its child 4 must not be registered either.
        let nodes = vec![
            RouteNode::new(1, ROOT_PARENT, "about"),
            RouteNode::new(2, 1, "team"),
            RouteNode::new(4, 3, "alice"),
        ];

        let routes = build_routes(&nodes);

        assert_eq!(paths(&routes), vec!["about", "about/team"]);
    }

    #[test]
    fn test_build_routes_dangling_parent_unreachable() {
        let nodes = vec![
            RouteNode::new(1, ROOT_PARENT, "about"),
            RouteNode::new(2, 99, "orphan"),
            RouteNode::new(3, 2, "orphan-child"),
        ];

        let routes = build_routes(&nodes);

        assert_eq!(paths(&routes), vec!["about"]);
    }

    #[test]
    fn test_build_routes_detached_cycle_unreachable() {
        let nodes = vec![
            RouteNode::new(1, ROOT_PARENT, "home"),
            RouteNode::new(2, 3, "loop-a"),
            RouteNode::new(3, 2, "loop-b"),
            RouteNode::new(4, 4, "self"),
        ];

        let routes = build_routes(&nodes);

        assert_eq!(paths(&routes), vec!["home"]);
    }

    #[test]
    fn test_build_routes_root_sentinel_id_does_not_recurse() {
        let nodes = vec![
            RouteNode::new(ROOT_PARENT, ROOT_PARENT, "zero"),
            RouteNode::new(1, ROOT_PARENT, "one"),
        ];

        let routes = build_routes(&nodes);

        assert_eq!(paths(&routes), vec!["zero", "one"]);
    }

    #[test]
    fn test_build_routes_idempotent() {
        let nodes = vec![
            RouteNode::new(1, ROOT_PARENT, "about"),
            RouteNode::new(2, 1, "team"),
            RouteNode::new(3, ROOT_PARENT, "contact"),
        ];

        assert_eq!(build_routes(&nodes), build_routes(&nodes));
    }

    #[test]
    fn test_build_routes_deep_chain() {
        let nodes: Vec<RouteNode> = (1..=200)
            .map(|id| RouteNode::new(id, id - 1, format!("n{id}")))
            .collect();

        let routes = build_routes(&nodes);

        assert_eq!(routes.len(), 200);
        let last = routes.last().unwrap();
        assert_eq!(last.page_id, 200);
        assert_eq!(last.path.split('/').count(), 200);
        assert!(last.path.starts_with("n1/n2/n3/"));
        assert!(last.path.ends_with("/n199/n200"));
    }
}
