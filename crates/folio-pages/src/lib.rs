//! Page tree model and public route projection for Folio.
//!
//! This crate provides:
//! - [`Page`]: content page with publication, SEO, robots and sitemap settings
//! - [`build_routes`]: projection of the page forest into public routes
//! - [`RouteTable`]: registered routes with path resolution and link generation
//! - [`TemplateCatalog`]: template and layout resolution for admin forms
//! - [`ListQuery`] and [`ListRecord`]: admin list query and formatting
//! - [`PageInput`]: editable fields and their validation
//!
//! # Quick Start
//!
//! ```
//! use folio_pages::{RouteNode, RouteTable, ROOT_PARENT, build_routes};
//!
//! let nodes = vec![
//!     RouteNode::new(1, ROOT_PARENT, "about"),
//!     RouteNode::new(2, 1, "team"),
//! ];
//! let table = RouteTable::register(build_routes(&nodes));
//!
//! assert_eq!(table.resolve("about/team"), Some(2));
//! assert_eq!(table.url_for(2).as_deref(), Some("/about/team"));
//! ```

mod listing;
pub(crate) mod page;
mod route_table;
mod routes;
mod template;
mod validation;

pub use listing::{
    DeletedFilter, Direction, ListFilters, ListQuery, ListRecord, ListRequest, ListSearch, Order,
    OrderBy, PUBLISH_END_CAPTION, PUBLISH_START_CAPTION, PageSummary, Paginated, PublishedFilter,
    Search, SearchField,
};
pub use page::{
    ChangeFrequency, Page, PageId, ParseFrequencyError, Publication, ROOT_PARENT, Robots, Seo,
    Sitemap, Visibility,
};
pub use route_table::{RouteError, RouteTable};
pub use routes::{
    PageRoute, ROUTE_NAME_PREFIX, RouteNode, build_routes, page_id_from_route_name, route_name,
};
pub use template::{FormInitiator, TemplateCatalog, TemplateChoice};
pub use validation::{
    MAX_ALIAS_LEN, PageInput, ValidationError, ValidationRules, creates_cycle, is_valid_alias,
};
