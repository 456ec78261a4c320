//! Registered routes endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use folio_pages::{PageId, PageRoute};
use serde::Serialize;

use crate::state::AppState;

/// Response for GET /manage/api/pages/routes.
#[derive(Debug, Serialize)]
pub(crate) struct RoutesResponse {
    /// Registered routes in registration order.
    routes: Vec<RouteResponse>,
    /// Reasons routes were not registered.
    rejected: Vec<String>,
}

/// Registered route for serialization.
#[derive(Debug, Serialize)]
struct RouteResponse {
    name: String,
    /// URL path with leading slash.
    path: String,
    page_id: PageId,
}

impl From<&PageRoute> for RouteResponse {
    fn from(route: &PageRoute) -> Self {
        Self {
            name: route.name.clone(),
            path: format!("/{}", route.path),
            page_id: route.page_id,
        }
    }
}

/// Handle GET /manage/api/pages/routes.
pub(crate) async fn get_routes(State(state): State<Arc<AppState>>) -> Json<RoutesResponse> {
    let table = state.routes.snapshot();
    Json(RoutesResponse {
        routes: table.routes().iter().map(RouteResponse::from).collect(),
        rejected: table.rejected().iter().map(ToString::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use folio_pages::route_name;

    use super::*;

    #[test]
    fn test_route_response_adds_leading_slash() {
        let route = PageRoute {
            name: route_name(2),
            path: "about/team".to_owned(),
            page_id: 2,
        };

        let json = serde_json::to_value(RouteResponse::from(&route)).unwrap();

        assert_eq!(json["path"], "/about/team");
        assert_eq!(json["page_id"], 2);
        assert_eq!(json["name"], "folio_pages::page::2");
    }
}
