//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_pages::{PageId, ValidationError, Visibility};
use folio_store::StoreError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No visible page at the given URL path.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// No page with the given id.
    #[error("Page {0} not found")]
    PageIdNotFound(PageId),

    /// Page row exists but no public route points at it.
    #[error("Page {id} has no public route")]
    NoRoute {
        /// Page id.
        id: PageId,
        /// Storage visibility of the page.
        visibility: Visibility,
    },

    /// Missing or invalid admin token.
    #[error("not authorized")]
    NotAuthorized,

    /// Submitted form values failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::PageNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "path": path}),
            ),
            Self::PageIdNotFound(id) | Self::Store(StoreError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "id": id}),
            ),
            Self::NoRoute { id, visibility } => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page has no public route", "id": id, "visibility": visibility}),
            ),
            Self::NotAuthorized => (
                StatusCode::UNAUTHORIZED,
                json!({"error": "not authorized"}),
            ),
            Self::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": "Validation failed", "fields": e.fields}),
            ),
            Self::Store(e) => {
                tracing::error!(error = %e, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": e.to_string()}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use pretty_assertions::assert_eq;

    use super::*;

    async fn body_json(error: ServerError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_page_not_found_response() {
        let (status, body) = body_json(ServerError::PageNotFound("about/x".to_owned())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Page not found", "path": "about/x"}));
    }

    #[tokio::test]
    async fn test_store_not_found_maps_to_404() {
        let (status, body) = body_json(ServerError::Store(StoreError::NotFound(4))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["id"], 4);
    }

    #[tokio::test]
    async fn test_no_route_reports_visibility() {
        let error = ServerError::NoRoute {
            id: 3,
            visibility: Visibility::SoftDeleted,
        };

        let (status, body) = body_json(error).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": "Page has no public route", "id": 3, "visibility": "soft_deleted"})
        );
    }

    #[tokio::test]
    async fn test_not_authorized_response() {
        let (status, body) = body_json(ServerError::NotAuthorized).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "not authorized"}));
    }

    #[tokio::test]
    async fn test_validation_response_lists_fields() {
        let mut errors = ValidationError::default();
        errors.add("alias", "The alias field is required.");

        let (status, body) = body_json(ServerError::Validation(errors)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"]["alias"][0], "The alias field is required.");
    }
}
