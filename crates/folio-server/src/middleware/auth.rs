//! Admin API authorization.
//!
//! When an admin token is configured, every admin request must carry it as
//! `Authorization: Bearer <token>`. Without a token the admin API is open.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::ServerError;
use crate::state::AppState;

/// Reject admin requests without the configured bearer token.
pub(crate) async fn require_admin_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if let Some(expected) = state.admin_token.as_deref()
        && !bearer_token(request.headers()).is_some_and(|token| tokens_match(token, expected))
    {
        tracing::warn!(path = %request.uri().path(), "Rejected admin request");
        return Err(ServerError::NotAuthorized);
    }

    Ok(next.run(request).await)
}

/// Compare tokens in constant time.
///
/// Both sides are hashed first so the comparison also hides their lengths.
fn tokens_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided[..].ct_eq(&expected[..]).into()
}

/// Token of an `Authorization: Bearer` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
