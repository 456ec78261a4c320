//! Security headers middleware.
//!
//! Rendered pages and JSON endpoints get different Content-Security-Policy
//! values: page content comes from editors and may embed remote images and
//! stylesheets, while JSON responses never load anything.
//!
//! Every response also gets X-Content-Type-Options, X-Frame-Options and
//! Referrer-Policy.

use axum::http::HeaderValue;
use axum::http::header::{self, HeaderName};
use tower_http::set_header::SetResponseHeaderLayer;

/// Policy for rendered pages.
const PAGE_CSP: &str = "default-src 'self'; \
                        script-src 'self'; \
                        style-src 'self' 'unsafe-inline' https:; \
                        font-src 'self' data: https:; \
                        img-src 'self' data: https:; \
                        frame-ancestors 'none'";

/// Policy for JSON endpoints.
const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

fn overriding(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

/// Content-Security-Policy for rendered pages.
pub(crate) fn page_csp_layer() -> SetResponseHeaderLayer<HeaderValue> {
    overriding(header::CONTENT_SECURITY_POLICY, PAGE_CSP)
}

/// Content-Security-Policy for JSON endpoints.
pub(crate) fn api_csp_layer() -> SetResponseHeaderLayer<HeaderValue> {
    overriding(header::CONTENT_SECURITY_POLICY, API_CSP)
}

pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    overriding(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
}

pub(crate) fn frame_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    overriding(header::X_FRAME_OPTIONS, "DENY")
}

/// Keep admin URLs out of the Referer sent to external sites.
pub(crate) fn referrer_policy_layer() -> SetResponseHeaderLayer<HeaderValue> {
    overriding(header::REFERRER_POLICY, "strict-origin-when-cross-origin")
}
