//! CORS policy derived from the auth provider's trusted origins.
//!
//! Note:
//! - CORS is enforced by browsers. Native apps and server-to-server calls are not
//!   restricted by CORS.
//! - Only a static origin list can become a policy. A per-request origin function
//!   is rejected at startup.
//!
//! Policy:
//! - allowlist = trusted origins (exact match), WITH credentials.
//! - methods GET/POST/PUT/PATCH/DELETE.
//! - request headers: whatever the preflight asks for.

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::error::BootstrapError;

/// Build the CORS layer for `origins`.
///
/// Every origin must be a valid header value; a bad one fails the boot rather
/// than silently shrinking the allowlist.
pub fn layer(origins: &[String]) -> Result<CorsLayer, BootstrapError> {
    let allowed = origins
        .iter()
        .map(|s| HeaderValue::from_str(s).map_err(|_| BootstrapError::InvalidOrigin(s.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    // No `Any` anywhere: tower-http rejects wildcards combined with credentials.
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

