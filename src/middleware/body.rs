//! Request body handling around the auth provider's routes.
//!
//! - Layered backend: application routes get JSON / urlencoded bodies parsed
//!   into [`ParsedBody`]; requests under the base path reach the provider
//!   with the body untouched (it parses its own).
//! - Streaming backend: nothing is parsed up front; request bodies (multipart
//!   uploads included) are capped at [`MULTIPART_FILE_SIZE_LIMIT`] bytes while
//!   they stream.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use thiserror::Error;
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::ErrorBody;
use crate::guard::is_under;

/// Upper bound for bodies parsed on application routes.
pub const PARSED_BODY_LIMIT: usize = 1024 * 1024;

/// Upper bound for multipart uploads on the streaming backend.
pub const MULTIPART_FILE_SIZE_LIMIT: usize = 10_000_000;

/// The parsed request body of an application route.
///
/// JSON bodies keep their shape; urlencoded bodies become an object of strings.
/// The raw bytes stay on the request, so `Json<T>` / `Form<T>` keep working.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Value);

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

impl IntoResponse for BodyError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            BodyError::InvalidJson(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            BodyError::TooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
        };
        ErrorBody::new(code, self.to_string()).into_response_with(status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
}

/// Parse bodies on every route except those under `base_path`.
pub fn apply_parsing<S>(router: Router<S>, base_path: &str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let base_path: Arc<str> = Arc::from(base_path);
    router.layer(middleware::from_fn_with_state(base_path, parse_body))
}

/// Cap request bodies at [`MULTIPART_FILE_SIZE_LIMIT`].
///
/// A declared `Content-Length` above the limit is refused with 413 before the
/// handler runs; otherwise the body is limited as it is read.
pub fn apply_multipart_limit<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(RequestBodyLimitLayer::new(MULTIPART_FILE_SIZE_LIMIT))
}

async fn parse_body(
    State(base_path): State<Arc<str>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, BodyError> {
    if is_under(req.uri().path(), &base_path) {
        return Ok(next.run(req).await);
    }

    let Some(kind) = body_kind(req.headers()) else {
        return Ok(next.run(req).await);
    };

    let (parts, body) = req.into_parts();
    let bytes = collect(body, PARSED_BODY_LIMIT).await?;

    let parsed = match kind {
        BodyKind::Json if bytes.is_empty() => Value::Null,
        BodyKind::Json => serde_json::from_slice(&bytes)?,
        BodyKind::Form => Value::Object(
            url::form_urlencoded::parse(&bytes)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect::<Map<_, _>>(),
        ),
    };

    let mut req = Request::from_parts(parts, Body::from(bytes));
    req.extensions_mut().insert(ParsedBody(parsed));

    Ok(next.run(req).await)
}

async fn collect(body: Body, limit: usize) -> Result<Bytes, BodyError> {
    to_bytes(body, limit).await.map_err(|err| {
        tracing::debug!(error = %err, limit, "failed to read request body");
        BodyError::TooLarge { limit }
    })
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
}

fn body_kind(headers: &HeaderMap) -> Option<BodyKind> {
    let mime = content_type(headers)?;
    if mime == "application/json" || mime.ends_with("+json") {
        Some(BodyKind::Json)
    } else if mime == "application/x-www-form-urlencoded" {
        Some(BodyKind::Form)
    } else {
        None
    }
}
