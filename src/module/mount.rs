use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::Request,
    response::IntoResponse,
    routing::{MethodFilter, on},
};

use crate::services::auth::AuthProvider;

/// Verbs routed to the provider.
pub const AUTH_METHODS: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PUT)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::HEAD)
    .or(MethodFilter::OPTIONS);

/// Route `{base_path}/*` to the provider.
///
/// The provider owns the whole exchange. `NotHandled` becomes a 404 and
/// `Errored` a 500; nothing else writes to the response.
pub fn mount<S>(router: Router<S>, base_path: &str, provider: Arc<dyn AuthProvider>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let handler = move |req: Request<Body>| {
        let provider = Arc::clone(&provider);
        async move { provider.handle(req).await.into_response() }
    };

    router.route(&format!("{base_path}/{{*path}}"), on(AUTH_METHODS, handler))
}
