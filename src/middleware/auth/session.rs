//! Session-only middleware.
//!
//! Responsibility:
//! - Resolve the session and attach it to the request extensions.
//! - Make no access decision; handlers use `OptionalSession` / `AuthSession`.
//!
//! For hosts that disable the global guard.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::services::auth::ProviderError;
use crate::session::resolve_session;
use crate::state::AuthState;

pub fn apply<S>(router: Router<S>, state: AuthState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(state, append_session))
}

async fn append_session(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ProviderError> {
    resolve_session(state.provider().as_ref(), &mut req).await?;
    Ok(next.run(req).await)
}
