//! Access decision gate as router middleware.
//!
//! Responsibility:
//! - Look up the matched route's metadata and let `AuthGuard` decide.
//! - Attach the session before deciding (public / optional handlers still see it).
//! - Leave requests that matched no route alone, so a 404 stays a 404.

use axum::{
    Router,
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::context::{ExecutionContext, UnsupportedContext};
use crate::guard::GuardError;
use crate::state::AuthState;

/// Put the guard in front of every route of `router`.
///
/// Routes added to the router after this call are not guarded; the module
/// mounts the provider's own routes that way.
///
/// ```ignore
/// let app = Router::new().route("/me", get(me));
/// let app = middleware::auth::access::apply(app, module.state());
/// ```
pub fn apply<S>(router: Router<S>, state: AuthState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AuthState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let Some(matched) = req.extensions().get::<MatchedPath>().cloned() else {
        return Ok(next.run(req).await);
    };

    let meta = state.registry.lookup(req.method(), matched.as_str());
    let mut ctx = ExecutionContext::classify(req, state.graphql_path.as_deref());

    state.guard.can_activate(&mut ctx, &meta).await?;

    let transport = ctx.transport();
    let req = ctx
        .into_request()
        .ok_or(GuardError::Unsupported(UnsupportedContext(transport)))?;

    Ok(next.run(req).await)
}
