use axum::http::HeaderMap;

use crate::context::AuthRequest;
use crate::services::auth::{AuthProvider, ProviderError};

use super::types::{SessionUser, UserSession};

/// The session attached to a request by the guard / append-session middleware.
/// `None` means an anonymous caller.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSession(pub Option<UserSession>);

/// The `user` sub-record of the attached session, kept separately so
/// observability layers can pick it up without knowing the session shape.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<SessionUser>);

/// Look the caller's session up and attach it to `req`.
///
/// A missing session is `Ok(None)`; only provider failures are errors.
pub async fn resolve_session(
    provider: &dyn AuthProvider,
    req: &mut dyn AuthRequest,
) -> Result<Option<UserSession>, ProviderError> {
    let headers = req
        .headers()
        .or_else(|| req.handshake_headers())
        .cloned()
        .unwrap_or_else(HeaderMap::new);

    let session = provider.get_session(&headers).await?;

    let extensions = req.extensions_mut();
    extensions.insert(ResolvedSession(session.clone()));
    extensions.insert(CurrentUser(session.as_ref().map(|s| s.user.clone())));

    Ok(session)
}
