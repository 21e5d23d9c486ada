use std::{fmt, sync::Arc};

use crate::context::{ExecutionContext, TransportPolicy, request_from_context};
use crate::services::auth::AuthProvider;
use crate::session::{UserSession, resolve_session};

use super::error::{AuthErrorKind, Denial, GuardError};
use super::metadata::RouteMeta;

/// How `optional` routes treat role tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptionalRoles {
    /// Optional routes always allow; authorization is left to the handler.
    #[default]
    Defer,
    /// Anonymous callers are allowed, authenticated callers must match the roles.
    EnforceWhenAuthenticated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardOptions {
    pub transports: TransportPolicy,
    pub optional_roles: OptionalRoles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(AuthErrorKind),
}

/// The access decision for one request. Pure; the session is already resolved.
pub fn decide(meta: &RouteMeta, session: Option<&UserSession>, optional_roles: OptionalRoles) -> Decision {
    if meta.is_public() {
        return Decision::Allow;
    }

    if meta.is_optional() {
        match (optional_roles, session) {
            (OptionalRoles::Defer, _) | (OptionalRoles::EnforceWhenAuthenticated, None) => {
                return Decision::Allow;
            }
            (OptionalRoles::EnforceWhenAuthenticated, Some(_)) => {}
        }
    }

    let Some(session) = session else {
        return Decision::Deny(AuthErrorKind::Unauthorized);
    };

    match meta.required_roles() {
        Some(required) if !session.has_any_role(required) => {
            Decision::Deny(AuthErrorKind::Forbidden)
        }
        _ => Decision::Allow,
    }
}

/// The request-authentication guard.
#[derive(Clone)]
pub struct AuthGuard {
    provider: Arc<dyn AuthProvider>,
    options: GuardOptions,
}

impl AuthGuard {
    pub fn new(provider: Arc<dyn AuthProvider>, options: GuardOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &GuardOptions {
        &self.options
    }

    pub fn provider(&self) -> &Arc<dyn AuthProvider> {
        &self.provider
    }

    /// Resolve the session onto the request, then allow or deny.
    ///
    /// The session is attached before the decision, so public and optional
    /// handlers still see it.
    pub async fn can_activate(
        &self,
        ctx: &mut ExecutionContext,
        meta: &RouteMeta,
    ) -> Result<(), GuardError> {
        let transport = ctx.transport();
        let req = request_from_context(ctx, &self.options.transports)?;
        let session = resolve_session(self.provider.as_ref(), req).await?;

        match decide(meta, session.as_ref(), self.options.optional_roles) {
            Decision::Allow => Ok(()),
            Decision::Deny(kind) => {
                tracing::debug!(transport = transport.as_str(), code = kind.code(), "request denied");
                Err(GuardError::Denied(Denial::for_transport(transport, kind)))
            }
        }
    }
}

impl fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGuard")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
