//! The seam to the external authentication library.
//!
//! Everything behind this trait (credential checks, token issuance, session
//! storage, its own HTTP endpoints) belongs to the provider. This crate only
//! asks it for the caller's session and hands it whole requests.
use std::{fmt, sync::Arc};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::ErrorBody;
use crate::hooks::{ComposedHooks, HookConfig};
use crate::session::UserSession;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),

    #[error("auth provider returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("hooks were already installed on this provider")]
    HooksAlreadyInstalled,
}

impl IntoResponse for ProviderError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "auth provider failure");
        ErrorBody::new("INTERNAL_SERVER_ERROR", "internal server error")
            .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Origins the provider trusts for browser calls.
#[derive(Clone)]
pub enum TrustedOrigins {
    Static(Vec<String>),
    /// Computed per request. Cannot be turned into a CORS policy.
    Dynamic(Arc<dyn Fn(&HeaderMap) -> Vec<String> + Send + Sync>),
}

impl fmt::Debug for TrustedOrigins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustedOrigins::Static(origins) => f.debug_tuple("Static").field(origins).finish(),
            TrustedOrigins::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// The part of the provider's own configuration this crate reads.
#[derive(Debug, Clone, Default)]
pub struct ProviderOptions {
    pub base_path: Option<String>,
    pub trusted_origins: Option<TrustedOrigins>,
    /// `None`: the provider has no hook configuration at all.
    pub hooks: Option<HookConfig>,
}

/// Result of handing a request to the provider's own handler.
#[derive(Debug)]
pub enum Delegation {
    /// The provider produced the response; nothing else may write one.
    Handled(Response),
    /// The provider has no endpoint for this request.
    NotHandled,
    Errored(ProviderError),
}

impl IntoResponse for Delegation {
    fn into_response(self) -> Response {
        match self {
            Delegation::Handled(res) => res,
            Delegation::NotHandled => StatusCode::NOT_FOUND.into_response(),
            Delegation::Errored(err) => err.into_response(),
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    fn options(&self) -> &ProviderOptions;

    /// `Ok(None)` for anonymous callers.
    async fn get_session(&self, headers: &HeaderMap) -> ProviderResult<Option<UserSession>>;

    async fn handle(&self, req: Request<Body>) -> Delegation;

    /// Called once at startup with the composed hook pipeline.
    fn install_hooks(&self, hooks: ComposedHooks) -> ProviderResult<()>;
}
