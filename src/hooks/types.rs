use std::{fmt, future::Future, pin::Pin, sync::Arc};

use axum::{
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::ErrorBody;

pub type HookFuture = Pin<Box<dyn Future<Output = Result<(), HookError>> + Send>>;

/// A hook callable. Receives its own copy of the context.
pub type HookFn = Arc<dyn Fn(HookContext) -> HookFuture + Send + Sync>;

/// Wrap an async closure as a [`HookFn`].
pub fn hook_fn<F, Fut>(f: F) -> HookFn
where
    F: Fn(HookContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HookError>> + Send + 'static,
{
    Arc::new(move |ctx| -> HookFuture { Box::pin(f(ctx)) })
}

/// What a hook sees about the auth request it intercepts.
///
/// `path` is relative to the base path (`/sign-up/email`, not
/// `/api/auth/sign-up/email`). `status` is only set for after-hooks.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub path: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub status: Option<StatusCode>,
}

impl HookContext {
    pub fn new(path: impl Into<String>, method: Method, headers: HeaderMap) -> Self {
        Self {
            path: path.into(),
            method,
            headers,
            status: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Before,
    After,
}

/// Path filter for a hook method. Always begins with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookPath(String);

impl HookPath {
    pub fn parse(path: &str) -> Option<Self> {
        path.starts_with('/').then(|| Self(path.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, path: &str) -> bool {
        self.0 == path
    }
}

#[derive(Debug, Error)]
pub enum HookError {
    /// The hook refused the request; the auth route answers with `status`.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("hook failed: {0}")]
    Failed(String),
}

impl HookError {
    pub fn reject(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for HookError {
    fn into_response(self) -> Response {
        match self {
            HookError::Rejected { status, message } => {
                ErrorBody::new("HOOK_REJECTED", message).into_response_with(status)
            }
            HookError::Failed(message) => {
                tracing::warn!(error = %message, "auth hook failed");
                ErrorBody::new("INTERNAL_SERVER_ERROR", "internal server error")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// The provider's own before/after hooks, as configured on the provider.
///
/// `Some(HookConfig::default())` means "hooks configured, none set"; a
/// provider without any hook configuration returns `None` from
/// [`ProviderOptions::hooks`](crate::services::auth::ProviderOptions).
#[derive(Clone, Default)]
pub struct HookConfig {
    pub before: Option<HookFn>,
    pub after: Option<HookFn>,
}

impl fmt::Debug for HookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookConfig")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// The single before/after pipeline handed to the provider at startup.
#[derive(Clone, Default)]
pub struct ComposedHooks {
    pub before: Option<HookFn>,
    pub after: Option<HookFn>,
}

impl ComposedHooks {
    pub async fn run_before(&self, ctx: &HookContext) -> Result<(), HookError> {
        match &self.before {
            Some(hook) => hook(ctx.clone()).await,
            None => Ok(()),
        }
    }

    pub async fn run_after(&self, ctx: &HookContext) -> Result<(), HookError> {
        match &self.after {
            Some(hook) => hook(ctx.clone()).await,
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ComposedHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedHooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// One hook-tagged method of a [`HookProvider`].
#[derive(Clone)]
pub struct HookMethod {
    pub name: &'static str,
    pub phase: HookPhase,
    /// Raw path filter; validated when hooks are wired.
    pub path: Option<String>,
    pub handler: HookFn,
}

impl HookMethod {
    pub fn before<F, Fut>(name: &'static str, path: Option<&str>, f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        Self {
            name,
            phase: HookPhase::Before,
            path: path.map(str::to_string),
            handler: hook_fn(f),
        }
    }

    pub fn after<F, Fut>(name: &'static str, path: Option<&str>, f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        Self {
            name,
            phase: HookPhase::After,
            path: path.map(str::to_string),
            handler: hook_fn(f),
        }
    }
}

impl fmt::Debug for HookMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookMethod")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("path", &self.path)
            .finish()
    }
}

/// A hook container. Registering an implementor on the module builder is
/// what marks it as one.
pub trait HookProvider: Send + Sync + 'static {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn hooks(self: Arc<Self>) -> Vec<HookMethod>;
}
