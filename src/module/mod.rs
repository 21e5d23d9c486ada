/*!
 * Auth module
 *
 * Responsibility:
 * - 起動時に 1 回だけ行う配線
 *   - hook provider を provider 自身の hook に畳み込んで install
 *   - trusted origins → CORS (layered backend のみ)
 *   - base path 以外の body parse / multipart 上限
 *   - `{basePath}/{*path}` を provider の handler に mount
 *   - アプリ側 route に guard を掛ける
 * - 起動後は読み取り専用
 */

mod backend;
mod mount;
mod options;

use std::{fmt, sync::Arc};

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::error::BootstrapError;
use crate::guard::{AuthGuard, MetadataRegistry};
use crate::hooks::{HookProvider, wire_hooks};
use crate::middleware::{self, body::MULTIPART_FILE_SIZE_LIMIT};
use crate::services::auth::{AuthProvider, AuthService, TrustedOrigins};
use crate::state::AuthState;

pub use backend::ServerBackend;
pub use mount::{AUTH_METHODS, mount};
pub use options::{AuthModuleOptions, DEFAULT_BASE_PATH, normalize_base_path};

pub struct AuthModuleBuilder {
    provider: Arc<dyn AuthProvider>,
    options: AuthModuleOptions,
    registry: MetadataRegistry,
    hook_providers: Vec<Arc<dyn HookProvider>>,
    adapter_name: Option<String>,
}

impl AuthModuleBuilder {
    pub fn options(mut self, options: AuthModuleOptions) -> Self {
        self.options = options;
        self
    }

    /// Route metadata read by the guard.
    pub fn metadata(mut self, registry: MetadataRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register a hook container.
    pub fn hook_provider<P: HookProvider>(mut self, provider: Arc<P>) -> Self {
        self.hook_providers.push(provider);
        self
    }

    /// Name of the host server adapter, used to infer the backend when none
    /// is configured.
    pub fn adapter_name(mut self, name: impl Into<String>) -> Self {
        self.adapter_name = Some(name.into());
        self
    }

    /// Validate the configuration and install hooks on the provider.
    ///
    /// Fails before any request is served when hooks or trusted origins are
    /// misconfigured.
    pub fn build(self) -> Result<AuthModule, BootstrapError> {
        let provider_options = self.provider.options();

        if let Some(hooks) = wire_hooks(provider_options.hooks.as_ref(), &self.hook_providers)? {
            self.provider.install_hooks(hooks)?;
            tracing::debug!(
                providers = self.hook_providers.len(),
                "installed composed auth hooks"
            );
        }

        let backend = ServerBackend::resolve(self.options.backend, self.adapter_name.as_deref());

        let base_path = normalize_base_path(
            self.options
                .base_path
                .as_deref()
                .or(provider_options.base_path.as_deref())
                .unwrap_or(DEFAULT_BASE_PATH),
        );

        let cors = if self.options.disable_controllers || self.options.disable_trusted_origins_cors
        {
            None
        } else {
            match &provider_options.trusted_origins {
                None => None,
                Some(TrustedOrigins::Static(origins)) => Some(middleware::cors::layer(origins)?),
                Some(TrustedOrigins::Dynamic(_)) => {
                    return Err(BootstrapError::DynamicTrustedOrigins);
                }
            }
        };

        let guard = AuthGuard::new(Arc::clone(&self.provider), self.options.guard);
        let state = AuthState::new(guard, self.registry, self.options.graphql_path.clone());

        Ok(AuthModule {
            provider: self.provider,
            options: self.options,
            backend,
            base_path,
            cors,
            state,
        })
    }
}

/// The assembled module. Attach it to the application router once.
pub struct AuthModule {
    provider: Arc<dyn AuthProvider>,
    options: AuthModuleOptions,
    backend: ServerBackend,
    base_path: String,
    cors: Option<CorsLayer>,
    state: AuthState,
}

impl AuthModule {
    pub fn builder(provider: Arc<dyn AuthProvider>) -> AuthModuleBuilder {
        AuthModuleBuilder {
            provider,
            options: AuthModuleOptions::default(),
            registry: MetadataRegistry::default(),
            hook_providers: Vec::new(),
            adapter_name: None,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn backend(&self) -> ServerBackend {
        self.backend
    }

    pub fn options(&self) -> &AuthModuleOptions {
        &self.options
    }

    /// Shared state for the auth middleware, for hosts that wire them by hand.
    pub fn state(&self) -> AuthState {
        self.state.clone()
    }

    pub fn service(&self) -> AuthService {
        AuthService::new(Arc::clone(&self.provider))
    }

    /// Wire the module into `app`.
    ///
    /// Routes already on `app` get the guard (unless disabled). The provider's
    /// routes are added afterwards and are never guarded.
    pub fn attach<S>(&self, app: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut router = app;

        if !self.options.disable_global_auth_guard {
            router = middleware::auth::access::apply(router, self.state.clone());
        }

        if self.options.disable_controllers {
            tracing::info!("auth controllers disabled; provider routes are not mounted");
            return router;
        }

        router = mount(router, &self.base_path, Arc::clone(&self.provider));

        match self.backend {
            ServerBackend::Layered => {
                if let Some(cors) = &self.cors {
                    router = router.layer(cors.clone());
                }
                if !self.options.disable_body_parser {
                    router = middleware::body::apply_parsing(router, &self.base_path);
                }
            }
            ServerBackend::Streaming => {
                if self.cors.is_some() {
                    tracing::warn!(
                        "CORS is not registered on the streaming backend; configure it when \
                         building the server and keep it in line with the trusted origins"
                    );
                }
                if self.options.multipart_registered {
                    tracing::debug!("multipart handling already registered by the host");
                } else {
                    router = middleware::body::apply_multipart_limit(router);
                    tracing::info!(limit = MULTIPART_FILE_SIZE_LIMIT, "registered multipart body limit");
                }
            }
        }

        tracing::info!(
            base_path = %self.base_path,
            backend = %self.backend,
            "auth module mounted the provider on '{}/*'",
            self.base_path
        );

        router
    }
}

impl fmt::Debug for AuthModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthModule")
            .field("backend", &self.backend)
            .field("base_path", &self.base_path)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
