/*
 * Responsibility
 * - 外部 auth provider を axum アプリに組み込むためのクレート
 *   - context: transport ごとの request を正規化
 *   - session: session 解決
 *   - guard: route metadata による allow / deny
 *   - hooks / module: 起動時の配線
 */
pub mod config;
pub mod context;
pub mod error;
pub mod extractors;
pub mod guard;
pub mod hooks;
pub mod middleware;
pub mod module;
pub mod services;
pub mod session;
pub mod state;

pub use error::{BootstrapError, ErrorBody};
pub use extractors::{AuthSession, CurrentUser, OptionalSession};
pub use guard::{AuthGuard, MetadataRegistry, RouteMeta};
pub use module::{AuthModule, AuthModuleOptions, ServerBackend};
pub use services::auth::{AuthProvider, AuthService, Delegation, ProviderOptions};
pub use session::{SessionUser, UserSession};
