use crate::guard::GuardOptions;

use super::backend::ServerBackend;

pub const DEFAULT_BASE_PATH: &str = "/api/auth";

/// Module configuration, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct AuthModuleOptions {
    /// Do not turn the provider's trusted origins into a CORS policy.
    pub disable_trusted_origins_cors: bool,
    /// Do not parse bodies of application routes.
    pub disable_body_parser: bool,
    /// Do not put the guard in front of application routes.
    pub disable_global_auth_guard: bool,
    /// Do not mount the provider's routes (nor CORS / body handling).
    pub disable_controllers: bool,
    /// Overrides the provider's own base path.
    pub base_path: Option<String>,
    /// Explicit backend; inferred from the adapter name when absent.
    pub backend: Option<ServerBackend>,
    /// The host already handles multipart bodies (streaming backend only).
    pub multipart_registered: bool,
    /// Requests to this path are treated as GraphQL operations.
    pub graphql_path: Option<String>,
    pub guard: GuardOptions,
}

/// Leading `/`, no trailing `/`.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
