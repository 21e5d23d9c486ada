/*
 * Responsibility
 * - auth middleware に渡す共有コンテキスト (AuthState)
 *   - guard, route metadata, graphql path
 * - Clone 前提で持つ (内部は Arc/Clone cheap)。起動後は読み取り専用
 */
use std::sync::Arc;

use crate::guard::{AuthGuard, MetadataRegistry};
use crate::services::auth::AuthProvider;

#[derive(Clone, Debug)]
pub struct AuthState {
    pub guard: Arc<AuthGuard>,
    pub registry: Arc<MetadataRegistry>,
    pub graphql_path: Option<Arc<str>>,
}

impl AuthState {
    pub fn new(
        guard: AuthGuard,
        registry: MetadataRegistry,
        graphql_path: Option<String>,
    ) -> Self {
        Self {
            guard: Arc::new(guard),
            registry: Arc::new(registry),
            graphql_path: graphql_path.map(Arc::from),
        }
    }

    pub fn provider(&self) -> &Arc<dyn AuthProvider> {
        self.guard.provider()
    }
}
