use std::{fmt, sync::Arc};

use axum::http::HeaderMap;

use super::{AuthProvider, ProviderResult};
use crate::session::UserSession;

/// Handle on the auth provider for handlers and services.
///
/// Cheap to clone. Obtain it from [`AuthModule::service`](crate::module::AuthModule::service)
/// and put it in the application state.
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn get_session(&self, headers: &HeaderMap) -> ProviderResult<Option<UserSession>> {
        self.provider.get_session(headers).await
    }

    /// The provider itself, for provider-specific functionality.
    pub fn instance(&self) -> &Arc<dyn AuthProvider> {
        &self.provider
    }
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}
