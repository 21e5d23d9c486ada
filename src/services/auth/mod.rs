pub mod provider;
pub mod remote;
pub mod service;

pub use provider::{
    AuthProvider, Delegation, ProviderError, ProviderOptions, ProviderResult, TrustedOrigins,
};
pub use remote::RemoteAuthProvider;
pub use service::AuthService;
