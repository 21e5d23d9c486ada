/*
 * Responsibility
 * - クレート共通のエラー定義
 *   - BootstrapError: 起動時 (module build) に検出する設定エラー。致命的
 *   - ErrorBody: wire に出す `{code, message}` の JSON 形
 * - 認可エラー (401/403) は guard::error 側で transport ごとに組み立てる
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::auth::ProviderError;

/// JSON body used for every error this crate writes to an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Startup-time configuration errors. Any of these aborts the boot.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(
        "hook providers were registered but the auth provider has no hook configuration; \
         configure hooks (even an empty set) on the provider"
    )]
    HooksNotConfigured,

    #[error(
        "dynamic trusted origins cannot drive CORS registration; \
         use a static origin list or disable trusted-origins CORS"
    )]
    DynamicTrustedOrigins,

    #[error("invalid trusted origin: {0}")]
    InvalidOrigin(String),

    #[error("invalid hook path {path:?} on {provider}: hook paths must begin with '/'")]
    InvalidHookPath { provider: String, path: String },

    #[error("auth provider rejected hook installation: {0}")]
    Provider(#[from] ProviderError),
}
