/*
 * Responsibility
 * - 認可失敗 (UNAUTHORIZED / FORBIDDEN) を transport ごとの例外型に変換する
 * - IntoResponse: http/graphql は {code, message} JSON、ws/rpc はそれぞれの形
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::context::{Transport, UnsupportedContext};
use crate::error::ErrorBody;
use crate::services::auth::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    Unauthorized,
    Forbidden,
}

impl AuthErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            AuthErrorKind::Unauthorized => "UNAUTHORIZED",
            AuthErrorKind::Forbidden => "FORBIDDEN",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthErrorKind::Unauthorized => "Unauthorized",
            AuthErrorKind::Forbidden => "Insufficient permissions",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthErrorKind::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

/// HTTP-style exception: status plus `{code, message}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpException {
    pub status: StatusCode,
    pub body: ErrorBody,
}

/// WebSocket exception carrying the bare error string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsException {
    pub kind: AuthErrorKind,
    pub message: String,
}

/// Generic RPC error carrying the bare error string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcException {
    pub kind: AuthErrorKind,
    pub message: String,
}

/// A denial, shaped for the transport it is raised on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    Http(HttpException),
    Ws(WsException),
    Rpc(RpcException),
}

impl Denial {
    pub fn for_transport(transport: Transport, kind: AuthErrorKind) -> Self {
        match transport {
            Transport::Http | Transport::GraphQl => Denial::Http(HttpException {
                status: kind.status(),
                body: ErrorBody::new(kind.code(), kind.message()),
            }),
            Transport::WebSocket => Denial::Ws(WsException {
                kind,
                message: kind.code().to_string(),
            }),
            Transport::Rpc => Denial::Rpc(RpcException {
                kind,
                message: kind.code().to_string(),
            }),
        }
    }

    pub fn kind(&self) -> AuthErrorKind {
        match self {
            Denial::Http(e) if e.status == StatusCode::FORBIDDEN => AuthErrorKind::Forbidden,
            Denial::Http(_) => AuthErrorKind::Unauthorized,
            Denial::Ws(e) => e.kind,
            Denial::Rpc(e) => e.kind,
        }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        match self {
            Denial::Http(e) => e.body.into_response_with(e.status),
            Denial::Ws(e) => (
                e.kind.status(),
                Json(json!({ "status": "error", "message": e.message })),
            )
                .into_response(),
            Denial::Rpc(e) => (e.kind.status(), e.message).into_response(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("{}", .0.kind().code())]
    Denied(Denial),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedContext),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        match self {
            GuardError::Denied(denial) => denial.into_response(),
            GuardError::Unsupported(err) => {
                tracing::warn!(error = %err, "guard invoked on unsupported context");
                ErrorBody::new("INTERNAL_SERVER_ERROR", "internal server error")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
            GuardError::Provider(err) => err.into_response(),
        }
    }
}
