use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::context::Transport;
use crate::guard::{AuthErrorKind, Denial};
use crate::session::{CurrentUser, ResolvedSession};

use super::types::{AuthSession, OptionalSession};

fn resolved(parts: &Parts) -> Option<&ResolvedSession> {
    parts.extensions.get::<ResolvedSession>()
}

/// Handler で session を受け取るための extractor (無ければ None)
/// guard / append-session middleware が ResolvedSession を extensions に insert 済みである前提
impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(resolved(parts).and_then(|s| s.0.clone())))
    }
}

/// session 必須の extractor
/// 見つからない場合は 401 を返す（認証がかかってない・ミドルウェア未設定）
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = Denial;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        resolved(parts)
            .and_then(|s| s.0.clone())
            .map(AuthSession)
            .ok_or_else(|| Denial::for_transport(Transport::Http, AuthErrorKind::Unauthorized))
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_default())
    }
}
