/*
 * Responsibility
 * - Handler から見える session の型
 * - middleware が解決して request extensions に格納し、handler はこの型だけを受け取る
 */
use crate::session::UserSession;

/// The caller's session, `None` for anonymous callers (or when no guard ran).
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<UserSession>);

/// The caller's session; rejects with 401 when there is none.
#[derive(Debug, Clone)]
pub struct AuthSession(pub UserSession);
