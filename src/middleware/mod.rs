/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (guard / append-session), cors, body, http
 */
pub mod auth;
pub mod body;
pub mod cors;
pub mod http;

pub use body::ParsedBody;
