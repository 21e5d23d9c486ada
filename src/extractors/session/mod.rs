/*!
 * Session extractors
 *
 * Responsibility:
 * - 解決済み session / user を handler に提供する
 * - axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - OptionalSession
 * - AuthSession
 * - CurrentUser (re-export)
 */

mod core;
mod types;

pub use crate::session::CurrentUser;
pub use types::{AuthSession, OptionalSession};
