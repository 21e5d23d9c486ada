/*!
 * Session
 *
 * Responsibility:
 * - provider が返す session の型
 * - 正規化した request から header を集めて session を解決し、extensions に載せる
 */

mod resolver;
mod types;

pub use resolver::{CurrentUser, ResolvedSession, resolve_session};
pub use types::{Role, SessionUser, UserSession};
