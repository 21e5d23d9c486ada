/*!
 * Access decision gate
 *
 * Responsibility:
 * - route metadata (public / optional / roles) と解決済み session から allow / deny を決める
 * - deny は transport に合わせた例外型で返す
 */

mod core;
mod error;
mod metadata;

pub use self::core::{AuthGuard, Decision, GuardOptions, OptionalRoles, decide};
pub use error::{AuthErrorKind, Denial, GuardError, HttpException, RpcException, WsException};
pub use metadata::{MetadataRegistry, RouteMeta};

pub(crate) use metadata::is_under;
