/*!
 * Execution context normalization
 *
 * Responsibility:
 * - transport (http / graphql / ws / rpc) ごとの差を吸収し、header を持つ request を返す
 * - 副作用なし (純粋な射影)
 */

mod core;
mod types;

pub use self::core::{UnsupportedContext, request_from_context};
pub use types::{
    AuthRequest, ExecutionContext, GraphQlContext, RpcContext, Transport, TransportPolicy,
    WsClient,
};
