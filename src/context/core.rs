use axum::{
    body::Body,
    http::{Request, header},
};
use thiserror::Error;

use super::types::{AuthRequest, ExecutionContext, GraphQlContext, Transport, TransportPolicy, WsClient};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported execution context: {}", .0.as_str())]
pub struct UnsupportedContext(pub Transport);

impl ExecutionContext {
    pub fn transport(&self) -> Transport {
        match self {
            ExecutionContext::Http(_) => Transport::Http,
            ExecutionContext::GraphQl(_) => Transport::GraphQl,
            ExecutionContext::WebSocket(_) => Transport::WebSocket,
            ExecutionContext::Rpc(_) => Transport::Rpc,
        }
    }

    /// Classify an incoming axum request.
    ///
    /// WebSocket upgrades first, then the GraphQL endpoint, then plain http.
    pub fn classify(req: Request<Body>, graphql_path: Option<&str>) -> Self {
        if is_websocket_upgrade(&req) {
            return ExecutionContext::WebSocket(WsClient { handshake: req });
        }

        if graphql_path.is_some_and(|p| req.uri().path() == p) {
            return ExecutionContext::GraphQl(GraphQlContext { req });
        }

        ExecutionContext::Http(req)
    }

    /// Give the underlying HTTP request back (rpc has none).
    pub fn into_request(self) -> Option<Request<Body>> {
        match self {
            ExecutionContext::Http(req) => Some(req),
            ExecutionContext::GraphQl(ctx) => Some(ctx.req),
            ExecutionContext::WebSocket(client) => Some(client.handshake),
            ExecutionContext::Rpc(_) => None,
        }
    }
}

/// Project an execution context onto its request object.
pub fn request_from_context<'a>(
    ctx: &'a mut ExecutionContext,
    policy: &TransportPolicy,
) -> Result<&'a mut dyn AuthRequest, UnsupportedContext> {
    let transport = ctx.transport();
    if !policy.allows(transport) {
        return Err(UnsupportedContext(transport));
    }

    Ok(match ctx {
        ExecutionContext::Http(req) => req as &mut dyn AuthRequest,
        ExecutionContext::GraphQl(gql) => &mut gql.req as &mut dyn AuthRequest,
        ExecutionContext::WebSocket(client) => client as &mut dyn AuthRequest,
        ExecutionContext::Rpc(rpc) => rpc as &mut dyn AuthRequest,
    })
}

fn is_websocket_upgrade(req: &Request<Body>) -> bool {
    let upgrade = req
        .headers()
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"));

    let connection = req
        .headers()
        .get(header::CONNECTION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            v.split(',')
                .any(|token| token.trim().eq_ignore_ascii_case("upgrade"))
        });

    upgrade && connection
}
