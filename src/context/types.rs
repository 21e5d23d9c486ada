/*
 * Responsibility
 * - transport ごとの実行コンテキスト (Http / GraphQl / WebSocket / Rpc)
 * - guard と session resolver が見る「正規化された request」の契約 (AuthRequest)
 */
use axum::{
    body::Body,
    http::{Extensions, HeaderMap, Request},
};

/// How a request arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Http,
    GraphQl,
    WebSocket,
    Rpc,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Http => "http",
            Transport::GraphQl => "graphql",
            Transport::WebSocket => "ws",
            Transport::Rpc => "rpc",
        }
    }
}

/// Which transports the guard accepts besides http and graphql.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportPolicy {
    pub websocket: bool,
    pub rpc: bool,
}

impl Default for TransportPolicy {
    fn default() -> Self {
        Self {
            websocket: true,
            rpc: false,
        }
    }
}

impl TransportPolicy {
    pub fn allows(&self, transport: Transport) -> bool {
        match transport {
            Transport::Http | Transport::GraphQl => true,
            Transport::WebSocket => self.websocket,
            Transport::Rpc => self.rpc,
        }
    }
}

/// Resolver context of a GraphQL operation; the HTTP request sits one layer down.
#[derive(Debug)]
pub struct GraphQlContext {
    pub req: Request<Body>,
}

/// A WebSocket client. Its headers are the ones sent with the handshake.
#[derive(Debug)]
pub struct WsClient {
    pub handshake: Request<Body>,
}

/// An RPC call. `metadata` plays the role of headers.
#[derive(Debug, Default)]
pub struct RpcContext {
    pub metadata: HeaderMap,
    pub extensions: Extensions,
}

/// The execution context the guard is invoked with.
#[derive(Debug)]
pub enum ExecutionContext {
    Http(Request<Body>),
    GraphQl(GraphQlContext),
    WebSocket(WsClient),
    Rpc(RpcContext),
}

/// The normalized request object.
///
/// Top-level `headers` win; `handshake_headers` is the fallback for
/// transports that keep them on the handshake.
pub trait AuthRequest: Send {
    fn headers(&self) -> Option<&HeaderMap>;

    fn handshake_headers(&self) -> Option<&HeaderMap> {
        None
    }

    fn extensions(&self) -> &Extensions;

    fn extensions_mut(&mut self) -> &mut Extensions;
}

impl AuthRequest for Request<Body> {
    fn headers(&self) -> Option<&HeaderMap> {
        Some(Request::headers(self))
    }

    fn extensions(&self) -> &Extensions {
        Request::extensions(self)
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        Request::extensions_mut(self)
    }
}

impl AuthRequest for WsClient {
    fn headers(&self) -> Option<&HeaderMap> {
        None
    }

    fn handshake_headers(&self) -> Option<&HeaderMap> {
        Some(self.handshake.headers())
    }

    fn extensions(&self) -> &Extensions {
        self.handshake.extensions()
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        self.handshake.extensions_mut()
    }
}

impl AuthRequest for RpcContext {
    fn headers(&self) -> Option<&HeaderMap> {
        Some(&self.metadata)
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}
