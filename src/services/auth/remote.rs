/*
 * Responsibility
 * - 外部の auth server (HTTP) を AuthProvider として扱う
 *   - session 取得: `GET {upstream}{basePath}/get-session` に cookie / authorization を転送
 *   - `{basePath}/{*path}` のリクエストはそのまま upstream に転送し、応答をそのまま返す
 *   - 転送の前後で composed hooks を実行
 */
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{HeaderMap, HeaderName, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use url::Url;

use super::provider::{AuthProvider, Delegation, ProviderError, ProviderOptions, ProviderResult};
use crate::hooks::{ComposedHooks, HookContext};
use crate::module::{DEFAULT_BASE_PATH, normalize_base_path};
use crate::session::UserSession;

/// Largest request body forwarded to the upstream auth server.
pub const FORWARD_BODY_LIMIT: usize = 2 * 1024 * 1024;

const SESSION_HEADERS: [HeaderName; 2] = [header::COOKIE, header::AUTHORIZATION];

// Never copied between the two connections.
const HOP_BY_HOP: [HeaderName; 5] = [
    header::HOST,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::CONTENT_LENGTH,
    header::UPGRADE,
];

pub struct RemoteAuthProvider {
    client: reqwest::Client,
    upstream: Url,
    base_path: String,
    options: ProviderOptions,
    hooks: OnceLock<ComposedHooks>,
}

impl RemoteAuthProvider {
    pub fn new(upstream: Url, options: ProviderOptions) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        Ok(Self::with_client(client, upstream, options))
    }

    pub fn with_client(client: reqwest::Client, upstream: Url, options: ProviderOptions) -> Self {
        let base_path =
            normalize_base_path(options.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH));

        Self {
            client,
            upstream,
            base_path,
            options,
            hooks: OnceLock::new(),
        }
    }

    fn url(&self, path_and_query: &str) -> String {
        format!(
            "{}{}",
            self.upstream.as_str().trim_end_matches('/'),
            path_and_query
        )
    }

    /// Path below the base path, or `None` when `path` is outside it.
    fn relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.base_path.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    async fn forward(&self, req: Request<Body>) -> Result<Response, Delegation> {
        let (parts, body) = req.into_parts();

        let bytes = match to_bytes(body, FORWARD_BODY_LIMIT).await {
            Ok(b) => b,
            Err(_) => return Err(Delegation::Handled(StatusCode::PAYLOAD_TOO_LARGE.into_response())),
        };

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let mut headers = parts.headers;
        for name in &HOP_BY_HOP {
            headers.remove(name);
        }

        let upstream = self
            .client
            .request(parts.method, self.url(path_and_query))
            .headers(headers)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Delegation::Errored(ProviderError::Unavailable(e.to_string())))?;

        let status = upstream.status();
        let mut response_headers = upstream.headers().clone();
        for name in &HOP_BY_HOP {
            response_headers.remove(name);
        }

        let body = upstream
            .bytes()
            .await
            .map_err(|e| Delegation::Errored(ProviderError::InvalidResponse(e.to_string())))?;

        let mut res = Response::new(Body::from(body));
        *res.status_mut() = status;
        *res.headers_mut() = response_headers;
        Ok(res)
    }
}

#[async_trait]
impl AuthProvider for RemoteAuthProvider {
    fn options(&self) -> &ProviderOptions {
        &self.options
    }

    async fn get_session(&self, headers: &HeaderMap) -> ProviderResult<Option<UserSession>> {
        let mut forwarded = HeaderMap::new();
        for name in &SESSION_HEADERS {
            for value in headers.get_all(name) {
                forwarded.append(name.clone(), value.clone());
            }
        }

        // Nothing to identify the caller with.
        if forwarded.is_empty() {
            return Ok(None);
        }

        let url = self.url(&format!("{}/get-session", self.base_path));
        let resp = self
            .client
            .get(url)
            .headers(forwarded)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "GET {}/get-session {}",
                self.base_path, status
            )));
        }

        resp.json::<Option<UserSession>>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    async fn handle(&self, req: Request<Body>) -> Delegation {
        let Some(path) = self.relative(req.uri().path()).map(str::to_string) else {
            return Delegation::NotHandled;
        };

        let ctx = HookContext::new(path, req.method().clone(), req.headers().clone());
        let hooks = self.hooks.get();

        if let Some(hooks) = hooks {
            if let Err(err) = hooks.run_before(&ctx).await {
                return Delegation::Handled(err.into_response());
            }
        }

        let res = match self.forward(req).await {
            Ok(res) => res,
            Err(delegation) => return delegation,
        };

        if let Some(hooks) = hooks {
            let ctx = ctx.with_status(res.status());
            if let Err(err) = hooks.run_after(&ctx).await {
                return Delegation::Handled(err.into_response());
            }
        }

        tracing::debug!(status = %res.status(), "auth request forwarded");
        Delegation::Handled(res)
    }

    fn install_hooks(&self, hooks: ComposedHooks) -> ProviderResult<()> {
        self.hooks
            .set(hooks)
            .map_err(|_| ProviderError::HooksAlreadyInstalled)
    }
}
