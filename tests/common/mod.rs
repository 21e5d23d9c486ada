#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

use auth_bridge::{
    AuthSession, CurrentUser, OptionalSession,
    hooks::{ComposedHooks, HookContext},
    middleware::ParsedBody,
    module::{DEFAULT_BASE_PATH, normalize_base_path},
    services::auth::{
        AuthProvider, Delegation, ProviderError, ProviderOptions, ProviderResult,
    },
    session::{SessionUser, UserSession},
};

pub type Log = Arc<Mutex<Vec<String>>>;

pub const USER_TOKEN: &str = "user-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const MULTI_TOKEN: &str = "multi-token";
/// The fake provider fails when asked about this token.
pub const BROKEN_TOKEN: &str = "broken-token";

/// In-memory auth provider: bearer token -> session, plus a couple of
/// endpoints under its base path.
pub struct FakeProvider {
    options: ProviderOptions,
    base_path: String,
    sessions: HashMap<String, UserSession>,
    hooks: OnceLock<ComposedHooks>,
    pub log: Log,
    pub lookups: AtomicUsize,
}

impl FakeProvider {
    pub fn new(options: ProviderOptions) -> Self {
        let base_path =
            normalize_base_path(options.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH));

        let mut sessions = HashMap::new();
        sessions.insert(
            USER_TOKEN.to_string(),
            UserSession::new(SessionUser::new("u1").with_role("user")),
        );
        sessions.insert(
            ADMIN_TOKEN.to_string(),
            UserSession::new(SessionUser::new("a1").with_role("admin")),
        );
        sessions.insert(
            MULTI_TOKEN.to_string(),
            UserSession::new(SessionUser::new("m1").with_roles(["editor", "admin"])),
        );

        Self {
            options,
            base_path,
            sessions,
            hooks: OnceLock::new(),
            log: Log::default(),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_log(mut self, log: Log) -> Self {
        self.log = log;
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthProvider for FakeProvider {
    fn options(&self) -> &ProviderOptions {
        &self.options
    }

    async fn get_session(&self, headers: &HeaderMap) -> ProviderResult<Option<UserSession>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        match token {
            Some(BROKEN_TOKEN) => Err(ProviderError::Unavailable("session store down".into())),
            Some(token) => Ok(self.sessions.get(token).cloned()),
            None => Ok(None),
        }
    }

    async fn handle(&self, req: Request<Body>) -> Delegation {
        let Some(path) = req.uri().path().strip_prefix(self.base_path.as_str()) else {
            return Delegation::NotHandled;
        };
        let path = path.to_string();

        match path.as_str() {
            "/sign-up/email" | "/sign-in/email" => {}
            "/echo-body" => {
                let parsed = req.extensions().get::<ParsedBody>().is_some();
                let bytes = to_bytes(req.into_body(), usize::MAX).await.unwrap();
                let body = String::from_utf8(bytes.to_vec()).unwrap();
                return Delegation::Handled(Json(json!({ "parsed": parsed, "body": body })).into_response());
            }
            "/explode" => {
                return Delegation::Errored(ProviderError::InvalidResponse("boom".into()));
            }
            _ => return Delegation::NotHandled,
        }

        let ctx = HookContext::new(path.clone(), req.method().clone(), req.headers().clone());
        let hooks = self.hooks.get().cloned().unwrap_or_default();

        if let Err(err) = hooks.run_before(&ctx).await {
            return Delegation::Handled(err.into_response());
        }

        self.log.lock().unwrap().push(format!("endpoint {path}"));
        let res: Response = (StatusCode::OK, Json(json!({ "ok": true }))).into_response();

        if let Err(err) = hooks.run_after(&ctx.with_status(res.status())).await {
            return Delegation::Handled(err.into_response());
        }

        Delegation::Handled(res)
    }

    fn install_hooks(&self, hooks: ComposedHooks) -> ProviderResult<()> {
        self.hooks
            .set(hooks)
            .map_err(|_| ProviderError::HooksAlreadyInstalled)
    }
}

/// Application routes used across the integration tests.
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(whoami))
        .route("/me", get(me))
        .route("/me/optional", get(whoami))
        .route("/me/user", get(current_user))
        .route("/admin", get(me))
        .route("/graphql", post(me))
        .route("/public/docs", get(whoami))
        .route("/public/private", get(me))
        .route("/upload", post(echo_parsed))
        .route("/upload/raw", post(read_raw))
        .route("/echo", post(echo_parsed))
}

async fn me(AuthSession(session): AuthSession) -> Json<Value> {
    Json(json!({ "id": session.user.id }))
}

async fn whoami(OptionalSession(session): OptionalSession) -> Json<Value> {
    Json(json!({ "id": session.map(|s| s.user.id) }))
}

async fn current_user(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({ "id": user.map(|u| u.id) }))
}

async fn echo_parsed(req: Request<Body>) -> Json<Value> {
    let parsed = req.extensions().get::<ParsedBody>().map(|p| p.0.clone());
    Json(json!({ "parsed": parsed }))
}

// reads the body itself, so any limit on it shows up here
async fn read_raw(req: Request<Body>) -> Result<Json<Value>, StatusCode> {
    let bytes = to_bytes(req.into_body(), usize::MAX)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;
    Ok(Json(json!({ "len": bytes.len() })))
}

pub fn get_as(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(res: Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
