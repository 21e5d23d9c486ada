/*
 * Responsibility
 * - Config読み込み → provider / module 生成 → Router 組み立て
 * - Middleware の適用 (guard / CORS / body / request-id / trace)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Json, Router, extract::State, http::HeaderMap, routing::get};
use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_bridge::{
    AuthModule, AuthService, AuthSession, MetadataRegistry, OptionalSession, RouteMeta,
    config::Config,
    hooks::{HookConfig, HookContext, HookError, HookMethod, HookProvider},
    middleware,
    services::auth::{ProviderOptions, RemoteAuthProvider, TrustedOrigins},
};

#[derive(Clone)]
struct AppState {
    auth: AuthService,
}

fn init_tracing() {
    // RUST_LOG=info,auth_bridge=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: fail fast
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting auth bridge in {:?} mode on {} (upstream {})",
        config.app_env,
        config.addr,
        config.auth_upstream_url
    );

    let provider_options = ProviderOptions {
        base_path: config.module.base_path.clone(),
        trusted_origins: (!config.auth_trusted_origins.is_empty())
            .then(|| TrustedOrigins::Static(config.auth_trusted_origins.clone())),
        hooks: Some(HookConfig::default()),
    };
    let provider = Arc::new(RemoteAuthProvider::new(
        config.auth_upstream_url.clone(),
        provider_options,
    )?);

    let module = AuthModule::builder(provider)
        .options(config.module.clone())
        .metadata(route_metadata())
        .hook_provider(Arc::new(AuditHooks))
        .build()?;

    let state = AppState {
        auth: module.service(),
    };

    let app = module.attach(routes()).with_state(state);
    let app = middleware::http::apply(app, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/me", get(me))
        .route("/me/optional", get(me_optional))
        .route("/me/session", get(session_lookup))
        .route("/admin", get(admin))
}

fn route_metadata() -> MetadataRegistry {
    MetadataRegistry::new()
        .route("/health", RouteMeta::public())
        .route("/me/optional", RouteMeta::optional())
        .route("/admin", RouteMeta::roles(["admin"]))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn me(AuthSession(session): AuthSession) -> Json<Value> {
    Json(json!({ "user": session.user }))
}

async fn me_optional(OptionalSession(session): OptionalSession) -> Json<Value> {
    Json(json!({ "user": session.map(|s| s.user) }))
}

// Asks the provider directly instead of reading the guard's result.
async fn session_lookup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, auth_bridge::services::auth::ProviderError> {
    let session = state.auth.get_session(&headers).await?;
    Ok(Json(json!({ "session": session })))
}

async fn admin(AuthSession(session): AuthSession) -> Json<Value> {
    Json(json!({ "admin": session.user.id }))
}

struct AuditHooks;

impl HookProvider for AuditHooks {
    fn hooks(self: Arc<Self>) -> Vec<HookMethod> {
        vec![
            HookMethod::before("sign_up_attempt", Some("/sign-up/email"), |ctx: HookContext| async move {
                tracing::info!(method = %ctx.method, "sign-up attempt");
                Ok::<_, HookError>(())
            }),
            HookMethod::after("sign_in_result", Some("/sign-in/email"), |ctx: HookContext| async move {
                tracing::info!(status = ?ctx.status, "sign-in finished");
                Ok::<_, HookError>(())
            }),
        ]
    }
}
