mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::json;
use tower::ServiceExt;

use auth_bridge::{
    AuthModule, AuthModuleOptions, BootstrapError, MetadataRegistry, RouteMeta, ServerBackend,
    middleware::body::MULTIPART_FILE_SIZE_LIMIT,
    services::auth::{ProviderOptions, TrustedOrigins},
};

use common::{FakeProvider, USER_TOKEN, get_as, json_body, post_json, routes};

const TRUSTED: &str = "https://app.example.com";

fn with_origins(origins: TrustedOrigins) -> Arc<FakeProvider> {
    Arc::new(FakeProvider::new(ProviderOptions {
        trusted_origins: Some(origins),
        ..ProviderOptions::default()
    }))
}

fn open_registry() -> MetadataRegistry {
    MetadataRegistry::new()
        .route("/echo", RouteMeta::public())
        .route("/upload", RouteMeta::public())
        .route("/upload/raw", RouteMeta::public())
}

fn preflight(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri(uri)
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn provider_routes_are_mounted_and_unguarded() {
    let app = AuthModule::builder(Arc::new(FakeProvider::new(ProviderOptions::default())))
        .build()
        .unwrap()
        .attach(routes());

    let res = app
        .clone()
        .oneshot(post_json("/api/auth/sign-in/email", json!({})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.oneshot(get_as("/me", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delegation_outcomes_map_to_responses() {
    let app = AuthModule::builder(Arc::new(FakeProvider::new(ProviderOptions::default())))
        .build()
        .unwrap()
        .attach(routes());

    let res = app.clone().oneshot(get_as("/api/auth/unknown", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.oneshot(get_as("/api/auth/explode", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn disabled_controllers_mount_nothing() {
    let options = AuthModuleOptions {
        disable_controllers: true,
        ..AuthModuleOptions::default()
    };
    let app = AuthModule::builder(with_origins(TrustedOrigins::Static(vec![TRUSTED.into()])))
        .options(options)
        .build()
        .unwrap()
        .attach(routes());

    let res = app
        .clone()
        .oneshot(post_json("/api/auth/sign-in/email", json!({})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // the guard is independent of the controllers
    let res = app.oneshot(get_as("/me", Some(USER_TOKEN))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn trusted_origins_become_a_credentialed_cors_policy() {
    let app = AuthModule::builder(with_origins(TrustedOrigins::Static(vec![TRUSTED.into()])))
        .build()
        .unwrap()
        .attach(routes());

    let res = app
        .clone()
        .oneshot(preflight("/api/auth/sign-in/email", TRUSTED))
        .await
        .unwrap();
    let headers = res.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], TRUSTED);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let res = app
        .oneshot(preflight("/api/auth/sign-in/email", "https://evil.example.com"))
        .await
        .unwrap();
    assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn preflight_request_headers_are_mirrored() {
    let app = AuthModule::builder(with_origins(TrustedOrigins::Static(vec![TRUSTED.into()])))
        .build()
        .unwrap()
        .attach(routes());

    let mut req = preflight("/api/auth/sign-up/email", TRUSTED);
    req.headers_mut().insert(
        header::ACCESS_CONTROL_REQUEST_HEADERS,
        "content-type,x-captcha-response".parse().unwrap(),
    );
    let res = app.oneshot(req).await.unwrap();

    let allowed = res.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("x-captcha-response"), "{allowed}");
    assert!(allowed.contains("content-type"), "{allowed}");
}

#[tokio::test]
async fn dynamic_trusted_origins_fail_the_boot() {
    let dynamic = || TrustedOrigins::Dynamic(Arc::new(|_headers: &HeaderMap| vec![TRUSTED.to_string()]));

    let err = AuthModule::builder(with_origins(dynamic()))
        .build()
        .unwrap_err();
    assert!(matches!(err, BootstrapError::DynamicTrustedOrigins));

    let options = AuthModuleOptions {
        disable_trusted_origins_cors: true,
        ..AuthModuleOptions::default()
    };
    assert!(
        AuthModule::builder(with_origins(dynamic()))
            .options(options)
            .build()
            .is_ok()
    );
}

#[tokio::test]
async fn invalid_origin_fails_the_boot() {
    let err = AuthModule::builder(with_origins(TrustedOrigins::Static(vec![
        "https://app.example.com\n".into(),
    ])))
    .build()
    .unwrap_err();

    assert!(matches!(err, BootstrapError::InvalidOrigin(_)));
}

#[tokio::test]
async fn bodies_are_parsed_outside_the_base_path_only() {
    let app = AuthModule::builder(Arc::new(FakeProvider::new(ProviderOptions::default())))
        .metadata(open_registry())
        .build()
        .unwrap()
        .attach(routes());

    let res = app
        .clone()
        .oneshot(post_json("/echo", json!({ "name": "ada" })))
        .await
        .unwrap();
    assert_eq!(json_body(res).await, json!({ "parsed": { "name": "ada" } }));

    let form = Request::builder()
        .method("POST")
        .uri("/echo")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("name=ada&lang=en"))
        .unwrap();
    let res = app.clone().oneshot(form).await.unwrap();
    assert_eq!(
        json_body(res).await,
        json!({ "parsed": { "name": "ada", "lang": "en" } })
    );

    // the provider gets the raw body
    let res = app
        .clone()
        .oneshot(post_json("/api/auth/echo-body", json!({ "x": 1 })))
        .await
        .unwrap();
    assert_eq!(
        json_body(res).await,
        json!({ "parsed": false, "body": "{\"x\":1}" })
    );

    let broken = Request::builder()
        .method("POST")
        .uri("/echo")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.oneshot(broken).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn body_parser_can_be_disabled() {
    let options = AuthModuleOptions {
        disable_body_parser: true,
        ..AuthModuleOptions::default()
    };
    let app = AuthModule::builder(Arc::new(FakeProvider::new(ProviderOptions::default())))
        .options(options)
        .metadata(open_registry())
        .build()
        .unwrap()
        .attach(routes());

    let res = app.oneshot(post_json("/echo", json!({ "a": 1 }))).await.unwrap();
    assert_eq!(json_body(res).await, json!({ "parsed": null }));
}

#[tokio::test]
async fn streaming_backend_caps_multipart_and_skips_cors() {
    let module = AuthModule::builder(with_origins(TrustedOrigins::Static(vec![TRUSTED.into()])))
        .metadata(open_registry())
        .adapter_name("my_server::StreamingAdapter")
        .build()
        .unwrap();
    assert_eq!(module.backend(), ServerBackend::Streaming);
    let app = module.attach(routes());

    let too_big = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=x")
        .header(header::CONTENT_LENGTH, "10000001")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(too_big).await.unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    // no up-front parsing on this backend
    let res = app
        .clone()
        .oneshot(post_json("/echo", json!({ "a": 1 })))
        .await
        .unwrap();
    assert_eq!(json_body(res).await, json!({ "parsed": null }));

    let res = app
        .oneshot(preflight("/api/auth/sign-in/email", TRUSTED))
        .await
        .unwrap();
    assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

fn multipart_upload(len: usize) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload/raw")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=x")
        .body(Body::from(vec![b'a'; len]))
        .unwrap()
}

#[tokio::test]
async fn streaming_backend_limits_undeclared_bodies_while_reading() {
    let options = AuthModuleOptions {
        backend: Some(ServerBackend::Streaming),
        ..AuthModuleOptions::default()
    };
    let app = AuthModule::builder(Arc::new(FakeProvider::new(ProviderOptions::default())))
        .options(options)
        .metadata(open_registry())
        .build()
        .unwrap()
        .attach(routes());

    let res = app.clone().oneshot(multipart_upload(1024)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!({ "len": 1024 }));

    let res = app
        .oneshot(multipart_upload(MULTIPART_FILE_SIZE_LIMIT + 1))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn registered_multipart_is_left_to_the_host() {
    let options = AuthModuleOptions {
        backend: Some(ServerBackend::Streaming),
        multipart_registered: true,
        ..AuthModuleOptions::default()
    };
    let app = AuthModule::builder(Arc::new(FakeProvider::new(ProviderOptions::default())))
        .options(options)
        .metadata(open_registry())
        .build()
        .unwrap()
        .attach(routes());

    let upload = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=x")
        .header(header::CONTENT_LENGTH, "10000001")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(upload).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(multipart_upload(MULTIPART_FILE_SIZE_LIMIT + 1))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn base_path_comes_from_module_then_provider_then_default() {
    let provider = || {
        Arc::new(FakeProvider::new(ProviderOptions {
            base_path: Some("auth/".into()),
            ..ProviderOptions::default()
        }))
    };

    let module = AuthModule::builder(provider()).build().unwrap();
    assert_eq!(module.base_path(), "/auth");
    let res = module
        .attach(routes())
        .oneshot(post_json("/auth/sign-in/email", json!({})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let options = AuthModuleOptions {
        base_path: Some("/custom/".into()),
        ..AuthModuleOptions::default()
    };
    let module = AuthModule::builder(provider()).options(options).build().unwrap();
    assert_eq!(module.base_path(), "/custom");

    let module = AuthModule::builder(Arc::new(FakeProvider::new(ProviderOptions::default())))
        .build()
        .unwrap();
    assert_eq!(module.base_path(), "/api/auth");
}

#[tokio::test]
async fn service_exposes_the_provider_session_lookup() {
    let module = AuthModule::builder(Arc::new(FakeProvider::new(ProviderOptions::default())))
        .build()
        .unwrap();
    let service = module.service();

    let req = get_as("/", Some(USER_TOKEN));
    let session = service.get_session(req.headers()).await.unwrap();
    assert_eq!(session.unwrap().user.id, "u1");

    let anonymous = service.get_session(&Default::default()).await.unwrap();
    assert!(anonymous.is_none());
}
