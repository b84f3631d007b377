//! End-to-end behavior of the preload pipeline through the full router.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderValue, Method, Request, StatusCode};

use http_preloader::preload::inject::{extract_bundle, MARKER_OPEN};
use http_preloader::{PreloadRequest, RegistryBuilder, ResponseWriter};

use common::{build_root, config_for, get, router_with, send, APP_JS};

fn item_handler(w: &mut dyn ResponseWriter, r: &PreloadRequest) {
    w.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let id = r.query_param("id").unwrap_or_default();
    w.write_str(&format!(r#"{{"id":"{id}"}}"#));
}

#[tokio::test]
async fn test_terminal_capture_keyed_by_full_target() {
    let root = build_root("terminal");
    let mut routes = RegistryBuilder::new();
    routes.get("/item", item_handler);
    let router = router_with(config_for(&root), routes.build(), &root);

    let (response, html) = send(router, get("/item?id=goat")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    assert!(html.contains(MARKER_OPEN));

    let bundle = extract_bundle(&html).unwrap().unwrap();
    let entry = bundle.get("/item?id=goat").unwrap();
    assert_eq!(entry.body(), br#"{"id":"goat"}"#);
    assert_eq!(entry.status(), StatusCode::OK);
    assert!(!bundle.contains_key("/item"));
}

#[tokio::test]
async fn test_unregistered_path_still_serves_shell() {
    let root = build_root("missing");
    let router = router_with(config_for(&root), RegistryBuilder::new().build(), &root);

    let (response, html) = send(router, get("/missing")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(html.contains(r#"<div id="root"></div>"#));
    assert!(html.contains("<script>window.httpPreload={}</script></body>"));
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
}

#[tokio::test]
async fn test_ancestor_and_terminal_both_preloaded() {
    let root = build_root("ancestor");
    let mut routes = RegistryBuilder::new();
    routes.get("/", |w, _| {
        w.write_str(r#"{"user":"ada"}"#);
    });
    routes.get("/item", item_handler);
    let router = router_with(config_for(&root), routes.build(), &root);

    let (_, html) = send(router, get("/item")).await;
    let bundle = extract_bundle(&html).unwrap().unwrap();
    assert_eq!(bundle.len(), 2);
    assert_eq!(bundle.get("/").unwrap().body(), br#"{"user":"ada"}"#);
    assert!(bundle.contains_key("/item"));
}

#[tokio::test]
async fn test_ancestors_do_not_see_query() {
    let root = build_root("ancestor-query");
    let mut routes = RegistryBuilder::new();
    routes.get("/users", |w, r| {
        w.write_str(r.query().unwrap_or("none"));
    });
    routes.get("/users/42", |w, r| {
        w.write_str(r.query().unwrap_or("none"));
    });
    let router = router_with(config_for(&root), routes.build(), &root);

    let (_, html) = send(router, get("/users/42?tab=posts")).await;
    let bundle = extract_bundle(&html).unwrap().unwrap();
    assert_eq!(bundle.get("/users").unwrap().body(), b"none");
    assert_eq!(bundle.get("/users/42?tab=posts").unwrap().body(), b"tab=posts");
}

#[tokio::test]
async fn test_api_request_returns_raw_handler_body() {
    let root = build_root("api");
    let mut routes = RegistryBuilder::new();
    routes.get("/item", item_handler);
    let router = router_with(config_for(&root), routes.build(), &root);

    let (response, body) = send(router, get("/api/item?id=goat")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body, r#"{"id":"goat"}"#);
    assert!(!body.contains("<html>"));
    assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
}

#[tokio::test]
async fn test_api_prefix_root_maps_to_slash() {
    let root = build_root("api-root");
    let mut routes = RegistryBuilder::new();
    routes.get("/", |w, _| {
        w.write_str("root");
    });
    let router = router_with(config_for(&root), routes.build(), &root);

    let (_, body) = send(router, get("/api")).await;
    assert_eq!(body, "root");
}

#[tokio::test]
async fn test_api_missing_route_is_404() {
    let root = build_root("api-missing");
    let router = router_with(config_for(&root), RegistryBuilder::new().build(), &root);

    let (response, _) = send(router, get("/api/nothing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_captured_status_passes_through() {
    let root = build_root("api-status");
    let mut routes = RegistryBuilder::new();
    routes.post("/things", |w, r| {
        w.write_header(StatusCode::CREATED);
        w.write(r.body());
    });
    let router = router_with(config_for(&root), routes.build(), &root);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/things")
        .body(Body::from("payload"))
        .unwrap();
    let (response, body) = send(router, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body, "payload");
}

#[tokio::test]
async fn test_api_handler_timeout_is_504() {
    let root = build_root("api-timeout");
    let mut config = config_for(&root);
    config.preload.handler_timeout_ms = 50;
    let mut routes = RegistryBuilder::new();
    routes.get("/slow", |w, _| {
        std::thread::sleep(Duration::from_millis(500));
        w.write_str("late");
    });
    let router = router_with(config, routes.build(), &root);

    let (response, _) = send(router, get("/api/slow")).await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_api_handler_panic_is_500() {
    let root = build_root("api-panic");
    let mut routes = RegistryBuilder::new();
    routes.get("/boom", |_, _| panic!("handler exploded"));
    let router = router_with(config_for(&root), routes.build(), &root);

    let (response, _) = send(router, get("/api/boom")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_failed_ancestor_is_omitted_not_fatal() {
    let root = build_root("ancestor-panic");
    let mut routes = RegistryBuilder::new();
    routes.get("/", |_, _| panic!("session store down"));
    routes.get("/item", item_handler);
    let router = router_with(config_for(&root), routes.build(), &root);

    let (response, html) = send(router, get("/item?id=1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bundle = extract_bundle(&html).unwrap().unwrap();
    assert!(!bundle.contains_key("/"));
    assert!(bundle.contains_key("/item?id=1"));
}

#[tokio::test]
async fn test_terminal_404_headers_not_promoted() {
    let root = build_root("not-found");
    let mut routes = RegistryBuilder::new();
    routes.get("/gone", |w, _| {
        w.headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        w.write_header(StatusCode::NOT_FOUND);
        w.write_str("gone");
    });
    let router = router_with(config_for(&root), routes.build(), &root);

    let (response, html) = send(router, get("/gone")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(CACHE_CONTROL).is_none());

    let bundle = extract_bundle(&html).unwrap().unwrap();
    assert_eq!(bundle.get("/gone").unwrap().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_terminal_headers_promoted_and_status_stays_200() {
    let root = build_root("promote");
    let mut routes = RegistryBuilder::new();
    routes.get("/account", |w, _| {
        w.headers_mut()
            .append(SET_COOKIE, HeaderValue::from_static("sid=1"));
        w.headers_mut()
            .append(SET_COOKIE, HeaderValue::from_static("theme=dark"));
        w.write_header(StatusCode::ACCEPTED);
        w.write_str("{}");
    });
    let router = router_with(config_for(&root), routes.build(), &root);

    let (response, _) = send(router, get("/account")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
    assert_eq!(cookies, vec!["sid=1", "theme=dark"]);
}

#[tokio::test]
async fn test_staggered_mode_serves_bare_shell() {
    let root = build_root("staggered");
    let mut config = config_for(&root);
    config.preload.staggered_mode = true;
    let mut routes = RegistryBuilder::new();
    routes.get("/item", item_handler);
    let router = router_with(config, routes.build(), &root);

    let (response, html) = send(router.clone(), get("/item?id=goat")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(html, common::SHELL_HTML);

    let (_, body) = send(router, get("/api/item?id=goat")).await;
    assert_eq!(body, r#"{"id":"goat"}"#);
}

#[tokio::test]
async fn test_assets_served_from_build_root() {
    let root = build_root("assets");
    let router = router_with(config_for(&root), RegistryBuilder::new().build(), &root);

    let (response, body) = send(router.clone(), get("/static/app.js")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body, APP_JS);

    let (response, _) = send(router, get("/static/missing.css")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_generated_and_propagated() {
    let root = build_root("request-id");
    let router = router_with(config_for(&root), RegistryBuilder::new().build(), &root);

    let (response, _) = send(router.clone(), get("/")).await;
    assert!(response.headers().get("x-request-id").is_some());

    let request = Request::builder()
        .uri("/")
        .header("x-request-id", "fixed-id")
        .body(Body::empty())
        .unwrap();
    let (response, _) = send(router, request).await;
    assert_eq!(response.headers().get("x-request-id").unwrap(), "fixed-id");
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let root = build_root("too-large");
    let mut config = config_for(&root);
    config.preload.max_body_bytes = 8;
    let mut routes = RegistryBuilder::new();
    routes.post("/upload", |w, _| {
        w.write_str("ok");
    });
    let router = router_with(config, routes.build(), &root);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .body(Body::from("this body is far too long"))
        .unwrap();
    let (response, _) = send(router, request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
