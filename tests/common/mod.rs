//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

use http_preloader::http::proxy::build_client;
use http_preloader::shell::{DocumentShell, ShellSource};
use http_preloader::{HttpServer, PreloaderConfig, RouteTable};

pub const SHELL_HTML: &str =
    "<!doctype html><html><head><title>app</title></head><body><div id=\"root\"></div></body></html>";

pub const APP_JS: &str = "console.log('app');";

/// Create a throwaway build root holding `index.html` and `static/app.js`.
pub fn build_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("http-preloader-it-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(root.join("static")).unwrap();
    std::fs::write(root.join("index.html"), SHELL_HTML).unwrap();
    std::fs::write(root.join("static").join("app.js"), APP_JS).unwrap();
    root
}

/// Default config with the given build root.
pub fn config_for(root: &PathBuf) -> PreloaderConfig {
    let mut config = PreloaderConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.preload.build_root = Some(root.display().to_string());
    config
}

/// In-process router backed by a build root.
pub fn router_with(config: PreloaderConfig, routes: RouteTable, root: &PathBuf) -> Router {
    let source = ShellSource::BuildRoot(root.clone());
    HttpServer::with_shell(config, routes, DocumentShell::from_html(SHELL_HTML), &source, build_client())
        .unwrap()
        .router()
}

/// Send one request through the router and buffer the body as text.
pub async fn send(router: Router, request: Request<Body>) -> (Response<()>, String) {
    let response = router.oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    (
        Response::from_parts(parts, ()),
        String::from_utf8(bytes.to_vec()).unwrap(),
    )
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Start a mock dev server that serves `index.html` and `/static/app.js`.
///
/// Returns the bound address. Any other path gets a 404.
pub async fn start_mock_dev_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 4096];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let request = String::from_utf8_lossy(&buf[..n]);
                        let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                        let (status, content_type, body) = match path.as_str() {
                            "/index.html" => ("200 OK", "text/html", SHELL_HTML),
                            "/static/app.js" => ("200 OK", "application/javascript", APP_JS),
                            _ => ("404 Not Found", "text/plain", "not found"),
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            content_type,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
