//! Static asset passthrough.
//!
//! Asset requests never reach the preload engine. They are served from the
//! build root, or forwarded to the dev server when there is no build.

use std::convert::Infallible;
use std::path::Path;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::http::proxy::DevServerProxy;

/// Where asset requests are answered from.
#[derive(Clone)]
pub enum AssetService {
    BuildRoot(ServeDir),
    DevServer(DevServerProxy),
}

impl AssetService {
    pub fn build_root(root: &Path) -> Self {
        Self::BuildRoot(ServeDir::new(root))
    }

    pub fn dev_server(proxy: DevServerProxy) -> Self {
        Self::DevServer(proxy)
    }

    pub async fn serve(&self, request: Request<Body>) -> Response {
        match self {
            Self::BuildRoot(dir) => {
                let result: Result<_, Infallible> = dir.clone().oneshot(request).await;
                match result {
                    Ok(response) => response.map(Body::new),
                    Err(never) => match never {},
                }
            }
            Self::DevServer(proxy) => match proxy.forward(request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, "Dev server asset request failed");
                    e.into_response()
                }
            },
        }
    }
}
