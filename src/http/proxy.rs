//! Forwarding to the development server.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the dev server's scheme and authority
//! - Forward method, headers, path, query and body unchanged
//! - Stream the upstream response back to the client
//!
//! # Design Decisions
//! - Single upstream, no retries or load balancing
//! - Upstream failures map to 502 Bad Gateway

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{header, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use url::Url;

/// HTTP client used for the dev server.
pub type HttpClient = Client<HttpConnector, Body>;

/// Build the shared upstream client.
pub fn build_client() -> HttpClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Errors forwarding a request upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("dev server url has no authority: {0}")]
    Authority(String),

    #[error("failed to rewrite request uri: {0}")]
    Uri(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_GATEWAY, "Dev server request failed").into_response()
    }
}

/// Reverse proxy to a single development server.
#[derive(Clone)]
pub struct DevServerProxy {
    client: HttpClient,
    authority: Authority,
}

impl DevServerProxy {
    pub fn new(base: &Url, client: HttpClient) -> Result<Self, ProxyError> {
        let host = base
            .host_str()
            .ok_or_else(|| ProxyError::Authority(base.to_string()))?;
        let authority = match base.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = authority
            .parse::<Authority>()
            .map_err(|_| ProxyError::Authority(base.to_string()))?;

        Ok(Self { client, authority })
    }

    /// Absolute upstream URI for an inbound request URI.
    pub fn upstream_uri(&self, uri: &Uri) -> Result<Uri, ProxyError> {
        let path_and_query = uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        Ok(Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?)
    }

    /// Forward `request` and return the upstream response.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response, ProxyError> {
        let (mut parts, body) = request.into_parts();
        parts.uri = self.upstream_uri(&parts.uri)?;
        if let Ok(host) = header::HeaderValue::from_str(self.authority.as_str()) {
            parts.headers.insert(header::HOST, host);
        }

        tracing::debug!(uri = %parts.uri, method = %parts.method, "Forwarding to dev server");

        let response = self
            .client
            .request(Request::from_parts(parts, body))
            .await?;
        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
