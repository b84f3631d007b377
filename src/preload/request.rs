//! Request snapshot handed to preload handlers.

use axum::body::Bytes;
use axum::http::request::Parts;
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, Method, Uri};

/// An owned, cheaply cloneable view of an inbound request.
///
/// The body is buffered once; every copy shares the same `Bytes`.
#[derive(Debug, Clone)]
pub struct PreloadRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl PreloadRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    /// Snapshot the head of an axum request together with its buffered body.
    pub fn from_parts(parts: &Parts, body: Bytes) -> Self {
        Self::new(parts.method.clone(), parts.uri.clone(), parts.headers.clone(), body)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Path plus query string exactly as the client sent it.
    pub fn request_target(&self) -> &str {
        self.uri
            .path_and_query()
            .map(PathAndQuery::as_str)
            .unwrap_or("/")
    }

    /// First value of a decoded query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Shallow copy with the query string cleared.
    pub fn without_query(&self) -> Self {
        let mut parts = self.uri.clone().into_parts();
        parts.path_and_query = self.uri.path().parse::<PathAndQuery>().ok();
        let uri = Uri::from_parts(parts).unwrap_or_else(|_| Uri::from_static("/"));

        Self {
            method: self.method.clone(),
            uri,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}
