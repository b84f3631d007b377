//! Route registration and exact-match lookup.
//!
//! # Responsibilities
//! - Collect (method, path) → handler entries during the build phase
//! - Freeze them into an immutable table before serving starts
//! - Look up a handler by exact method and path
//!
//! # Design Decisions
//! - Immutable after `build()` (thread-safe without locks, shared via Arc)
//! - O(1) lookup via nested HashMaps
//! - Last registration for a (method, path) pair wins; overwrites are logged

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::preload::capture::ResponseWriter;
use crate::preload::request::PreloadRequest;

/// A registered handler. Handlers are synchronous and may block.
pub type Handler = Arc<dyn Fn(&mut dyn ResponseWriter, &PreloadRequest) + Send + Sync>;

/// A single registered route.
#[derive(Clone)]
pub struct RouteEntry {
    method: Method,
    path: String,
    handler: Handler,
}

impl RouteEntry {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run the handler against the given sink.
    pub fn invoke(&self, writer: &mut dyn ResponseWriter, request: &PreloadRequest) {
        (self.handler)(writer, request);
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

type RouteMap = HashMap<Method, HashMap<String, RouteEntry>>;

/// Mutable registry used before serving begins.
#[derive(Default)]
pub struct RegistryBuilder {
    routes: RouteMap,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the handler for an exact (method, path) pair.
    pub fn register<F>(&mut self, method: Method, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut dyn ResponseWriter, &PreloadRequest) + Send + Sync + 'static,
    {
        let path = path.into();
        let entry = RouteEntry {
            method: method.clone(),
            path: path.clone(),
            handler: Arc::new(handler),
        };

        if self
            .routes
            .entry(method.clone())
            .or_default()
            .insert(path.clone(), entry)
            .is_some()
        {
            tracing::warn!(method = %method, path = %path, "Route registered twice, keeping the last handler");
        }
        self
    }

    pub fn get<F>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut dyn ResponseWriter, &PreloadRequest) + Send + Sync + 'static,
    {
        self.register(Method::GET, path, handler)
    }

    pub fn post<F>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut dyn ResponseWriter, &PreloadRequest) + Send + Sync + 'static,
    {
        self.register(Method::POST, path, handler)
    }

    pub fn put<F>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut dyn ResponseWriter, &PreloadRequest) + Send + Sync + 'static,
    {
        self.register(Method::PUT, path, handler)
    }

    pub fn patch<F>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut dyn ResponseWriter, &PreloadRequest) + Send + Sync + 'static,
    {
        self.register(Method::PATCH, path, handler)
    }

    pub fn delete<F>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut dyn ResponseWriter, &PreloadRequest) + Send + Sync + 'static,
    {
        self.register(Method::DELETE, path, handler)
    }

    /// Freeze the registry for serving.
    pub fn build(self) -> RouteTable {
        let table = RouteTable { routes: self.routes };
        tracing::debug!(routes = table.len(), "Route table built");
        table
    }
}

/// Frozen, read-only route table.
#[derive(Default)]
pub struct RouteTable {
    routes: RouteMap,
}

impl RouteTable {
    /// Exact-match lookup.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        self.routes.get(method)?.get(path)
    }

    /// Total number of registered (method, path) pairs.
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable").field("routes", &self.len()).finish()
    }
}
