//! Concurrent dispatch of preload handlers.
//!
//! # Responsibilities
//! - Look up every ancestor prefix of a document request
//! - Run matching handlers concurrently against fresh captures
//! - Join all of them, then merge captures into a bundle
//! - Run a single API handler for the API namespace
//!
//! # Design Decisions
//! - Handlers are synchronous and may block, so each runs on the blocking pool
//! - One JoinSet per request; the joining task is the only bundle writer
//! - Ancestor handlers get the request without its query string
//! - Timeouts and panics drop that entry; the page request still completes

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::task::JoinSet;

use crate::observability::metrics;
use crate::preload::bundle::PreloadBundle;
use crate::preload::capture::CapturedResponse;
use crate::preload::decompose::{dispatch_plan, split_target, DispatchTarget};
use crate::preload::request::PreloadRequest;
use crate::routing::{RouteEntry, RouteTable};

/// Why a handler produced no capture.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("handler for {0} panicked")]
    Panicked(String),

    #[error("handler for {path} did not finish within {timeout:?}")]
    TimedOut { path: String, timeout: Duration },

    #[error("handler task for {0} was cancelled")]
    Cancelled(String),
}

/// Engine settings, passed explicitly rather than read from globals.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreloadSettings {
    /// Deadline for each handler; `None` waits indefinitely.
    pub handler_timeout: Option<Duration>,
}

/// Output of one sub-task.
struct Dispatched {
    key: String,
    terminal: bool,
    outcome: Result<CapturedResponse, DispatchError>,
}

/// Runs registered handlers against capturing responders.
#[derive(Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    settings: PreloadSettings,
}

impl Dispatcher {
    pub fn new(routes: Arc<RouteTable>, settings: PreloadSettings) -> Self {
        Self { routes, settings }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Run every handler matching an ancestor prefix of the request path and
    /// collect their captures.
    ///
    /// Ancestors are keyed by prefix; the terminal capture is keyed by the
    /// full request-target and wins any key collision.
    pub async fn collect(&self, request: &PreloadRequest) -> PreloadBundle {
        let started = Instant::now();
        let target = request.request_target().to_string();
        let (path, _) = split_target(&target);

        let mut tasks = JoinSet::new();
        for DispatchTarget { prefix, terminal } in dispatch_plan(path) {
            let Some(entry) = self.routes.lookup(request.method(), &prefix) else {
                continue;
            };
            let entry = entry.clone();
            let (key, scoped) = if terminal {
                (target.clone(), request.clone())
            } else {
                (prefix, request.without_query())
            };

            tracing::debug!(key = %key, terminal, "Dispatching preload handler");
            tasks.spawn_blocking(move || {
                let outcome = run_handler(&entry, &scoped);
                Dispatched {
                    key,
                    terminal,
                    outcome,
                }
            });
        }

        let bundle = self.join_all(tasks).await;
        metrics::record_bundle(started.elapsed(), bundle.len());
        bundle
    }

    /// Barrier: wait for every sub-task, or until the handler deadline.
    async fn join_all(&self, mut tasks: JoinSet<Dispatched>) -> PreloadBundle {
        let mut bundle = PreloadBundle::new();
        let deadline = self
            .settings
            .handler_timeout
            .map(|timeout| (tokio::time::Instant::now() + timeout, timeout));

        loop {
            let next = match deadline {
                Some((at, timeout)) => match tokio::time::timeout_at(at, tasks.join_next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        tracing::warn!(
                            pending = tasks.len(),
                            timeout = ?timeout,
                            "Preload handlers exceeded deadline, omitting their entries"
                        );
                        for _ in 0..tasks.len() {
                            metrics::record_dispatch("timeout");
                        }
                        tasks.detach_all();
                        break;
                    }
                },
                None => tasks.join_next().await,
            };

            let Some(joined) = next else {
                break;
            };

            match joined {
                Ok(Dispatched {
                    key,
                    terminal,
                    outcome: Ok(capture),
                }) => {
                    tracing::debug!(key = %key, status = %capture.status(), "Captured preload response");
                    metrics::record_dispatch("captured");
                    bundle.merge(key, capture, terminal);
                }
                Ok(Dispatched {
                    outcome: Err(e), ..
                }) => {
                    tracing::warn!(error = %e, "Preload handler failed, omitting entry");
                    metrics::record_dispatch("panicked");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Preload task did not complete");
                    metrics::record_dispatch("cancelled");
                }
            }
        }

        bundle
    }

    /// Run the handler registered for `lookup_path`, if any.
    ///
    /// Used for the API namespace; the handler sees the request unmodified.
    pub async fn dispatch_one(
        &self,
        lookup_path: &str,
        request: &PreloadRequest,
    ) -> Option<Result<CapturedResponse, DispatchError>> {
        let entry = self.routes.lookup(request.method(), lookup_path)?.clone();
        let scoped = request.clone();
        let path = lookup_path.to_string();

        let task = tokio::task::spawn_blocking(move || run_handler(&entry, &scoped));
        let joined = match self.settings.handler_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, task).await {
                Ok(joined) => joined,
                Err(_) => return Some(Err(DispatchError::TimedOut { path, timeout })),
            },
            None => task.await,
        };

        Some(joined.unwrap_or_else(|_| Err(DispatchError::Cancelled(path))))
    }
}

/// Invoke a handler against a fresh capture, containing panics.
pub fn run_handler(entry: &RouteEntry, request: &PreloadRequest) -> Result<CapturedResponse, DispatchError> {
    let mut capture = CapturedResponse::new();
    catch_unwind(AssertUnwindSafe(|| entry.invoke(&mut capture, request)))
        .map_err(|_| DispatchError::Panicked(entry.path().to_string()))?;
    Ok(capture)
}
