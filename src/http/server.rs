//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Load the document shell and pick the asset source at startup
//! - Create the Axum Router with the catch-all preload handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Classify each request and dispatch it to the matching pipeline
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::PreloaderConfig;
use crate::http::assets::AssetService;
use crate::http::proxy::{build_client, DevServerProxy, HttpClient};
use crate::http::request::{buffer_body, request_id, MakeUuidRequestId, X_REQUEST_ID};
use crate::http::response::ResponseBuffer;
use crate::lifecycle::shutdown;
use crate::lifecycle::StartupError;
use crate::observability::metrics;
use crate::preload::{DispatchError, Dispatcher, PreloadRequest, PreloadSettings, Preloader};
use crate::routing::{RequestClassifier, RequestKind, RouteTable};
use crate::shell::{load_shell, DocumentShell, ShellSource};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<RequestClassifier>,
    pub preloader: Preloader,
    pub assets: AssetService,
    pub max_body_bytes: usize,
}

/// HTTP server for the preloading middleware.
pub struct HttpServer {
    router: Router,
    config: PreloaderConfig,
}

impl HttpServer {
    /// Load the shell and build the server. Fails if the shell is unavailable.
    pub async fn new(config: PreloaderConfig, routes: RouteTable) -> Result<Self, StartupError> {
        let client = build_client();
        let source = ShellSource::resolve(&config.preload)?;
        let shell = load_shell(&source, &client).await?;
        Self::with_shell(config, routes, shell, &source, client)
    }

    /// Build the server around an already loaded shell.
    pub fn with_shell(
        config: PreloaderConfig,
        routes: RouteTable,
        shell: DocumentShell,
        source: &ShellSource,
        client: HttpClient,
    ) -> Result<Self, StartupError> {
        let assets = match source {
            ShellSource::BuildRoot(root) => AssetService::build_root(root),
            ShellSource::DevServer(url) => AssetService::dev_server(DevServerProxy::new(url, client)?),
        };

        let dispatcher = Dispatcher::new(
            Arc::new(routes),
            PreloadSettings {
                handler_timeout: config.preload.handler_timeout(),
            },
        );
        tracing::info!(
            routes = dispatcher.routes().len(),
            api_prefix = %config.preload.api_prefix,
            staggered = config.preload.staggered_mode,
            "Preload engine ready"
        );

        let state = AppState {
            classifier: Arc::new(RequestClassifier::new(config.preload.api_prefix.clone())),
            preloader: Preloader::new(dispatcher, Arc::new(shell), config.preload.staggered_mode),
            assets,
            max_body_bytes: config.preload.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &PreloaderConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(preload_handler))
            .route("/", any(preload_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeUuidRequestId))
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &PreloaderConfig {
        &self.config
    }
}

/// Catch-all handler: classify, then preload, dispatch or pass through.
async fn preload_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(request.headers()).to_string();
    let path = request.uri().path().to_string();

    match state.classifier.classify(&path) {
        RequestKind::Asset => {
            metrics::record_request("asset");
            tracing::debug!(request_id = %request_id, path = %path, "Serving asset");
            state.assets.serve(request).await
        }
        RequestKind::Document => {
            metrics::record_request("document");
            let snapshot = match snapshot(request, state.max_body_bytes).await {
                Ok(snapshot) => snapshot,
                Err(rejection) => return rejection,
            };
            tracing::debug!(
                request_id = %request_id,
                method = %snapshot.method(),
                request_target = %snapshot.request_target(),
                "Rendering document route"
            );
            state.preloader.render(&snapshot).await.into_response()
        }
        RequestKind::Api { lookup_path } => {
            metrics::record_request("api");
            let snapshot = match snapshot(request, state.max_body_bytes).await {
                Ok(snapshot) => snapshot,
                Err(rejection) => return rejection,
            };
            api_response(&state, &request_id, lookup_path, &snapshot).await
        }
    }
}

async fn snapshot(request: Request<Body>, limit: usize) -> Result<PreloadRequest, Response> {
    let (parts, body) = buffer_body(request, limit).await?;
    Ok(PreloadRequest::from_parts(&parts, body))
}

async fn api_response(
    state: &AppState,
    request_id: &str,
    lookup_path: &str,
    request: &PreloadRequest,
) -> Response {
    match state.preloader.dispatcher().dispatch_one(lookup_path, request).await {
        Some(Ok(capture)) => {
            tracing::debug!(
                request_id = %request_id,
                lookup_path = %lookup_path,
                status = %capture.status(),
                "API handler completed"
            );
            ResponseBuffer::from(capture).into_response()
        }
        Some(Err(e @ DispatchError::TimedOut { .. })) => {
            tracing::warn!(request_id = %request_id, error = %e, "API handler timed out");
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
        Some(Err(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "API handler failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        None => {
            tracing::warn!(
                request_id = %request_id,
                method = %request.method(),
                lookup_path = %lookup_path,
                "No API route registered"
            );
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
