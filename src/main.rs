//! HTTP preloading server (v1)
//!
//! Serves a single-page application and inlines the data it needs.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ classify ──┬─ asset ────▶ build root / dev server
//!                                                │
//!                                                ├─ api ──────▶ single handler ──▶ response
//!                                                │
//!                                                └─ document ─▶ decompose path
//!                                                               │ (one blocking task per prefix)
//!                                                               ▼
//!                                                            join ──▶ bundle ──▶ shell + <script>
//!
//!     Cross-cutting: config, logging, metrics, lifecycle (startup / graceful shutdown)
//! ```

use std::path::PathBuf;

use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use clap::Parser;

use http_preloader::config::loader::dev_mode_requested;
use http_preloader::config::{apply_env_overrides, load_config, validate_config, ConfigError, PreloaderConfig};
use http_preloader::lifecycle::{signals, startup, Shutdown};
use http_preloader::observability::{logging, metrics};
use http_preloader::{HttpServer, PreloadRequest, RegistryBuilder, ResponseWriter, RouteTable};

#[derive(Parser)]
#[command(name = "http-preloader")]
#[command(about = "Serve a single-page app with its API data preloaded", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the build root directory.
    #[arg(long)]
    build_root: Option<String>,

    /// Override the API path prefix.
    #[arg(long)]
    api_prefix: Option<String>,

    /// Override the dev server base URL.
    #[arg(long)]
    dev_server: Option<String>,

    /// Serve the bare shell without preloading.
    #[arg(long)]
    staggered: bool,
}

impl Cli {
    fn apply(self, config: &mut PreloaderConfig) {
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(root) = self.build_root {
            config.preload.build_root = Some(root);
        }
        if let Some(prefix) = self.api_prefix {
            config.preload.api_prefix = prefix;
        }
        if let Some(url) = self.dev_server {
            config.preload.dev_server_url = url;
        }
        if self.staggered {
            config.preload.staggered_mode = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PreloaderConfig::default(),
    };
    cli.apply(&mut config);

    logging::init(&config.observability)?;
    tracing::info!("http-preloader v{} starting", env!("CARGO_PKG_VERSION"));

    apply_env_overrides(&mut config, dev_mode_requested());
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        api_prefix = %config.preload.api_prefix,
        build_root = ?config.preload.build_root,
        dev_server_url = %config.preload.dev_server_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config.clone(), demo_routes()).await?;
    let listener = startup::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Sample handlers showing how an application plugs into the registry.
fn demo_routes() -> RouteTable {
    let mut routes = RegistryBuilder::new();

    routes.get("/", |w: &mut dyn ResponseWriter, _: &PreloadRequest| {
        w.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        w.write_str(r#"{"session":{"user":"guest"}}"#);
    });

    routes.get("/item", |w: &mut dyn ResponseWriter, r: &PreloadRequest| {
        w.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match r.query_param("id") {
            Some(id) => {
                let body = serde_json::json!({ "item": { "id": id } });
                w.write_str(&body.to_string());
            }
            None => {
                w.write_header(StatusCode::BAD_REQUEST);
                w.write_str(r#"{"error":"missing id"}"#);
            }
        }
    });

    routes.build()
}
