//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve and load the document shell
//! - Build the dev-server proxy or static asset service
//! - Bind the listener last, once everything else is ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;
use crate::http::proxy::ProxyError;
use crate::shell::ShellError;

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("document shell unavailable: {0}")]
    Shell(#[from] ShellError),

    #[error("dev server proxy setup failed: {0}")]
    Proxy(#[from] ProxyError),

    #[error("invalid bind address `{0}`")]
    Address(String),

    #[error("failed to bind listener: {0}")]
    Bind(#[from] std::io::Error),
}

/// Bind the TCP listener for the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, StartupError> {
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|_| StartupError::Address(config.bind_address.clone()))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Listener bound");
    Ok(listener)
}
