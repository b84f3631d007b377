//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, classification)
//!     → request.rs (request ID, body buffering)
//!     → document route: preload engine → response.rs
//!     → API route: single handler → response.rs
//!     → asset: assets.rs (build root) or proxy.rs (dev server)
//!     → Send to client
//! ```

pub mod assets;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeUuidRequestId, X_REQUEST_ID};
pub use response::ResponseBuffer;
pub use server::HttpServer;
