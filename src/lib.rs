//! HTTP preloading middleware for single-page applications.
//!
//! Document requests are answered with the application shell plus a JSON
//! bundle of every registered handler's response along the request path, so
//! the client can render without a second round of API calls.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod preload;
pub mod routing;
pub mod shell;

pub use config::schema::PreloaderConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use preload::{PreloadRequest, ResponseWriter};
pub use routing::{RegistryBuilder, RouteTable};
