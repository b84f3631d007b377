//! Preload subsystem.
//!
//! # Data Flow
//! ```text
//! Document request "/users/42?tab=posts"
//!     → decompose.rs   "/", "/users", "/users/42"
//!     → dispatch.rs    registry lookup per prefix, one blocking task each,
//!                      handler writes into a CapturedResponse (capture.rs)
//!     → join barrier
//!     → bundle.rs      { "/": ..., "/users": ..., "/users/42?tab=posts": ... }
//!     → inject.rs      <script>window.httpPreload={...}</script> before </body>
//!     → terminal capture headers promoted unless it is a 404
//! ```
//!
//! # Design Decisions
//! - Handlers never abort the page; failures only omit their entry
//! - Ancestors are keyed by clean path, the terminal by the full request-target
//! - The terminal key is authoritative on collision

pub mod bundle;
pub mod capture;
pub mod decompose;
pub mod dispatch;
pub mod engine;
pub mod inject;
pub mod request;

pub use bundle::{BundleError, PreloadBundle};
pub use capture::{CapturedResponse, ResponseWriter};
pub use dispatch::{DispatchError, Dispatcher, PreloadSettings};
pub use engine::Preloader;
pub use request::PreloadRequest;
