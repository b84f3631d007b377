//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → classify.rs (API / document / asset)
//!     → registry.rs (exact (method, path) lookup)
//!     → Return: matched RouteEntry or None
//!
//! Route Registration (at startup):
//!     RegistryBuilder::register(...)
//!     → build()
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Exact matching only; no wildcards or parameters
//! - Deterministic: same input always matches same route

pub mod classify;
pub mod registry;

pub use classify::{is_document_path, RequestClassifier, RequestKind};
pub use registry::{Handler, RegistryBuilder, RouteEntry, RouteTable};
