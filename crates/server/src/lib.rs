//! uservec-server: HTTP server for uservec.
//!
//! Provides the REST API and the HTTP text-encoder client.
//! Store logic lives in `uservec-core`.

/// REST API layer: Axum router, HTTP handlers, models, metrics.
pub mod api;
/// Remote sentence encoder behind the core `TextEncoder` trait.
pub mod encoder;
