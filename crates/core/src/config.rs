//! Global configuration constants for uservec.
//!
//! Input validation limits and server defaults are defined here.
//! These are compile-time constants; runtime configuration is handled via CLI arguments
//! and environment variables in the server's `main.rs`.

/// Default embedding dimension (output size of the all-MiniLM-L6-v2 sentence encoder).
pub const DEFAULT_DIMENSION: usize = 384;

/// Maximum allowed embedding dimension.
pub const MAX_DIMENSION: usize = 4096;

/// Number of neighbors returned when a query does not specify `top_k`.
pub const DEFAULT_TOP_K: usize = 5;

/// Maximum number of metadata keys per stored vector.
pub const MAX_METADATA_KEYS: usize = 64;

/// Maximum total serialized size of metadata in bytes (64 KB).
pub const MAX_METADATA_BYTES: usize = 65_536;

/// Maximum length of free text sent to the text encoder, in bytes.
pub const MAX_TEXT_LEN: usize = 100_000;

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 5005;

/// Per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout for a single call to the external text encoder, in seconds.
pub const ENCODER_TIMEOUT_SECS: u64 = 10;

/// Maximum HTTP request body size in bytes (4 MB).
pub const MAX_REQUEST_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Maximum number of concurrent in-flight requests.
pub const MAX_CONCURRENT_REQUESTS: usize = 512;

/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;
