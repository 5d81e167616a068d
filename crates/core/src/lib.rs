//! # uservec-core
//!
//! In-memory store of fixed-dimension user vectors with exact L2
//! nearest-neighbor search and per-vector metadata.
//!
//! ```text
//! IngestionService ──write lock──▶ StoreState::append ─┬─▶ VectorIndex::insert
//!                                                      └─▶ MetadataStore::append
//! QueryService ─────read lock───▶ VectorIndex::search ──▶ MetadataStore::get_by_position
//! ```
//!
//! This is the engine crate with no async runtime dependency; the HTTP layer
//! lives in `uservec-server`.

/// Global configuration constants: dimension, limits, and server defaults.
pub mod config;
/// Squared Euclidean distance.
pub mod distance;
/// Text encoder seam used by text-accepting front ends.
pub mod encoder;
/// Error taxonomy shared by every component.
pub mod error;
/// Exact brute-force nearest-neighbor index.
pub mod index;
/// Ingestion service: validation and the atomic two-store append.
pub mod ingest;
/// Positional metadata store with an external id lookup table.
pub mod metadata;
/// Query service: search and map positions back to metadata.
pub mod query;
/// Shared store: index and metadata behind one reader-writer lock.
pub mod store;

pub use encoder::TextEncoder;
pub use error::{StoreError, StoreResult};
pub use index::VectorIndex;
pub use ingest::{IngestReceipt, IngestRequest, IngestionService};
pub use metadata::{Metadata, MetadataStore};
pub use query::{QueryRequest, QueryService, SimilarUser, StoredUser};
pub use store::{StoreState, VectorStore};
