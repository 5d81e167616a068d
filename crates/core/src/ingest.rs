//! Ingestion: validate a user vector and record it in the store.

use crate::config;
use crate::error::{StoreError, StoreResult};
use crate::index::validate_embedding;
use crate::metadata::Metadata;
use crate::store::VectorStore;
use serde_json::Value;
use uuid::Uuid;

/// Status string reported for a successfully stored vector.
pub const STATUS_STORED: &str = "stored";

/// Metadata key that always carries the originating user id.
pub const USER_ID_KEY: &str = "user_id";

/// A new user vector to store.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    /// Required, non-empty.
    pub user_id: Option<String>,
    pub embedding: Vec<f32>,
    /// Free-form caller metadata. `user_id` is merged into it on ingestion.
    pub metadata: Option<Metadata>,
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReceipt {
    pub status: &'static str,
    pub vector_id: Uuid,
    /// Internal position assigned in both stores.
    pub position: usize,
}

/// Validates new vectors and appends them to the index and metadata store as one step.
#[derive(Debug, Clone)]
pub struct IngestionService {
    store: VectorStore,
}

impl IngestionService {
    pub fn new(store: VectorStore) -> Self {
        Self { store }
    }

    /// Stores one user vector.
    ///
    /// All validation runs before the write lock is taken; on any error the
    /// store is left untouched.
    pub fn ingest(&self, request: IngestRequest) -> StoreResult<IngestReceipt> {
        let user_id = request
            .user_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(StoreError::MissingField(USER_ID_KEY))?;
        validate_embedding(&request.embedding, self.store.dimension())?;

        let mut metadata = request.metadata.unwrap_or_default();
        validate_metadata(&metadata)?;
        metadata.insert(USER_ID_KEY.to_string(), Value::String(user_id));

        let vector_id = Uuid::new_v4();
        let position = self
            .store
            .write()
            .append(vector_id, &request.embedding, metadata)?;

        tracing::debug!(%vector_id, position, "Stored user vector");
        Ok(IngestReceipt {
            status: STATUS_STORED,
            vector_id,
            position,
        })
    }
}

fn validate_metadata(metadata: &Metadata) -> StoreResult<()> {
    if metadata.len() > config::MAX_METADATA_KEYS {
        return Err(StoreError::InvalidMetadata(format!(
            "exceeds maximum of {} keys",
            config::MAX_METADATA_KEYS
        )));
    }
    let size = serde_json::to_vec(metadata).map(|v| v.len()).unwrap_or(0);
    if size > config::MAX_METADATA_BYTES {
        return Err(StoreError::InvalidMetadata(format!(
            "exceeds maximum size of {} bytes",
            config::MAX_METADATA_BYTES
        )));
    }
    Ok(())
}
