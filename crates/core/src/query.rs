//! Similarity queries: nearest stored users for a query vector.

use crate::config;
use crate::error::{StoreError, StoreResult};
use crate::index::validate_embedding;
use crate::metadata::Metadata;
use crate::store::{StoreState, VectorStore};
use uuid::Uuid;

/// A nearest-neighbor query.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub embedding: Vec<f32>,
    /// Number of neighbors wanted; defaults to [`config::DEFAULT_TOP_K`] and is
    /// clamped to `[1, size]`.
    pub top_k: Option<usize>,
}

/// One query hit, nearest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarUser {
    pub vector_id: Uuid,
    pub position: usize,
    /// Squared L2 distance to the query.
    pub distance: f64,
    pub metadata: Metadata,
}

/// A stored record fetched by external id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUser {
    pub vector_id: Uuid,
    pub position: usize,
    pub metadata: Metadata,
}

/// Answers similarity queries against the shared store under its read lock.
#[derive(Debug, Clone)]
pub struct QueryService {
    store: VectorStore,
}

impl QueryService {
    pub fn new(store: VectorStore) -> Self {
        Self { store }
    }

    /// Returns the stored users nearest to `request.embedding`, nearest first.
    ///
    /// An empty store yields an empty list. A hit whose position has no
    /// metadata is reported as [`StoreError::InvariantViolation`].
    pub fn find_similar(&self, request: QueryRequest) -> StoreResult<Vec<SimilarUser>> {
        validate_embedding(&request.embedding, self.store.dimension())?;

        let state = self.store.read();
        let size = state.size();
        if size == 0 {
            return Ok(Vec::new());
        }
        let k = request.top_k.unwrap_or(config::DEFAULT_TOP_K).clamp(1, size);

        let hits = state.index().search(&request.embedding, k)?;
        hits.into_iter()
            .map(|(position, distance)| -> StoreResult<SimilarUser> {
                let (vector_id, metadata) = resolve(&state, position)?;
                Ok(SimilarUser {
                    vector_id,
                    position,
                    distance,
                    metadata: metadata.clone(),
                })
            })
            .collect()
    }

    /// Looks up one stored record by its external id.
    pub fn get(&self, vector_id: &Uuid) -> StoreResult<StoredUser> {
        let state = self.store.read();
        let metadata = state.metadata().get_by_external_id(vector_id)?;
        let position = state
            .metadata()
            .position_of(vector_id)
            .ok_or_else(|| StoreError::NotFound(format!("vector {}", vector_id)))?;
        Ok(StoredUser {
            vector_id: *vector_id,
            position,
            metadata: metadata.clone(),
        })
    }
}

/// Maps an index position to its external id and metadata.
fn resolve(state: &StoreState, position: usize) -> StoreResult<(Uuid, &Metadata)> {
    let metadata = state.metadata();
    match (metadata.external_id_at(position), metadata.get_by_position(position)) {
        (Some(id), Ok(record)) => Ok((id, record)),
        _ => {
            tracing::error!(
                position,
                index_size = state.index().size(),
                metadata_size = metadata.len(),
                "Index returned a position with no metadata"
            );
            Err(StoreError::InvariantViolation(format!(
                "position {} has a vector but no metadata",
                position
            )))
        }
    }
}
