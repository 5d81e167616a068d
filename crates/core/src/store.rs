//! The shared vector store: index and metadata behind one lock.
//!
//! [`StoreState`] owns both the [`VectorIndex`] and the [`MetadataStore`]. The
//! only way to add a record is [`StoreState::append`], which writes the vector
//! and its metadata in one call, so position `p` in one store always names the
//! same entity as position `p` in the other. [`VectorStore`] wraps the state in
//! a single `RwLock`: ingestion holds the write lock for the whole append,
//! queries share the read lock.

use crate::config;
use crate::error::{StoreError, StoreResult};
use crate::index::VectorIndex;
use crate::metadata::{Metadata, MetadataStore};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;
use uuid::Uuid;

/// Index and metadata kept in lock-step.
///
/// Fields are private: outside this module the stores can be read but only
/// grown through [`StoreState::append`].
#[derive(Debug)]
pub struct StoreState {
    index: VectorIndex,
    metadata: MetadataStore,
}

impl StoreState {
    fn new(dimension: usize) -> Self {
        Self {
            index: VectorIndex::new(dimension),
            metadata: MetadataStore::new(),
        }
    }

    /// Number of stored records.
    pub fn size(&self) -> usize {
        self.index.size()
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Appends a vector and its metadata at the same position.
    ///
    /// Every failure condition is checked before either store is touched, so
    /// an error leaves both stores exactly as they were.
    pub fn append(&mut self, id: Uuid, vector: &[f32], metadata: Metadata) -> StoreResult<usize> {
        self.index.check_dimension(vector)?;
        if self.metadata.contains(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        let expected = self.index.size();
        if self.metadata.len() != expected {
            return Err(StoreError::InvariantViolation(format!(
                "index holds {} vectors but metadata holds {} records",
                expected,
                self.metadata.len()
            )));
        }

        let vector_position = self.index.insert(vector)?;
        let metadata_position = self.metadata.append(id, metadata)?;
        if vector_position != metadata_position {
            return Err(StoreError::InvariantViolation(format!(
                "vector stored at {} but metadata at {}",
                vector_position, metadata_position
            )));
        }
        Ok(vector_position)
    }

    /// Validates that both stores have the same length and a consistent id table.
    pub fn validate(&self) -> Result<(), String> {
        if self.index.size() != self.metadata.len() {
            return Err(format!(
                "index size {} != metadata size {}",
                self.index.size(),
                self.metadata.len()
            ));
        }
        self.metadata.validate()
    }
}

/// A thread-safe handle to the process-wide vector store.
///
/// Created once at startup with a fixed dimension and passed explicitly to the
/// services. Cloning produces a new handle to the same shared state.
#[derive(Debug, Clone)]
pub struct VectorStore {
    dimension: usize,
    state: Arc<RwLock<StoreState>>,
}

impl VectorStore {
    /// Creates an empty store for vectors of length `dimension`.
    ///
    /// `dimension` must be in `1..=MAX_DIMENSION`.
    pub fn new(dimension: usize) -> StoreResult<Self> {
        if dimension == 0 || dimension > config::MAX_DIMENSION {
            return Err(StoreError::InvalidDimension {
                got: dimension,
                max: config::MAX_DIMENSION,
            });
        }
        Ok(Self {
            dimension,
            state: Arc::new(RwLock::new(StoreState::new(dimension))),
        })
    }

    /// Fixed dimension of every stored and queried vector.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Current number of stored vectors.
    pub fn size(&self) -> usize {
        self.state.read().size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Shared read access; compatible with other readers.
    pub fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read()
    }

    /// Exclusive write access; blocks readers and other writers.
    pub fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write()
    }

    /// Runs [`StoreState::validate`] under the read lock.
    pub fn validate(&self) -> Result<(), String> {
        self.state.read().validate()
    }
}
