//! Positional metadata store.
//!
//! One [`Metadata`] record per stored vector, kept at the same position the
//! vector occupies in [`crate::index::VectorIndex`], plus a hash table from
//! external id to position so lookups by id never scan.

use crate::error::{StoreError, StoreResult};
use std::collections::HashMap;
use uuid::Uuid;

/// Open key-value mapping supplied by the caller at ingestion.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Append-only metadata records addressable by position or external id.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    records: Vec<Metadata>,
    /// Reverse map: position → external id. Indexed by position.
    position_to_id: Vec<Uuid>,
    /// External id → position.
    id_to_position: HashMap<Uuid, usize>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if `id` is already registered.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.id_to_position.contains_key(id)
    }

    /// Appends `metadata` at the next sequential position and registers `id` for it.
    ///
    /// Fails with [`StoreError::DuplicateId`] without mutating anything if `id`
    /// is already registered.
    pub fn append(&mut self, id: Uuid, metadata: Metadata) -> StoreResult<usize> {
        if self.contains(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        let position = self.records.len();
        self.records.push(metadata);
        self.position_to_id.push(id);
        self.id_to_position.insert(id, position);
        Ok(position)
    }

    pub fn get_by_position(&self, position: usize) -> StoreResult<&Metadata> {
        self.records
            .get(position)
            .ok_or_else(|| StoreError::NotFound(format!("position {}", position)))
    }

    pub fn get_by_external_id(&self, id: &Uuid) -> StoreResult<&Metadata> {
        let position = self
            .position_of(id)
            .ok_or_else(|| StoreError::NotFound(format!("vector {}", id)))?;
        self.get_by_position(position)
    }

    /// Resolves an external id to its position.
    pub fn position_of(&self, id: &Uuid) -> Option<usize> {
        self.id_to_position.get(id).copied()
    }

    /// External id registered for `position`.
    pub fn external_id_at(&self, position: usize) -> Option<Uuid> {
        self.position_to_id.get(position).copied()
    }

    /// Validates that the id table and the record list agree.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.records.len();
        if self.position_to_id.len() != n {
            return Err(format!(
                "position_to_id length {} != records {}",
                self.position_to_id.len(),
                n
            ));
        }
        if self.id_to_position.len() != n {
            return Err(format!(
                "id_to_position length {} != records {}",
                self.id_to_position.len(),
                n
            ));
        }
        for (position, id) in self.position_to_id.iter().enumerate() {
            if self.id_to_position.get(id) != Some(&position) {
                return Err(format!("id {} does not map back to position {}", id, position));
            }
        }
        Ok(())
    }
}
