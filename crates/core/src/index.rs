//! Exact nearest-neighbor index over append-only vectors.
//!
//! [`VectorIndex`] keeps every vector in one contiguous arena (`size * dimension`
//! floats) in insertion order. The internal position of a vector is its slot in
//! the arena and never changes. Search is brute force: every stored vector is
//! scored against the query, O(n·D) per call.

use crate::distance::{euclidean_sq, first_non_finite};
use crate::error::{StoreError, StoreResult};
use ordered_float::OrderedFloat;

/// Checks an incoming embedding before it reaches the index: exact length and
/// finite components only.
pub fn validate_embedding(embedding: &[f32], dimension: usize) -> StoreResult<()> {
    if embedding.len() != dimension {
        return Err(StoreError::DimensionMismatch {
            expected: dimension,
            got: embedding.len(),
        });
    }
    if let Some(i) = first_non_finite(embedding) {
        return Err(StoreError::InvalidEmbedding(format!(
            "component {} is NaN or infinite",
            i
        )));
    }
    Ok(())
}

/// Append-only flat L2 index.
///
/// Not synchronized on its own; [`crate::store::VectorStore`] owns it behind the
/// same lock as the metadata store.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    /// Arena of all vectors, `dimension` floats per position.
    data: Vec<f32>,
}

impl VectorIndex {
    /// Creates an empty index for vectors of length `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Fixed vector length accepted by this index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn size(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks that `vector` has exactly `dimension` components.
    pub fn check_dimension(&self, vector: &[f32]) -> StoreResult<()> {
        if vector.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }
        Ok(())
    }

    /// Appends a vector and returns its position (the size before the insert).
    pub fn insert(&mut self, vector: &[f32]) -> StoreResult<usize> {
        self.check_dimension(vector)?;
        let position = self.size();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    /// Returns the vector stored at `position`.
    pub fn get(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start.checked_add(self.dimension)?)
    }

    /// Iterates `(position, vector)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f32])> {
        self.data.chunks_exact(self.dimension.max(1)).enumerate()
    }

    /// Exact k-nearest-neighbor search.
    ///
    /// Returns up to `k` `(position, squared_l2_distance)` pairs ordered by
    /// ascending distance, ties broken by ascending position. An empty index or
    /// `k == 0` yields an empty list; `k > size` yields every vector.
    pub fn search(&self, query: &[f32], k: usize) -> StoreResult<Vec<(usize, f64)>> {
        self.check_dimension(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f64)> = self
            .iter()
            .map(|(position, stored)| (position, euclidean_sq(query, stored)))
            .collect();

        let rank = |&(position, distance): &(usize, f64)| (OrderedFloat(distance), position);
        if k < scored.len() {
            scored.select_nth_unstable_by_key(k - 1, rank);
            scored.truncate(k);
        }
        scored.sort_unstable_by_key(rank);
        Ok(scored)
    }
}
