//! Text-to-vector encoder seam.
//!
//! The store never encodes text itself. Front ends that accept free text call a
//! [`TextEncoder`] first and hand the resulting vector to the ingestion or
//! query service; the only contract is that the output has the store dimension.

use crate::config;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;

/// Produces a fixed-dimension embedding for a piece of text.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Encodes `text` into a vector. Implementations may fail with
    /// [`StoreError::Encoder`].
    async fn encode(&self, text: &str) -> StoreResult<Vec<f32>>;
}

/// Rejects empty or oversized text before it is sent to an encoder.
pub fn validate_text(text: &str) -> StoreResult<()> {
    if text.trim().is_empty() {
        return Err(StoreError::MissingField("text"));
    }
    if text.len() > config::MAX_TEXT_LEN {
        return Err(StoreError::InvalidText(format!(
            "exceeds maximum length of {} bytes",
            config::MAX_TEXT_LEN
        )));
    }
    Ok(())
}
