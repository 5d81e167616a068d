//! Request and response data transfer objects for the REST API.
//!
//! All types derive `Serialize` and/or `Deserialize` for JSON marshalling via Axum.

use serde::{Deserialize, Serialize};
use uservec_core::Metadata;
use uuid::Uuid;

/// A `user_id` as sent by clients: either a string or an integer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UserIdField {
    Text(String),
    Integer(i64),
}

impl From<UserIdField> for String {
    fn from(id: UserIdField) -> Self {
        match id {
            UserIdField::Text(s) => s,
            UserIdField::Integer(n) => n.to_string(),
        }
    }
}

/// Request body for `POST /store_user_vector`.
#[derive(Debug, Deserialize)]
pub struct StoreUserVectorRequest {
    pub user_id: Option<UserIdField>,
    /// A missing embedding is treated as empty and fails the size check.
    #[serde(default)]
    pub embedding: Vec<f32>,
    pub metadata: Option<Metadata>,
}

/// Request body for `POST /store_user_text`.
#[derive(Debug, Deserialize)]
pub struct StoreUserTextRequest {
    pub user_id: Option<UserIdField>,
    #[serde(default)]
    pub text: String,
    pub metadata: Option<Metadata>,
}

/// Request body for `POST /find_similar_users`.
#[derive(Debug, Deserialize)]
pub struct FindSimilarRequest {
    #[serde(default)]
    pub embedding: Vec<f32>,
    pub top_k: Option<i64>,
}

/// Request body for `POST /find_similar_users_by_text`.
#[derive(Debug, Deserialize)]
pub struct FindSimilarByTextRequest {
    #[serde(default)]
    pub text: String,
    pub top_k: Option<i64>,
}

/// Converts a client `top_k` into a neighbor count. Anything below 1 means 1.
pub fn normalize_top_k(top_k: Option<i64>) -> Option<usize> {
    top_k.map(|k| usize::try_from(k.max(1)).unwrap_or(usize::MAX))
}

/// Response body for the store endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreResponse {
    pub status: String,
    pub vector_id: Uuid,
}

/// Response body for `GET /vectors/:id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorResponse {
    pub vector_id: Uuid,
    pub metadata: Metadata,
}

/// Response body for `GET /`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub dimension: usize,
    pub vector_count: usize,
}
