//! HTTP request handlers and shared application state.

use crate::api::errors::ApiError;
use crate::api::metrics;
use crate::api::models::*;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;
use uservec_core::ingest::USER_ID_KEY;
use uservec_core::{
    IngestRequest, IngestionService, Metadata, QueryRequest, QueryService, StoreError,
    TextEncoder, VectorStore,
};
use uuid::Uuid;

/// Liveness message returned by `GET /`.
pub const LIVENESS_MESSAGE: &str = "✅ Vector Service is live!";

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: VectorStore,
    pub ingest: IngestionService,
    pub query: QueryService,
    /// Backs the text endpoints; `None` makes them answer 503.
    pub encoder: Option<Arc<dyn TextEncoder>>,
    pub prometheus_handle: PrometheusHandle,
    pub start_time: Instant,
}

impl AppState {
    /// Builds the ingestion and query services around one shared store.
    pub fn new(
        store: VectorStore,
        encoder: Option<Arc<dyn TextEncoder>>,
        prometheus_handle: PrometheusHandle,
    ) -> Self {
        Self {
            ingest: IngestionService::new(store.clone()),
            query: QueryService::new(store.clone()),
            store,
            encoder,
            prometheus_handle,
            start_time: Instant::now(),
        }
    }
}

fn require_user_id(user_id: Option<UserIdField>) -> Result<String, ApiError> {
    user_id
        .map(String::from)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| StoreError::MissingField(USER_ID_KEY).into())
}

/// Runs `text` through the configured encoder and checks the output size.
async fn encode_text(state: &AppState, text: &str) -> Result<Vec<f32>, ApiError> {
    let encoder = state
        .encoder
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("No text encoder configured".into()))?;
    uservec_core::encoder::validate_text(text)?;
    let embedding = encoder.encode(text).await?;
    let dimension = state.store.dimension();
    if embedding.len() != dimension {
        return Err(StoreError::Encoder(format!(
            "encoder returned {} components, store dimension is {}",
            embedding.len(),
            dimension
        ))
        .into());
    }
    Ok(embedding)
}

fn store(
    state: &AppState,
    user_id: String,
    embedding: Vec<f32>,
    metadata: Option<Metadata>,
) -> Result<Json<StoreResponse>, ApiError> {
    let receipt = state.ingest.ingest(IngestRequest {
        user_id: Some(user_id),
        embedding,
        metadata,
    })?;
    metrics::update_vector_count(state.store.size());
    Ok(Json(StoreResponse {
        status: receipt.status.to_string(),
        vector_id: receipt.vector_id,
    }))
}

fn find_similar(
    state: &AppState,
    embedding: Vec<f32>,
    top_k: Option<i64>,
) -> Result<Json<Vec<Metadata>>, ApiError> {
    let results = state.query.find_similar(QueryRequest {
        embedding,
        top_k: normalize_top_k(top_k),
    })?;
    Ok(Json(results.into_iter().map(|r| r.metadata).collect()))
}

/// `GET /`
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: LIVENESS_MESSAGE.to_string(),
    })
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        dimension: state.store.dimension(),
        vector_count: state.store.size(),
    })
}

/// `POST /store_user_vector`
pub async fn store_user_vector(
    State(state): State<AppState>,
    payload: Result<Json<StoreUserVectorRequest>, JsonRejection>,
) -> Result<Json<StoreResponse>, ApiError> {
    let result = store_vector_payload(&state, payload);
    metrics::record_ingest("vector", metrics::outcome(&result));
    result
}

fn store_vector_payload(
    state: &AppState,
    payload: Result<Json<StoreUserVectorRequest>, JsonRejection>,
) -> Result<Json<StoreResponse>, ApiError> {
    let Json(req) = payload?;
    let user_id = require_user_id(req.user_id)?;
    store(state, user_id, req.embedding, req.metadata)
}

/// `POST /store_user_text`
pub async fn store_user_text(
    State(state): State<AppState>,
    payload: Result<Json<StoreUserTextRequest>, JsonRejection>,
) -> Result<Json<StoreResponse>, ApiError> {
    let result = store_text_payload(&state, payload).await;
    metrics::record_ingest("text", metrics::outcome(&result));
    result
}

async fn store_text_payload(
    state: &AppState,
    payload: Result<Json<StoreUserTextRequest>, JsonRejection>,
) -> Result<Json<StoreResponse>, ApiError> {
    let Json(req) = payload?;
    let user_id = require_user_id(req.user_id)?;
    let embedding = encode_text(state, &req.text).await?;
    store(state, user_id, embedding, req.metadata)
}

/// `POST /find_similar_users`
pub async fn find_similar_users(
    State(state): State<AppState>,
    payload: Result<Json<FindSimilarRequest>, JsonRejection>,
) -> Result<Json<Vec<Metadata>>, ApiError> {
    let result = payload
        .map_err(ApiError::from)
        .and_then(|Json(req)| find_similar(&state, req.embedding, req.top_k));
    metrics::record_query("vector", metrics::outcome(&result));
    result
}

/// `POST /find_similar_users_by_text`
pub async fn find_similar_users_by_text(
    State(state): State<AppState>,
    payload: Result<Json<FindSimilarByTextRequest>, JsonRejection>,
) -> Result<Json<Vec<Metadata>>, ApiError> {
    let result = find_by_text_payload(&state, payload).await;
    metrics::record_query("text", metrics::outcome(&result));
    result
}

async fn find_by_text_payload(
    state: &AppState,
    payload: Result<Json<FindSimilarByTextRequest>, JsonRejection>,
) -> Result<Json<Vec<Metadata>>, ApiError> {
    let Json(req) = payload?;
    let embedding = encode_text(state, &req.text).await?;
    find_similar(state, embedding, req.top_k)
}

/// `GET /vectors/:id`
pub async fn get_vector(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VectorResponse>, ApiError> {
    let vector_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid vector id '{}'", id)))?;
    let stored = state.query.get(&vector_id)?;
    Ok(Json(VectorResponse {
        vector_id: stored.vector_id,
        metadata: stored.metadata,
    }))
}

/// `GET /metrics`
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}
