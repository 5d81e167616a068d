use axum::routing::post;
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use uservec_core::{TextEncoder, VectorStore};
use uservec_server::api::create_router;
use uservec_server::api::handlers::AppState;
use uservec_server::encoder::HttpTextEncoder;

const DIM: usize = 3;

async fn spawn_app(encoder: Option<Arc<dyn TextEncoder>>) -> String {
    let store = VectorStore::new(DIM).expect("valid dimension");

    let prometheus_handle =
        match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(_) => metrics_exporter_prometheus::PrometheusBuilder::new()
                .build_recorder()
                .handle(),
        };

    let app = create_router(AppState::new(store, encoder, prometheus_handle));
    serve(app).await
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn stub_embedding(text: &str) -> Vec<f32> {
    match text {
        "sci-fi fan" => vec![1.0, 0.0, 0.0],
        "romance reader" => vec![0.0, 1.0, 0.0],
        _ => vec![0.0, 0.0, 1.0],
    }
}

/// Local stand-in for the sentence encoder service.
///
/// `/embed` answers with a 3-component vector, `/embed_short` with a
/// 2-component one and `/embed_fail` always fails.
async fn spawn_stub_encoder() -> String {
    async fn embed(Json(body): Json<Value>) -> Json<Value> {
        let text = body["text"].as_str().unwrap_or_default();
        Json(json!({ "embedding": stub_embedding(text) }))
    }
    async fn embed_short() -> Json<Value> {
        Json(json!({ "embedding": [1.0, 2.0] }))
    }
    async fn embed_fail() -> (axum::http::StatusCode, &'static str) {
        (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "model not loaded")
    }

    let app = Router::new()
        .route("/embed", post(embed))
        .route("/embed_short", post(embed_short))
        .route("/embed_fail", post(embed_fail));
    serve(app).await
}

async fn http_encoder(path: &str) -> Arc<dyn TextEncoder> {
    let encoder_url = spawn_stub_encoder().await;
    Arc::new(
        HttpTextEncoder::new(format!("{}{}", encoder_url, path), Duration::from_secs(5))
            .expect("client builds"),
    )
}

fn client() -> Client {
    Client::new()
}

async fn store_vector(base_url: &str, body: Value) -> reqwest::Response {
    client()
        .post(format!("{}/store_user_vector", base_url))
        .json(&body)
        .send()
        .await
        .expect("Failed to store vector")
}

async fn find_similar(base_url: &str, body: Value) -> reqwest::Response {
    client()
        .post(format!("{}/find_similar_users", base_url))
        .json(&body)
        .send()
        .await
        .expect("Failed to query")
}

async fn vector_count(base_url: &str) -> u64 {
    let body: Value = client()
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["vector_count"].as_u64().unwrap()
}

#[tokio::test]
async fn liveness_message() {
    let base_url = spawn_app(None).await;

    let resp = client().get(&base_url).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"status": "✅ Vector Service is live!"}));
}

#[tokio::test]
async fn health_returns_ok() {
    let base_url = spawn_app(None).await;

    let resp = client()
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["dimension"], 3);
    assert_eq!(body["vector_count"], 0);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let base_url = spawn_app(None).await;

    let resp = client().get(&base_url).send().await.unwrap();
    let request_id = resp.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

#[tokio::test]
async fn metrics_endpoint_responds() {
    let base_url = spawn_app(None).await;

    let resp = client()
        .get(format!("{}/metrics", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn store_then_find_exact_match() {
    let base_url = spawn_app(None).await;

    let resp = store_vector(&base_url, json!({"user_id": "u1", "embedding": [0.0, 0.0, 0.0]})).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "stored");
    assert!(uuid::Uuid::parse_str(body["vector_id"].as_str().unwrap()).is_ok());
    assert_eq!(vector_count(&base_url).await, 1);

    let resp = find_similar(&base_url, json!({"embedding": [0.0, 0.0, 0.0], "top_k": 1})).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!([{"user_id": "u1"}]));
}

#[tokio::test]
async fn find_on_empty_store_returns_empty_list() {
    let base_url = spawn_app(None).await;

    let resp = find_similar(&base_url, json!({"embedding": [0.0, 0.0, 0.0]})).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn wrong_embedding_size_rejected() {
    let base_url = spawn_app(None).await;
    store_vector(&base_url, json!({"user_id": "u1", "embedding": [0.0, 0.0, 0.0]})).await;

    let resp = store_vector(&base_url, json!({"user_id": "u2", "embedding": [1.0, 1.0]})).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"error": "Invalid embedding size"}));
    assert_eq!(vector_count(&base_url).await, 1);

    let resp = find_similar(&base_url, json!({"embedding": [1.0, 1.0, 1.0, 1.0]})).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid embedding size");
}

#[tokio::test]
async fn missing_embedding_is_invalid_size() {
    let base_url = spawn_app(None).await;

    let resp = store_vector(&base_url, json!({"user_id": "u1"})).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid embedding size");

    let resp = find_similar(&base_url, json!({})).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(vector_count(&base_url).await, 0);
}

#[tokio::test]
async fn missing_user_id_rejected() {
    let base_url = spawn_app(None).await;

    let resp = store_vector(&base_url, json!({"embedding": [0.0, 0.0, 0.0]})).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"error": "Missing required field: user_id"}));

    let resp = store_vector(&base_url, json!({"user_id": "", "embedding": [0.0, 0.0, 0.0]})).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(vector_count(&base_url).await, 0);
}

#[tokio::test]
async fn integer_user_id_is_stringified() {
    let base_url = spawn_app(None).await;

    let resp = store_vector(&base_url, json!({"user_id": 42, "embedding": [1.0, 2.0, 3.0]})).await;
    assert_eq!(resp.status(), 200);

    let resp = find_similar(&base_url, json!({"embedding": [1.0, 2.0, 3.0], "top_k": 1})).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!([{"user_id": "42"}]));
}

#[tokio::test]
async fn metadata_is_returned_with_request_user_id() {
    let base_url = spawn_app(None).await;

    store_vector(
        &base_url,
        json!({
            "user_id": "u1",
            "embedding": [0.5, 0.5, 0.5],
            "metadata": {"age": 31, "genres": ["drama", "noir"], "user_id": "spoofed"}
        }),
    )
    .await;

    let resp = find_similar(&base_url, json!({"embedding": [0.5, 0.5, 0.5], "top_k": 1})).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!([{"user_id": "u1", "age": 31, "genres": ["drama", "noir"]}])
    );
}

#[tokio::test]
async fn top_k_handling() {
    let base_url = spawn_app(None).await;
    for i in 0..8 {
        store_vector(
            &base_url,
            json!({"user_id": format!("u{}", i), "embedding": [i as f32, 0.0, 0.0]}),
        )
        .await;
    }

    let resp = find_similar(&base_url, json!({"embedding": [0.0, 0.0, 0.0]})).await;
    let body: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(body.len(), 5);

    for top_k in [0, -3] {
        let resp = find_similar(&base_url, json!({"embedding": [0.0, 0.0, 0.0], "top_k": top_k})).await;
        assert_eq!(resp.status(), 200);
        let body: Vec<Value> = resp.json().await.unwrap();
        assert_eq!(body, vec![json!({"user_id": "u0"})]);
    }

    let resp = find_similar(&base_url, json!({"embedding": [0.0, 0.0, 0.0], "top_k": 100})).await;
    let body: Vec<Value> = resp.json().await.unwrap();
    let users: Vec<&str> = body.iter().map(|m| m["user_id"].as_str().unwrap()).collect();
    assert_eq!(users, vec!["u0", "u1", "u2", "u3", "u4", "u5", "u6", "u7"]);
}

#[tokio::test]
async fn get_vector_by_id() {
    let base_url = spawn_app(None).await;

    let resp = store_vector(
        &base_url,
        json!({"user_id": "u1", "embedding": [0.0, 1.0, 0.0], "metadata": {"city": "Haifa"}}),
    )
    .await;
    let body: Value = resp.json().await.unwrap();
    let vector_id = body["vector_id"].as_str().unwrap().to_string();

    let resp = client()
        .get(format!("{}/vectors/{}", base_url, vector_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["vector_id"], vector_id.as_str());
    assert_eq!(body["metadata"], json!({"user_id": "u1", "city": "Haifa"}));

    let resp = client()
        .get(format!("{}/vectors/{}", base_url, uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client()
        .get(format!("{}/vectors/not-a-uuid", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn malformed_json_returns_error_body() {
    let base_url = spawn_app(None).await;

    let resp = client()
        .post(format!("{}/store_user_vector", base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
    assert_eq!(vector_count(&base_url).await, 0);
}

#[tokio::test]
async fn concurrent_inserts_are_all_stored() {
    let base_url = spawn_app(None).await;

    let tasks: Vec<_> = (0..50)
        .map(|i| {
            let base_url = base_url.clone();
            tokio::spawn(async move {
                let resp = store_vector(
                    &base_url,
                    json!({"user_id": format!("c{}", i), "embedding": [i as f32, 1.0, -1.0]}),
                )
                .await;
                assert_eq!(resp.status(), 200);
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(vector_count(&base_url).await, 50);
    let resp = find_similar(&base_url, json!({"embedding": [0.0, 1.0, -1.0], "top_k": 100})).await;
    let body: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(body.len(), 50);
    let users: HashSet<&str> = body.iter().map(|m| m["user_id"].as_str().unwrap()).collect();
    assert_eq!(users.len(), 50);
    assert_eq!(body[0]["user_id"], "c0");
}

#[tokio::test]
async fn text_routes_without_encoder_unavailable() {
    let base_url = spawn_app(None).await;

    let resp = client()
        .post(format!("{}/store_user_text", base_url))
        .json(&json!({"user_id": "u1", "text": "sci-fi fan"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = client()
        .post(format!("{}/find_similar_users_by_text", base_url))
        .json(&json!({"text": "sci-fi fan"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn text_routes_use_encoder() {
    let base_url = spawn_app(Some(http_encoder("/embed").await)).await;

    for (user, text) in [("u1", "sci-fi fan"), ("u2", "romance reader")] {
        let resp = client()
            .post(format!("{}/store_user_text", base_url))
            .json(&json!({"user_id": user, "text": text, "metadata": {"bio": text}}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "stored");
    }

    let resp = client()
        .post(format!("{}/find_similar_users_by_text", base_url))
        .json(&json!({"text": "romance reader", "top_k": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!([{"user_id": "u2", "bio": "romance reader"}]));

    // Vectors stored through the text route are queryable by vector too.
    let resp = find_similar(&base_url, json!({"embedding": [1.0, 0.0, 0.0], "top_k": 1})).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body[0]["user_id"], "u1");
}

#[tokio::test]
async fn text_route_validates_input_before_encoding() {
    let base_url = spawn_app(Some(http_encoder("/embed").await)).await;

    let resp = client()
        .post(format!("{}/store_user_text", base_url))
        .json(&json!({"text": "sci-fi fan"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Missing required field: user_id");

    let resp = client()
        .post(format!("{}/store_user_text", base_url))
        .json(&json!({"user_id": "u1", "text": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Missing required field: text");
    assert_eq!(vector_count(&base_url).await, 0);
}

#[tokio::test]
async fn encoder_faults_are_service_unavailable() {
    for path in ["/embed_short", "/embed_fail"] {
        let base_url = spawn_app(Some(http_encoder(path).await)).await;

        let resp = client()
            .post(format!("{}/store_user_text", base_url))
            .json(&json!({"user_id": "u1", "text": "sci-fi fan"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 503, "encoder path {}", path);
        assert_eq!(vector_count(&base_url).await, 0);
    }
}

#[tokio::test]
async fn http_encoder_round_trip() {
    let encoder_url = spawn_stub_encoder().await;
    let encoder =
        HttpTextEncoder::new(format!("{}/embed", encoder_url), Duration::from_secs(5)).unwrap();

    assert_eq!(encoder.encode("sci-fi fan").await.unwrap(), vec![1.0, 0.0, 0.0]);

    let failing =
        HttpTextEncoder::new(format!("{}/embed_fail", encoder_url), Duration::from_secs(5)).unwrap();
    assert!(matches!(
        failing.encode("anything").await,
        Err(uservec_core::StoreError::Encoder(_))
    ));
}
