//! Bio-Block HTTP server
//!
//! Actix-web REST API for storing, searching and filtering dataset
//! summaries, plus spreadsheet redaction.

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

use actix_cors::Cors;
use actix_web::{error::InternalError, web, App, HttpResponse, HttpServer};
use bioblock_common::{AppConfig, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use error::ApiError;
pub use state::AppState;

use types::ErrorResponse;

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::store::store)
        .service(routes::search::search)
        .service(routes::search::search_with_filter)
        .service(routes::filter::filter)
        .service(routes::embedding::embed)
        .service(routes::redact::redact)
        .service(routes::redact::anonymize)
        .service(routes::system::health)
        .service(routes::system::stats);
}

/// Malformed JSON bodies become 400 `{"error": ...}`. Bodies up to
/// `limit` bytes are accepted.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default().limit(limit).error_handler(|err, _req| {
        let body = ErrorResponse {
            error: format!("Invalid request body: {}", err),
        };
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Build state and serve until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_address = config.server_bind_address();
    let json_limit = config.max_upload_bytes;
    let state = Arc::new(AppState::new(config)?);

    info!("Starting HTTP server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config(json_limit))
            .configure(configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{self, HeaderMap};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::web::Bytes;
    use bioblock_common::IdScheme;
    use bioblock_embed::{Embedder, HashingEmbedder};
    use bioblock_redact::{pseudonym, Cell, Sheet, Workbook};
    use bioblock_vector::LocalVectorStore;
    use serde_json::{json, Value};

    fn test_state() -> Arc<AppState> {
        let config = AppConfig {
            embedding_dim: 4096,
            id_scheme: IdScheme::Uuid,
            max_upload_bytes: 64 * 1024,
            ..AppConfig::default()
        };
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(config.embedding_dim));
        let store = LocalVectorStore::in_memory(&config.collection_name, embedder.clone());
        Arc::new(AppState::with_components(config, Arc::new(store), embedder))
    }

    /// Send one request through a fresh service over shared state
    async fn send(state: &Arc<AppState>, req: TestRequest) -> (StatusCode, HeaderMap, Bytes) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .app_data(json_config(state.config.max_upload_bytes))
                .configure(configure),
        )
        .await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = test::read_body(resp).await;
        (status, headers, body)
    }

    async fn post_json(state: &Arc<AppState>, path: &str, body: Value) -> (StatusCode, Value) {
        let (status, _, bytes) = send(state, TestRequest::post().uri(path).set_json(body)).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn get_json(state: &Arc<AppState>, path: &str) -> (StatusCode, Value) {
        let (status, _, bytes) = send(state, TestRequest::get().uri(path)).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn seed(state: &Arc<AppState>) {
        let records = [
            ("Blood glucose of diabetic adults", "QmA", "diabetes", "Male"),
            ("Heart rate variability in athletes", "QmB", "cardio", "Female"),
            ("Insulin response in diabetic teens", "QmC", "diabetes", "Female"),
        ];
        for (summary, cid, tags, gender) in records {
            let (status, _) = post_json(
                state,
                "/store",
                json!({
                    "summary": summary,
                    "cid": cid,
                    "dataset_title": format!("Dataset {}", cid),
                    "metadata": {"disease_tags": tags, "gender": gender}
                }),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    fn cids(body: &Value) -> Vec<String> {
        body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["cid"].as_str().unwrap().to_string())
            .collect()
    }

    #[actix_web::test]
    async fn test_store_response() {
        let state = test_state();
        let (status, body) = post_json(
            &state,
            "/store",
            json!({"summary": "S", "cid": "QmZ", "metadata": {"price": "0.01"}}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Stored successfully", "cid": "QmZ"}));
    }

    #[actix_web::test]
    async fn test_store_validation() {
        let state = test_state();
        let (status, body) = post_json(&state, "/store", json!({"summary": "S"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing 'summary' or 'cid'");
    }

    #[actix_web::test]
    async fn test_store_rejects_nested_metadata() {
        let state = test_state();
        let (status, body) = post_json(
            &state,
            "/store",
            json!({"summary": "S", "cid": "QmA", "metadata": {"nested": {"a": 1}}}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[actix_web::test]
    async fn test_store_accepts_large_body() {
        let state = test_state();
        let summary = "cohort ".repeat(6000);
        let (status, _) = post_json(&state, "/store", json!({"summary": summary, "cid": "QmBig"})).await;
        assert_eq!(status, StatusCode::OK);

        let too_big = "x".repeat(state.config.max_upload_bytes + 1);
        let (status, body) = post_json(&state, "/store", json!({"summary": too_big, "cid": "QmHuge"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[actix_web::test]
    async fn test_search_scores() {
        let state = test_state();
        seed(&state).await;

        let (status, body) = post_json(&state, "/search", json!({"query": "diabetic glucose"})).await;
        assert_eq!(status, StatusCode::OK);

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["cid"], "QmA");
        assert!(results[0]["summary"]
            .as_str()
            .unwrap()
            .starts_with("Dataset Title: Dataset QmA\n"));

        let scores: Vec<f64> = results.iter().map(|r| r["score"].as_f64().unwrap()).collect();
        assert!(scores.iter().all(|s| *s > 0.0 && *s <= 1.0));
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[actix_web::test]
    async fn test_search_empty_query() {
        let state = test_state();
        let (status, body) = post_json(&state, "/search", json!({"query": "  "})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Query is required");
    }

    #[actix_web::test]
    async fn test_filter_and_truncation() {
        let state = test_state();
        seed(&state).await;

        let (status, body) = post_json(
            &state,
            "/filter",
            json!({"filters": {"disease_tags": "diabetes"}, "n_results": 1}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_found"], 2);
        assert_eq!(cids(&body), ["QmA"]);
        assert!(body["results"][0].get("score").is_none());

        let (_, body) = post_json(
            &state,
            "/filter",
            json!({"filters": {"disease_tags": "diabetes", "gender": "Female"}}),
        )
        .await;
        assert_eq!(body["total_found"], 1);
        assert_eq!(cids(&body), ["QmC"]);

        let (_, body) = post_json(&state, "/filter", json!({"filters": {}, "n_results": 0})).await;
        assert_eq!(cids(&body), ["QmA", "QmB", "QmC"]);
    }

    #[actix_web::test]
    async fn test_filter_by_cid() {
        let state = test_state();
        seed(&state).await;

        let (_, body) = post_json(&state, "/filter", json!({"filters": {"cid": "QmB"}})).await;
        assert_eq!(body["total_found"], 1);
        assert_eq!(body["results"][0]["metadata"]["gender"], "Female");
    }

    #[actix_web::test]
    async fn test_search_with_filter() {
        let state = test_state();
        seed(&state).await;

        let (status, body) = post_json(
            &state,
            "/search_with_filter",
            json!({"query": "athletes", "filters": {"gender": "Female"}, "n_results": 5}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cids(&body), ["QmB", "QmC"]);

        let (status, _) = post_json(&state, "/search_with_filter", json!({"filters": {}})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            post_json(&state, "/search_with_filter", json!({"query": "x", "n_results": 0})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    /// Hashing embedder that remembers every text it was asked to embed
    struct RecordingEmbedder {
        inner: HashingEmbedder,
        seen: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Embedder for RecordingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.seen.lock().unwrap().push(text.to_string());
            self.inner.embed(text).await
        }

        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    #[actix_web::test]
    async fn test_search_endpoints_embed_query_as_sent() {
        let recorder = Arc::new(RecordingEmbedder {
            inner: HashingEmbedder::new(64),
            seen: std::sync::Mutex::new(Vec::new()),
        });
        let embedder: Arc<dyn Embedder> = recorder.clone();
        let store = LocalVectorStore::in_memory("records", embedder.clone());
        let config = AppConfig {
            embedding_dim: 64,
            ..AppConfig::default()
        };
        let state = Arc::new(AppState::with_components(config, Arc::new(store), embedder));

        let (status, _) = post_json(&state, "/search", json!({"query": "  athletes "})).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post_json(
            &state,
            "/search_with_filter",
            json!({"query": "  athletes ", "filters": {}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(*recorder.seen.lock().unwrap(), ["  athletes ", "  athletes "]);
    }

    #[actix_web::test]
    async fn test_embed() {
        let state = test_state();

        let (status, body) = post_json(&state, "/embed", json!({"text": "glucose"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["embedding"].as_array().unwrap().len(), 4096);

        let (_, empty) = post_json(&state, "/embed", json!({"text": ""})).await;
        assert!(empty["embedding"]
            .as_array()
            .unwrap()
            .iter()
            .all(|v| v.as_f64() == Some(0.0)));
    }

    #[actix_web::test]
    async fn test_health_and_stats() {
        let state = test_state();
        seed(&state).await;

        let (status, health) = get_json(&state, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "OK");
        assert!(health["endpoints"].as_array().unwrap().contains(&json!("/redact")));

        let (_, stats) = get_json(&state, "/stats").await;
        assert_eq!(stats["total_documents"], 3);
        assert_eq!(stats["collection"], "new_user_data");
        assert_eq!(stats["embedding_model"], "feature-hashing");
    }

    fn upload(path: &str, file_name: &str, bytes: &[u8]) -> TestRequest {
        let boundary = "bioblock-test-boundary";
        let mut body = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            boundary, file_name
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        TestRequest::post()
            .uri(path)
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            ))
            .set_payload(body)
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn visits_xlsx() -> Vec<u8> {
        let sheet = Sheet::with_rows(
            "Visits",
            vec![
                vec![text("Patient ID"), text("Note"), text("Email")],
                vec![text("P1"), text("Contact jane@example.org"), text("jane@example.org")],
                vec![text("P2"), text("Hello"), Cell::Float(3.5)],
            ],
        );
        Workbook { sheets: vec![sheet] }.to_xlsx_bytes().unwrap()
    }

    #[actix_web::test]
    async fn test_redact_upload() {
        let state = test_state();
        let (status, headers, body) = send(&state, upload("/redact", "visits.xlsx", &visits_xlsx())).await;

        assert_eq!(status, StatusCode::OK);
        let disposition = headers.get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"redacted_"));
        assert!(disposition.ends_with(".xlsx\""));

        let workbook = Workbook::from_bytes(body.to_vec()).unwrap();
        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.name, "Visits");
        assert_eq!(sheet.get(1, 1), Some(&text("Contact <EMAIL_ADDRESS>")));
        assert_eq!(sheet.get(1, 2), Some(&text("<EMAIL_ADDRESS>")));
        assert_eq!(sheet.get(2, 1), Some(&text("Hello")));
        assert_eq!(sheet.get(2, 2), Some(&Cell::Float(3.5)));
    }

    #[actix_web::test]
    async fn test_anonymize_upload() {
        let state = test_state();
        let (status, headers, body) =
            send(&state, upload("/anonymize", "visits.xlsx", &visits_xlsx())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("phi_anonymized_"));

        let workbook = Workbook::from_bytes(body.to_vec()).unwrap();
        let sheet = &workbook.sheets[0];
        let p1 = text(&pseudonym("p1"));
        assert_eq!(sheet.get(1, 0), Some(&p1));
        assert_eq!(sheet.get(1, 2), Some(&p1));
        assert_eq!(sheet.get(1, 1), Some(&text("Contact jane@example.org")));
    }

    #[actix_web::test]
    async fn test_upload_rejections() {
        let state = test_state();

        let (status, _, _) = send(&state, upload("/redact", "notes.txt", b"hello")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = send(&state, upload("/anonymize", "broken.xlsx", b"not a zip")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let oversized = vec![b'x'; 65 * 1024];
        let (status, _, body) = send(&state, upload("/redact", "big.xlsx", &oversized)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("File too large"));

        let (status, _, _) = send(
            &state,
            TestRequest::post()
                .uri("/redact")
                .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=b"))
                .set_payload("--b--\r\n"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
