//! Axum-based API gateway for HarborQA. Config-driven via AppConfig; the
//! browser client is a plain HTTP caller with no business logic of its own.

use axum::{
    extract::{Json, Multipart, State},
    http::Method,
    routing::{get, post},
    Router,
};
use harborqa_agents::{GeminiModel, MockModel, ScriptAgent, TestCaseAgent, TextModel};
use harborqa_core::{
    AppConfig, ChunkIndex, FallbackCatalog, IngestStatus, IngestionPipeline,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Retrieval context snippets injected into a test-plan prompt.
const CONTEXT_TOP_K: usize = 3;

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!(
            "[harborqa-gateway] .env not loaded: {} (using system environment)",
            e
        );
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing credential in live mode halts here, before any request is accepted.
    let config = Arc::new(AppConfig::load().expect("load AppConfig"));

    let index = Arc::new(ChunkIndex::open_path(config.index_path()).expect("open chunk index"));
    let pipeline = Arc::new(IngestionPipeline::new(
        Arc::clone(&index),
        config.chunk_policy(),
    ));

    let model: Arc<dyn TextModel> = if config.llm_mode == "live" {
        Arc::new(GeminiModel::from_config(&config).expect("build model client"))
    } else {
        Arc::new(MockModel)
    };
    let fallback = Arc::new(FallbackCatalog::builtin());
    let test_cases = Arc::new(TestCaseAgent::new(Arc::clone(&model), Arc::clone(&fallback)));
    let scripts = Arc::new(ScriptAgent::new(model, fallback));

    let app = build_app(AppState {
        config: Arc::clone(&config),
        index,
        pipeline,
        test_cases,
        scripts,
    });

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("{} listening on {}", config.app_name, addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}

fn build_app(state: AppState) -> Router {
    // The browser UI runs on another origin; generation and upload calls come
    // from fetch().
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/", get(home))
        .route("/index-status", get(index_status))
        .route("/upload-documents/", post(upload_documents))
        .route("/generate-test-cases/", post(generate_test_cases))
        .route("/generate-selenium-script/", post(generate_selenium_script))
        .with_state(state)
        .layer(cors)
}

#[derive(Clone)]
struct AppState {
    config: Arc<AppConfig>,
    index: Arc<ChunkIndex>,
    pipeline: Arc<IngestionPipeline>,
    test_cases: Arc<TestCaseAgent>,
    scripts: Arc<ScriptAgent>,
}

/// GET / – static readiness message; no checks are performed.
async fn home(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": format!("{} (Circuit Breaker Enabled) is Running", state.config.app_name)
    }))
}

/// GET /index-status – chunk count of the knowledge index, for the UI.
async fn index_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.index.count() {
        Ok(chunks) => Json(serde_json::json!({
            "status": "ok",
            "chunks": chunks,
            "storage_path": state.config.storage_path,
        })),
        Err(e) => Json(serde_json::json!({
            "status": "degraded",
            "error": e.to_string(),
        })),
    }
}

/// POST /upload-documents/ – multipart file list into the chunk index.
/// Always answers `status: "success"`: a degraded ingest is logged for the
/// operator and surfaced only through the fallback-mode message.
async fn upload_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Json<serde_json::Value> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field
            .file_name()
            .map(|s| s.to_string())
            .or_else(|| field.name().map(|s| s.to_string()))
            .unwrap_or_else(|| format!("upload-{}", files.len()));
        match field.bytes().await {
            Ok(bytes) => files.push((name, bytes.to_vec())),
            Err(e) => {
                tracing::warn!(
                    target: "harborqa::gateway",
                    file = %name,
                    error = %e,
                    "failed to read multipart field"
                );
            }
        }
    }

    let report = state.pipeline.ingest(&files);
    if report.status == IngestStatus::Degraded {
        tracing::warn!(
            target: "harborqa::gateway",
            detail = ?report.detail,
            "ingestion degraded; reporting success to caller"
        );
    }
    Json(serde_json::json!({
        "status": "success",
        "message": report.message(),
    }))
}

#[derive(serde::Deserialize)]
struct TestCaseRequest {
    query: String,
}

/// POST /generate-test-cases/ – live generation or fallback substitution.
async fn generate_test_cases(
    State(state): State<AppState>,
    Json(req): Json<TestCaseRequest>,
) -> Json<serde_json::Value> {
    tracing::info!(
        target: "harborqa::gateway",
        query_len = req.query.len(),
        "test-case generation requested"
    );

    // Best-effort retrieval context: a cold or failing index never blocks
    // generation.
    let context: Vec<String> = state
        .index
        .search(&req.query, CONTEXT_TOP_K)
        .map(|hits| hits.into_iter().map(|h| h.chunk.text).collect())
        .unwrap_or_default();

    let plan = state.test_cases.generate(&req.query, &context).await;
    Json(serde_json::json!({
        "test_cases": plan.test_cases,
        "context_used": [plan.provenance.marker()],
    }))
}

#[derive(serde::Deserialize)]
struct ScriptRequest {
    test_case_json: serde_json::Value,
    html_content: String,
}

/// POST /generate-selenium-script/ – script text or the fallback template.
async fn generate_selenium_script(
    State(state): State<AppState>,
    Json(req): Json<ScriptRequest>,
) -> Json<serde_json::Value> {
    let result = state
        .scripts
        .generate(&req.test_case_json, &req.html_content)
        .await;
    tracing::info!(
        target: "harborqa::gateway",
        provenance = result.provenance.marker(),
        "script generation completed"
    );
    Json(serde_json::json!({ "script": result.script }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use harborqa_core::{FALLBACK_MARKER, LIVE_MARKER};
    use tower::ServiceExt;

    struct FailingModel;

    #[async_trait::async_trait]
    impl TextModel for FailingModel {
        async fn generate(&self, _prompt: &str) -> Option<String> {
            None
        }
    }

    struct FixedModel(&'static str);

    #[async_trait::async_trait]
    impl TextModel for FixedModel {
        async fn generate(&self, _prompt: &str) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn test_config() -> AppConfig {
        AppConfig {
            app_name: "Test Gateway".to_string(),
            port: 8000,
            storage_path: "./data".to_string(),
            llm_mode: "mock".to_string(),
            model_url: "http://localhost/unused".to_string(),
            api_key: String::new(),
            request_timeout_secs: 10,
            chunk_size: 50,
            chunk_overlap: 10,
        }
    }

    fn test_app(model: Arc<dyn TextModel>, dir: &std::path::Path) -> Router {
        let config = Arc::new(test_config());
        let index = Arc::new(ChunkIndex::open_path(dir.join("index")).unwrap());
        let pipeline = Arc::new(IngestionPipeline::new(
            Arc::clone(&index),
            config.chunk_policy(),
        ));
        let fallback = Arc::new(FallbackCatalog::builtin());
        build_app(AppState {
            config,
            index,
            pipeline,
            test_cases: Arc::new(TestCaseAgent::new(Arc::clone(&model), Arc::clone(&fallback))),
            scripts: Arc::new(ScriptAgent::new(model, fallback)),
        })
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    }

    fn multipart_request(uri: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let boundary = "X-HARBORQA-TEST-BOUNDARY";
        let mut body: Vec<u8> = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                boundary, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_running() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(FailingModel), dir.path());
        let res = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("Circuit Breaker Enabled"));
    }

    #[tokio::test]
    async fn discount_query_with_model_failure_serves_full_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(FailingModel), dir.path());
        let res = app
            .oneshot(json_request(
                "/generate-test-cases/",
                serde_json::json!({
                    "query": "Generate positive and negative test cases for the discount code feature"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        let cases = json["test_cases"].as_array().unwrap();
        let ids: Vec<&str> = cases.iter().map(|c| c["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["TC-001", "TC-002", "TC-003"]);
        assert_eq!(
            json["context_used"],
            serde_json::json!([FALLBACK_MARKER])
        );
    }

    #[tokio::test]
    async fn live_model_output_is_returned_verbatim() {
        let output = "```json\n[{\"id\": \"TC-042\", \"title\": \"Live case\", \
                      \"description\": \"From the model.\", \"steps\": [\"one\"], \
                      \"expected_result\": \"works\"}]\n```";
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(FixedModel(output)), dir.path());
        let res = app
            .oneshot(json_request(
                "/generate-test-cases/",
                serde_json::json!({ "query": "checkout" }),
            ))
            .await
            .unwrap();
        let json = body_json(res).await;
        assert_eq!(json["test_cases"][0]["id"], "TC-042");
        assert_eq!(json["context_used"], serde_json::json!([LIVE_MARKER]));
    }

    #[tokio::test]
    async fn malformed_live_output_falls_back_like_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(FixedModel("[{\"id\": \"trunca")), dir.path());
        let res = app
            .oneshot(json_request(
                "/generate-test-cases/",
                serde_json::json!({ "query": "checkout" }),
            ))
            .await
            .unwrap();
        let json = body_json(res).await;
        assert_eq!(json["test_cases"].as_array().unwrap().len(), 3);
        assert_eq!(
            json["context_used"],
            serde_json::json!([FALLBACK_MARKER])
        );
    }

    #[tokio::test]
    async fn script_fallback_on_model_failure() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(FailingModel), dir.path());
        let res = app
            .oneshot(json_request(
                "/generate-selenium-script/",
                serde_json::json!({
                    "test_case_json": { "id": "TC-001" },
                    "html_content": "<html></html>"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(
            json["script"].as_str().unwrap(),
            FallbackCatalog::builtin().script
        );
    }

    #[tokio::test]
    async fn upload_of_undecodable_bytes_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(FailingModel), dir.path());
        let res = app
            .oneshot(multipart_request(
                "/upload-documents/",
                "binary.bin",
                &[0xff, 0xfe, 0x00, 0x80],
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["status"], "success");
        assert!(json["message"].as_str().unwrap().contains("Fallback Mode"));
    }

    #[tokio::test]
    async fn upload_indexes_text_documents() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(FailingModel), dir.path());
        let content = "The SAVE15 discount code applies 15 percent off the cart total. "
            .repeat(4);
        let res = app
            .clone()
            .oneshot(multipart_request(
                "/upload-documents/",
                "requirements.md",
                content.as_bytes(),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["status"], "success");
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("Processed 1 documents"));

        let status = app
            .oneshot(
                Request::builder()
                    .uri("/index-status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status_json = body_json(status).await;
        assert_eq!(status_json["status"], "ok");
        assert!(status_json["chunks"].as_u64().unwrap() > 1);
    }

    #[tokio::test]
    async fn malformed_request_body_is_a_client_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(FailingModel), dir.path());
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/generate-test-cases/")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"not_query\": 1}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(res.status().is_client_error());
    }
}
