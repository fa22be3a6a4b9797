/// HTTP front end: upload form, diagnosis page, chatbot API and catalog API.
///
/// All state is read-only after startup, so handlers share it through an `Arc`
/// without locking. Upload failures render as `Error: <message>` pages.
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use plant_common::api::{ChatReply, ChatRequest, DiseaseListResponse, DiseaseSummary};
use plant_common::catalog::DiseaseCatalog;
use plant_common::diagnosis::Diagnoser;
use plant_common::faq::FaqMatcher;
use plant_common::model::DiseaseRecord;

use crate::error::AppError;
use crate::render::{self, ResultView};
use crate::storage::{UploadStore, PUBLIC_PREFIX};

/// Shared, read-only request state.
pub struct AppState {
    pub catalog: Arc<DiseaseCatalog>,
    pub faq: Arc<FaqMatcher>,
    pub diagnoser: Arc<Diagnoser>,
    pub store: UploadStore,
    pub start_time: Instant,
}

type AppStateArc = Arc<AppState>;

pub fn router(state: AppStateArc, max_upload_bytes: usize) -> Router {
    let uploads = ServeDir::new(state.store.dir());

    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict))
        .route("/chat", post(chat))
        .route("/api/diseases", get(list_diseases))
        .route("/api/diseases/{class_id}", get(get_disease))
        .route("/health", get(health))
        .nest_service(PUBLIC_PREFIX, uploads)
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind the listener. `host` may be an IP address or a resolvable name such as "localhost".
pub async fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}

pub async fn run(
    state: AppState,
    host: &str,
    port: u16,
    max_upload_bytes: usize,
) -> anyhow::Result<()> {
    let app = router(Arc::new(state), max_upload_bytes);

    let listener = bind(host, port).await?;
    info!(listen_addr = %listener.local_addr()?, "web server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}

async fn home() -> Html<&'static str> {
    Html(render::index_page())
}

async fn predict(
    State(state): State<AppStateArc>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut location: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                image = Some((filename, bytes.to_vec()));
            }
            "location" => {
                location = Some(field.text().await?);
            }
            other => debug!(field = other, "ignoring multipart field"),
        }
    }

    let (filename, bytes) =
        image.ok_or_else(|| AppError::Upload("missing 'image' file field".to_string()))?;
    let stored = state.store.save(&filename, &bytes).await?;

    let diagnosis = state.diagnoser.diagnose(&bytes);
    info!(
        class_id = %diagnosis.record.class_id,
        source = ?diagnosis.source,
        "diagnosis rendered"
    );

    Ok(Html(render::result_page(&ResultView {
        diagnosis,
        location: location.as_deref(),
        image_url: &stored.url,
    })))
}

async fn chat(State(state): State<AppStateArc>, Json(req): Json<ChatRequest>) -> Json<ChatReply> {
    let message = req.message.unwrap_or_default();
    let reply = state.faq.reply(&message).to_string();
    Json(ChatReply { reply })
}

async fn list_diseases(State(state): State<AppStateArc>) -> Json<DiseaseListResponse> {
    let diseases = state
        .catalog
        .list()
        .iter()
        .map(|r| DiseaseSummary::from_record(r, state.catalog.is_healthy(&r.class_id)))
        .collect();
    Json(DiseaseListResponse { diseases })
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

async fn get_disease(
    State(state): State<AppStateArc>,
    Path(class_id): Path<String>,
) -> Result<Json<DiseaseRecord>, (StatusCode, Json<ErrorBody>)> {
    state
        .catalog
        .lookup(&class_id)
        .map(|record| Json(record.clone()))
        .map_err(|e| {
            debug!(class_id = %class_id, "catalog miss");
            (StatusCode::NOT_FOUND, Json(ErrorBody { error: e.to_string() }))
        })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    diseases: usize,
    faq_entries: usize,
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        diseases: state.catalog.len(),
        faq_entries: state.faq.len(),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request};
    use plant_common::classifier::OfflineClassifier;
    use plant_common::faq::{EMPTY_INPUT_PROMPT, FALLBACK_REPLY};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "plantdoctorboundary";

    async fn test_app(dir: &std::path::Path) -> Router {
        test_app_with_limit(dir, 1024 * 1024).await
    }

    async fn test_app_with_limit(dir: &std::path::Path, max_upload_bytes: usize) -> Router {
        let catalog = Arc::new(DiseaseCatalog::builtin().unwrap());
        let state = AppState {
            faq: Arc::new(FaqMatcher::builtin().unwrap()),
            diagnoser: Arc::new(Diagnoser::new(Arc::clone(&catalog), Arc::new(OfflineClassifier))),
            catalog,
            store: UploadStore::open(dir).await.unwrap(),
            start_time: Instant::now(),
        };
        router(Arc::new(state), max_upload_bytes)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn post_chat(app: Router, body: &str) -> String {
        let response = app
            .oneshot(
                Request::post("/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        json["reply"].as_str().unwrap().to_string()
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                         Content-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn predict_request(body: Vec<u8>) -> Request<Body> {
        Request::post("/predict")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn chat_replies_from_faq() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path()).await;

        let reply = post_chat(app.clone(), r#"{"message": "HOW DO I UPLOAD A PICTURE OF MY PLANT"}"#).await;
        assert!(reply.starts_with("You upload an image"));

        assert_eq!(post_chat(app.clone(), r#"{"message": ""}"#).await, EMPTY_INPUT_PROMPT);
        assert_eq!(post_chat(app.clone(), r#"{}"#).await, EMPTY_INPUT_PROMPT);
        assert_eq!(post_chat(app.clone(), r#"{"message": null}"#).await, EMPTY_INPUT_PROMPT);
        assert_eq!(post_chat(app, r#"{"message": "asdkjfh garbage text"}"#).await, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn disease_api_lookup_and_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path()).await;

        let response = app
            .clone()
            .oneshot(Request::get("/api/diseases/Potato_Late_blight").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let record: DiseaseRecord = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(record.class_id, "Potato_Late_blight");

        let response = app
            .clone()
            .oneshot(Request::get("/api/diseases/__unknown__").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"], "disease class not found: __unknown__");

        let response = app
            .oneshot(Request::get("/api/diseases").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let list: DiseaseListResponse = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(list.diseases.len(), 38);
        assert_eq!(list.diseases[0].class_id, "Apple_Apple_scab");
        assert!(list.diseases.iter().filter(|d| d.healthy).count() == 12);
    }

    #[tokio::test]
    async fn predict_saves_upload_and_renders_placeholder() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path()).await;

        let body = multipart_body(&[
            ("image", Some("tomato leaf.png"), b"\x89PNG fake".as_slice()),
            ("location", None, b"Nairobi".as_slice()),
        ]);
        let response = app.clone().oneshot(predict_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("AI Analysis (Maintenance)"));
        assert!(html.contains("Location: Nairobi"));
        assert!(html.contains("/static/uploads/tomato_leaf.png"));
        assert_eq!(
            std::fs::read(tmp.path().join("tomato_leaf.png")).unwrap(),
            b"\x89PNG fake"
        );

        let response = app
            .oneshot(Request::get("/static/uploads/tomato_leaf.png").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn predict_without_image_is_bad_request() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path()).await;

        let body = multipart_body(&[("location", None, b"Field 7".as_slice())]);
        let response = app.oneshot(predict_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.starts_with("Error: "));
    }

    #[tokio::test]
    async fn home_and_health() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path()).await;

        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Plant disease detection"));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["diseases"], 38);
        assert_eq!(json["faq_entries"], 33);
    }

    #[tokio::test]
    async fn predict_over_size_limit_is_payload_too_large() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app_with_limit(tmp.path(), 1024 * 1024).await;

        let image = vec![0u8; 2 * 1024 * 1024];
        let body = multipart_body(&[("image", Some("huge.png"), image.as_slice())]);
        let response = app.oneshot(predict_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!tmp.path().join("huge.png").exists());
    }

    #[tokio::test]
    async fn predict_storage_failure_is_server_error() {
        let tmp = tempfile::tempdir().unwrap();
        let upload_dir = tmp.path().join("uploads");
        let app = test_app(&upload_dir).await;
        std::fs::remove_dir_all(&upload_dir).unwrap();

        let body = multipart_body(&[("image", Some("leaf.png"), b"\x89PNG".as_slice())]);
        let response = app.oneshot(predict_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.starts_with("Error: storage error"));
    }

    #[tokio::test]
    async fn bind_resolves_host_names() {
        let listener = bind("localhost", 0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }
}
