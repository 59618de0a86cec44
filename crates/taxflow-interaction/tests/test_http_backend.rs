use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use taxflow_core::{BackendCall, BackendError, TaxflowError};
use taxflow_core::backend::{CalculateTaxRequest, ChatRequest, TaxBackend, UploadDocument};
use taxflow_core::extraction::{ExtractedData, ReviewField};
use taxflow_core::review::ReviewForm;
use taxflow_core::session::{ChatMessage, MessageRole};
use taxflow_interaction::HttpTaxBackend;
use tokio::net::TcpListener;

/// Requests seen by the mock server: (path, body)
type Recorded = Arc<Mutex<Vec<(String, Value)>>>;

async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn mock_api(recorded: Recorded) -> Router {
    Router::new()
        .route("/api/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route(
            "/api/upload-pdf",
            post(
                |State(recorded): State<Recorded>, mut multipart: Multipart| async move {
                    let mut seen = Vec::new();
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        let name = field.name().unwrap_or_default().to_string();
                        let file_name = field.file_name().unwrap_or_default().to_string();
                        let bytes = field.bytes().await.unwrap();
                        seen.push(json!({"name": name, "file_name": file_name, "len": bytes.len()}));
                    }
                    recorded
                        .lock()
                        .unwrap()
                        .push(("/api/upload-pdf".to_string(), Value::Array(seen)));
                    Json(json!({
                        "session_id": "3f1c0d7e",
                        "extracted_data": {"gross_salary": 900000.0, "rent_paid": null, "tax_regime": "new"}
                    }))
                },
            ),
        )
        .route(
            "/api/session/:session_id/review",
            post(
                |State(recorded): State<Recorded>,
                 Path(session_id): Path<String>,
                 Json(body): Json<Value>| async move {
                    recorded
                        .lock()
                        .unwrap()
                        .push((format!("/api/session/{session_id}/review"), body));
                    Json(json!({"status": "success"}))
                },
            ),
        )
        .route(
            "/api/calculate-tax",
            post(
                |State(recorded): State<Recorded>, Json(body): Json<Value>| async move {
                    recorded
                        .lock()
                        .unwrap()
                        .push(("/api/calculate-tax".to_string(), body));
                    Json(json!({
                        "session_id": "3f1c0d7e",
                        "old_regime": {"regime": "old", "taxable_income": 850000.0, "total_tax": 88400.0,
                                       "deductions": 50000.0, "net_tax_payable": 88400.0},
                        "new_regime": {"regime": "new", "taxable_income": 850000.0, "total_tax": 39000.0,
                                       "deductions": 50000.0, "net_tax_payable": 39000.0}
                    }))
                },
            ),
        )
        .route(
            "/api/chat",
            post(
                |State(recorded): State<Recorded>, Json(body): Json<Value>| async move {
                    recorded.lock().unwrap().push(("/api/chat".to_string(), body));
                    Json(json!({
                        "gemini_message": "Would you like to know how to maximize your 80C deductions?",
                        "chat_history": [
                            {"role": "system", "content": "You are a helpful Indian tax advisor."},
                            {"role": "assistant", "content": "Would you like to know how to maximize your 80C deductions?"}
                        ]
                    }))
                },
            ),
        )
        .with_state(recorded)
}

#[tokio::test]
async fn test_upload_sends_pdf_field_and_decodes_session() {
    let recorded = Recorded::default();
    let base_url = spawn_server(mock_api(recorded.clone())).await;
    let backend = HttpTaxBackend::new(base_url);

    let response = backend
        .upload_document(&UploadDocument::new("form16.pdf", b"%PDF-1.4 test".to_vec()))
        .await
        .unwrap();

    assert_eq!(response.session_id, "3f1c0d7e");
    assert_eq!(
        response.extracted_data.prefill(ReviewField::GrossSalary),
        "900000"
    );

    let calls = recorded.lock().unwrap();
    assert_eq!(calls[0].0, "/api/upload-pdf");
    assert_eq!(calls[0].1[0]["name"], "pdf");
    assert_eq!(calls[0].1[0]["file_name"], "form16.pdf");
    assert_eq!(calls[0].1[0]["len"], 13);
}

#[tokio::test]
async fn test_review_then_calculate() {
    let recorded = Recorded::default();
    let base_url = spawn_server(mock_api(recorded.clone())).await;
    let backend = HttpTaxBackend::new(base_url);

    let data: ExtractedData =
        serde_json::from_value(json!({"gross_salary": 900000, "tax_regime": "new"})).unwrap();
    let submission = ReviewForm::from_extraction(&data).submission();

    backend.submit_review("3f1c0d7e", &submission).await.unwrap();
    let computation = backend
        .calculate_tax(&CalculateTaxRequest {
            session_id: "3f1c0d7e".to_string(),
            data: submission.clone(),
        })
        .await
        .unwrap();

    let comparison = computation.into_comparison().unwrap();
    assert_eq!(comparison.new_regime.total_tax, 39000.0);

    let calls = recorded.lock().unwrap();
    assert_eq!(calls[0].0, "/api/session/3f1c0d7e/review");
    assert_eq!(calls[0].1["gross_salary"], "900000");
    assert_eq!(calls[0].1["tax_regime"], "new");
    assert_eq!(calls[1].0, "/api/calculate-tax");
    assert_eq!(calls[1].1["session_id"], "3f1c0d7e");
    assert_eq!(calls[1].1["data"], calls[0].1);
}

#[tokio::test]
async fn test_chat_keeps_unrendered_roles() {
    let recorded = Recorded::default();
    let base_url = spawn_server(mock_api(recorded.clone())).await;
    let backend = HttpTaxBackend::new(base_url);

    let response = backend
        .chat(&ChatRequest::open("3f1c0d7e", ExtractedData::default()))
        .await
        .unwrap();

    assert_eq!(response.chat_history.len(), 2);
    assert_eq!(
        response.chat_history[0].role,
        MessageRole::Other("system".to_string())
    );
    assert_eq!(
        response.chat_history[1],
        ChatMessage::assistant("Would you like to know how to maximize your 80C deductions?")
    );

    let calls = recorded.lock().unwrap();
    assert!(calls[0].1.get("user_message").is_none());
    assert_eq!(calls[0].1["chat_history"], json!([]));
}

#[tokio::test]
async fn test_non_success_status_is_failure() {
    let router = Router::new().route(
        "/api/calculate-tax",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Supabase error") }),
    );
    let base_url = spawn_server(router).await;
    let backend = HttpTaxBackend::new(base_url);

    let err = backend
        .calculate_tax(&CalculateTaxRequest {
            session_id: "s".to_string(),
            data: Default::default(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::Status {
            status: 500,
            body: "Supabase error".to_string(),
        }
    );
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async { Json(json!({"unexpected": true})) }),
    );
    let base_url = spawn_server(router).await;
    let backend = HttpTaxBackend::new(base_url);

    let err = backend
        .chat(&ChatRequest::open("s", ExtractedData::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpTaxBackend::new(format!("http://{}", addr));
    let err = backend.health_check().await.unwrap_err();
    assert_eq!(err.failed_call(), Some(BackendCall::Health));
    assert_eq!(err.to_string(), "Backend health check failed.");
    assert!(matches!(
        err,
        TaxflowError::Remote {
            source: BackendError::Transport(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_health_check() {
    let base_url = spawn_server(mock_api(Recorded::default())).await;
    let status = HttpTaxBackend::new(base_url).health_check().await.unwrap();
    assert_eq!(status.status, "ok");
}
