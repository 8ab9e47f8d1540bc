use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use study_core::{ArtifactId, Domain, GenerationRequest, PendingInput};
use study_engine::{
    ApiClient, ApiGenerationClient, EngineSettings, FailureKind, GenerationClient,
};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, token: Option<&str>) -> (Arc<ApiClient>, Arc<AtomicUsize>) {
    let unauthorized = Arc::new(AtomicUsize::new(0));
    let counter = unauthorized.clone();
    let api = ApiClient::new(
        EngineSettings::with_base_url(format!("{}/api", server.uri())),
        token.map(str::to_string),
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .expect("client");
    (Arc::new(api), unauthorized)
}

fn request(domain: Domain, input: PendingInput) -> GenerationRequest {
    GenerationRequest { domain, input }
}

#[tokio::test]
async fn text_goes_to_domain_endpoint_with_domain_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-problems"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({"problems": "Solve 2x + 3 = 7", "is_image": false})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"analysis": "x = 2", "save_id": 17})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (api, _) = client_for(&server, Some("secret"));
    let client = ApiGenerationClient::new(api);
    let result = client
        .generate(&request(
            Domain::Problem,
            PendingInput::Text("Solve 2x + 3 = 7".into()),
        ))
        .await
        .expect("generate");
    assert_eq!(result.content, "x = 2");
    assert_eq!(result.artifact_id, Some(ArtifactId(17)));
}

#[tokio::test]
async fn inline_image_is_sent_as_data_uri() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/english-study"))
        .and(body_json(json!({"text": "data:image/png;base64,iVBORw==", "is_image": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"study_material": "# Words"})))
        .expect(1)
        .mount(&server)
        .await;

    let (api, _) = client_for(&server, None);
    let result = ApiGenerationClient::new(api)
        .generate(&request(
            Domain::English,
            PendingInput::InlineImage {
                data_uri: "data:image/png;base64,iVBORw==".into(),
                filename: "page.png".into(),
            },
        ))
        .await
        .expect("generate");
    assert_eq!(result.content, "# Words");
    assert_eq!(result.artifact_id, None);
}

#[tokio::test]
async fn blank_text_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (api, _) = client_for(&server, None);
    let client = ApiGenerationClient::new(api);
    for domain in Domain::ALL {
        let err = client
            .generate(&request(domain, PendingInput::Text("  \n ".into())))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Validation);
    }

    let empty_image = PendingInput::InlineImage {
        data_uri: "data:image/png;base64,".into(),
        filename: "blank.png".into(),
    };
    let err = client
        .generate(&request(Domain::Problem, empty_image))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Validation);
}

#[tokio::test]
async fn server_error_is_propagated_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/enhance-notes"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (api, _) = client_for(&server, None);
    let err = ApiGenerationClient::new(api)
        .generate(&request(Domain::Notes, PendingInput::Text("cells".into())))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn unauthorized_drops_token_and_runs_hook() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/enhance-notes"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (api, hook_calls) = client_for(&server, Some("expired"));
    let client = ApiGenerationClient::new(api.clone());
    let err = client
        .generate(&request(Domain::Notes, PendingInput::Text("cells".into())))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Unauthorized);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
    assert!(!api.has_token());
}

#[tokio::test]
async fn english_document_is_uploaded_directly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/english-study-upload"))
        .and(body_string_contains("name=\"file\"; filename=\"essay.docx\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"study_material": "## Vocabulary", "save_id": 5})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (api, _) = client_for(&server, None);
    let result = ApiGenerationClient::new(api)
        .generate(&request(
            Domain::English,
            PendingInput::DocumentUpload {
                bytes: b"PK\x03\x04".to_vec(),
                filename: "essay.docx".into(),
                mime_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                    .into(),
            },
        ))
        .await
        .expect("generate");
    assert_eq!(result.content, "## Vocabulary");
    assert_eq!(result.artifact_id, Some(ArtifactId(5)));
}

#[tokio::test]
async fn notes_document_goes_through_upload_then_enhance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("name=\"category\""))
        .and(body_string_contains("未分类"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "ok",
            "note_id": 8,
            "is_image": false,
            "file_type": "pdf"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notes/8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 8,
            "title": "lecture.pdf",
            "content": "Photosynthesis converts light",
            "category": "未分类",
            "file_type": "pdf",
            "created_at": "2024-06-01T10:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/enhance-notes"))
        .and(body_json(json!({"content": "Photosynthesis converts light", "is_image": false})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"enhanced_content": "# Photosynthesis", "save_id": 21})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (api, _) = client_for(&server, None);
    let result = ApiGenerationClient::new(api)
        .generate(&request(
            Domain::Notes,
            PendingInput::DocumentUpload {
                bytes: b"%PDF-1.4".to_vec(),
                filename: "lecture.pdf".into(),
                mime_type: "application/pdf".into(),
            },
        ))
        .await
        .expect("generate");
    assert_eq!(result.content, "# Photosynthesis");
    assert_eq!(result.artifact_id, Some(ArtifactId(21)));
}

#[tokio::test]
async fn problem_domain_refuses_documents_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (api, _) = client_for(&server, None);
    let err = ApiGenerationClient::new(api)
        .generate(&request(
            Domain::Problem,
            PendingInput::DocumentUpload {
                bytes: b"%PDF".to_vec(),
                filename: "essay.pdf".into(),
                mime_type: "application/pdf".into(),
            },
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::UnsupportedFormat);
    assert_eq!(err.message, "essay.pdf");
}

#[tokio::test]
async fn vocabulary_choice_is_posted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/vocabulary"))
        .and(body_json(json!({"word": "diligently", "known": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "saved"})))
        .expect(1)
        .mount(&server)
        .await;

    let (api, _) = client_for(&server, None);
    ApiGenerationClient::new(api)
        .record_vocabulary("diligently", false)
        .await
        .expect("record");
}

#[tokio::test]
async fn undecodable_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/english-study"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let (api, _) = client_for(&server, None);
    let err = ApiGenerationClient::new(api)
        .generate(&request(Domain::English, PendingInput::Text("text".into())))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}
