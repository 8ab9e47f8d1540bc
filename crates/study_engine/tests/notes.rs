use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use study_core::ArtifactId;
use study_engine::{ApiClient, ApiGenerationClient, EngineSettings, FailureKind, NoteSummary};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> Arc<ApiClient> {
    let api = ApiClient::new(
        EngineSettings::with_base_url(format!("{}/api", server.uri())),
        Some("t0k3n".into()),
        Arc::new(|| {}),
    )
    .expect("client");
    Arc::new(api)
}

async fn mount_note(server: &MockServer, id: u64, content: &str, file_type: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/notes/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "title": format!("note-{id}"),
            "content": content,
            "category": "biology",
            "file_type": file_type,
            "created_at": "2024-06-01T09:30:00"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn library_lists_notes_in_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(header("authorization", "Bearer t0k3n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 4, "title": "cells.pdf", "category": "biology",
             "created_at": "2024-06-01T09:30:00", "file_type": "pdf"},
            {"id": 2, "title": "board.png", "category": null,
             "created_at": "2024-05-28T17:02:11", "file_type": "png"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let notes = api_for(&server).notes().await.unwrap();
    assert_eq!(
        notes,
        vec![
            NoteSummary {
                id: 4,
                title: "cells.pdf".into(),
                category: Some("biology".into()),
                created_at: "2024-06-01T09:30:00".into(),
                file_type: Some("pdf".into()),
            },
            NoteSummary {
                id: 2,
                title: "board.png".into(),
                category: None,
                created_at: "2024-05-28T17:02:11".into(),
                file_type: Some("png".into()),
            },
        ]
    );
}

#[tokio::test]
async fn empty_library_is_an_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(api_for(&server).notes().await.unwrap().is_empty());
}

#[tokio::test]
async fn stored_document_note_is_enhanced_as_text() {
    let server = MockServer::start().await;
    mount_note(&server, 4, "Mitochondria make ATP", "pdf").await;
    Mock::given(method("POST"))
        .and(path("/api/enhance-notes"))
        .and(body_json(json!({"content": "Mitochondria make ATP", "is_image": false})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"enhanced_content": "# Mitochondria", "save_id": 30})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = ApiGenerationClient::new(api_for(&server))
        .enhance_note(4)
        .await
        .unwrap();
    assert_eq!(result.content, "# Mitochondria");
    assert_eq!(result.artifact_id, Some(ArtifactId(30)));
}

#[tokio::test]
async fn stored_image_note_is_flagged_as_image() {
    let server = MockServer::start().await;
    mount_note(&server, 2, "E = mc^2 (whiteboard)", "PNG").await;
    Mock::given(method("POST"))
        .and(path("/api/enhance-notes"))
        .and(body_json(json!({"content": "E = mc^2 (whiteboard)", "is_image": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"enhanced_content": "# Energy"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = ApiGenerationClient::new(api_for(&server))
        .enhance_note(2)
        .await
        .unwrap();
    assert_eq!(result.content, "# Energy");
    assert_eq!(result.artifact_id, None);
}

#[tokio::test]
async fn note_without_content_is_not_sent() {
    let server = MockServer::start().await;
    mount_note(&server, 8, "  \n", "docx").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = ApiGenerationClient::new(api_for(&server))
        .enhance_note(8)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Validation);
}

#[tokio::test]
async fn missing_note_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = ApiGenerationClient::new(api_for(&server))
        .enhance_note(99)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}
