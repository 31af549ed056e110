//! REST operations against a local mock server.
//!
//! These verify URLs, headers, wire bodies and error mapping without an API key.

mod common;

use common::{TEST_API_KEY, mock_client};
use futures_util::StreamExt;
use genai_net::{
    CachedContentUpdate, Content, CountTokensRequest, CreateCachedContentRequest,
    EmbedContentRequest, FileState, GenaiError, GenerateContentRequest, TaskType,
};
use serde_json::json;
use wiremock::matchers::{
    body_json, body_partial_json, body_string, header, method, path, query_param,
    query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2, "totalTokenCount": 6}
    })
}

// =============================================================================
// Models
// =============================================================================

#[tokio::test]
async fn test_generate_content_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", TEST_API_KEY))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "Hi"}], "role": "user"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Hello!")))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let request = GenerateContentRequest::new("gemini-2.0-flash", vec![Content::user("Hi")]);
    let response = client.generate_content(&request).await.unwrap();

    assert_eq!(response.text().as_deref(), Some("Hello!"));
    assert_eq!(
        response.usage_metadata.unwrap().total_token_count,
        Some(6)
    );
}

#[tokio::test]
async fn test_generate_content_omits_unset_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let request =
        GenerateContentRequest::new("models/gemini-2.0-flash", vec![Content::user("Hi")]);
    client.generate_content(&request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body.get("generationConfig").is_none(), "unset fields are omitted");
    assert!(body.get("tools").is_none());
}

#[tokio::test]
async fn test_stream_generate_content() {
    let server = MockServer::start().await;

    let sse = format!(
        "data: {}\r\n\r\ndata: {}\r\n\r\n",
        json!({"candidates": [{"content": {"parts": [{"text": "Hel"}], "role": "model"}}]}),
        json!({"candidates": [{"content": {"parts": [{"text": "lo"}], "role": "model"}, "finishReason": "STOP"}]})
    );

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:streamGenerateContent"))
        .and(query_param("alt", "sse"))
        .and(header("x-goog-api-key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let request = GenerateContentRequest::new("gemini-2.0-flash", vec![Content::user("Hi")]);

    let chunks: Vec<_> = client.stream_generate_content(request).collect().await;
    assert_eq!(chunks.len(), 2);
    let text: String = chunks
        .into_iter()
        .map(|c| c.unwrap().text().unwrap_or_default())
        .collect();
    assert_eq!(text, "Hello");
}

#[tokio::test]
async fn test_stream_generate_content_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:streamGenerateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "Bad request", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let request = GenerateContentRequest::new("gemini-2.0-flash", vec![Content::user("Hi")]);

    let chunks: Vec<_> = client.stream_generate_content(request).collect().await;
    assert_eq!(chunks.len(), 1);
    assert!(matches!(
        chunks[0],
        Err(GenaiError::Api {
            status_code: 400,
            ..
        })
    ));
}

#[tokio::test]
async fn test_count_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:countTokens"))
        .and(body_json(json!({
            "contents": [{"parts": [{"text": "How many tokens?"}], "role": "user"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalTokens": 5})))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let request =
        CountTokensRequest::new("gemini-2.0-flash", vec![Content::user("How many tokens?")]);
    let response = client.count_tokens(&request).await.unwrap();
    assert_eq!(response.total_tokens, 5);
}

#[tokio::test]
async fn test_get_model_qualifies_bare_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models/gemini-2.0-flash-live-001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "models/gemini-2.0-flash-live-001",
            "version": "001",
            "supportedGenerationMethods": ["bidiGenerateContent"]
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let model = client.get_model("gemini-2.0-flash-live-001").await.unwrap();
    assert!(model.supports("bidiGenerateContent"));
}

#[tokio::test]
async fn test_list_all_models_follows_page_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "models/a"}, {"name": "models/b"}],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "models/c"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let names: Vec<String> = client
        .list_all_models()
        .map(|m| m.unwrap().name)
        .collect()
        .await;
    assert_eq!(names, vec!["models/a", "models/b", "models/c"]);
}

// =============================================================================
// Embeddings
// =============================================================================

#[tokio::test]
async fn test_embed_single_content_uses_embed_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-embedding-exp:embedContent"))
        .and(body_json(json!({
            "content": {"parts": [{"text": "hello"}]},
            "taskType": "RETRIEVAL_QUERY"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embedding": {"values": [0.1, 0.2]}})),
        )
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let request = EmbedContentRequest::new("gemini-embedding-exp", vec![Content::text("hello")])
        .with_task_type(TaskType::RetrievalQuery);
    let response = client.embed_content(&request).await.unwrap();

    assert_eq!(response.embeddings.len(), 1);
    assert_eq!(response.embeddings[0].values, vec![0.1, 0.2]);
}

#[tokio::test]
async fn test_embed_many_contents_uses_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(
            "/v1beta/models/gemini-embedding-exp:batchEmbedContents",
        ))
        .and(body_json(json!({
            "requests": [
                {"model": "models/gemini-embedding-exp", "content": {"parts": [{"text": "a"}]}},
                {"model": "models/gemini-embedding-exp", "content": {"parts": [{"text": "b"}]}}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [{"values": [1.0]}, {"values": [2.0]}]
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let request = EmbedContentRequest::new(
        "gemini-embedding-exp",
        vec![Content::text("a"), Content::text("b")],
    );
    let response = client.embed_content(&request).await.unwrap();

    let values: Vec<f32> = response.embeddings.iter().map(|e| e.values[0]).collect();
    assert_eq!(values, vec![1.0, 2.0]);
}

#[tokio::test]
async fn test_embed_empty_is_invalid_input() {
    let server = MockServer::start().await;
    let client = mock_client(&server.uri());

    let request = EmbedContentRequest::new("gemini-embedding-exp", vec![]);
    let err = client.embed_content(&request).await.unwrap_err();
    assert!(matches!(err, GenaiError::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_api_error_envelope_is_parsed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-goog-request-id", "req-123")
                .set_body_json(json!({
                    "error": {
                        "code": 429,
                        "message": "Resource has been exhausted",
                        "status": "RESOURCE_EXHAUSTED"
                    }
                })),
        )
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let request = GenerateContentRequest::new("gemini-2.0-flash", vec![Content::user("Hi")]);
    let err = client.generate_content(&request).await.unwrap_err();

    assert!(err.is_retryable());
    match err {
        GenaiError::Api {
            status_code,
            message,
            request_id,
        } => {
            assert_eq!(status_code, 429);
            assert_eq!(message, "Resource has been exhausted (RESOURCE_EXHAUSTED)");
            assert_eq!(request_id.as_deref(), Some("req-123"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_kept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let err = client.get_file("files/abc").await.unwrap_err();
    match err {
        GenaiError::Api {
            status_code,
            ref message,
            ..
        } => {
            assert_eq!(status_code, 503);
            assert!(message.contains("upstream unavailable"));
            assert!(err.is_retryable());
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:countTokens"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let request = CountTokensRequest::new("gemini-2.0-flash", vec![Content::user("x")]);
    let err = client.count_tokens(&request).await.unwrap_err();
    assert!(matches!(err, GenaiError::MalformedResponse(_)));
    assert!(!err.is_retryable());
}

// =============================================================================
// Files
// =============================================================================

fn uploaded_file_json(name: &str, display_name: &str, mime_type: &str) -> serde_json::Value {
    json!({
        "file": {
            "name": name,
            "displayName": display_name,
            "mimeType": mime_type,
            "sizeBytes": "12",
            "uri": format!("https://generativelanguage.googleapis.com/v1beta/{name}"),
            "state": "ACTIVE",
            "source": "UPLOADED"
        }
    })
}

async fn mount_upload_start(server: &MockServer, mime_type: &str, display_name: &str) {
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .and(header("x-goog-api-key", TEST_API_KEY))
        .and(header("x-goog-upload-protocol", "resumable"))
        .and(header("x-goog-upload-command", "start"))
        .and(header("x-goog-upload-header-content-type", mime_type))
        .and(body_json(json!({"file": {"displayName": display_name}})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-url", format!("{}/upload-session/1", server.uri())),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_upload_file_from_disk() {
    let server = MockServer::start().await;
    mount_upload_start(&server, "text/plain", "notes.txt").await;

    Mock::given(method("POST"))
        .and(path("/upload-session/1"))
        .and(header("x-goog-upload-command", "upload, finalize"))
        .and(header("x-goog-upload-offset", "0"))
        .and(body_string("hello upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-status", "final")
                .set_body_json(uploaded_file_json("files/abc", "notes.txt", "text/plain")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("notes.txt");
    std::fs::write(&file_path, "hello upload").unwrap();

    let client = mock_client(&server.uri());
    let file = client.upload_file(&file_path, None, None).await.unwrap();

    assert_eq!(file.name, "files/abc");
    assert_eq!(file.display_name.as_deref(), Some("notes.txt"));
    assert!(file.is_active());
}

#[tokio::test]
async fn test_upload_blob_decodes_base64() {
    let server = MockServer::start().await;
    mount_upload_start(&server, "image/png", "pixel").await;

    let png = genai_net::Blob {
        mime_type: "image/png".to_string(),
        data: common::TINY_RED_PNG_BASE64.to_string(),
    };
    let raw = png.decode().unwrap();

    Mock::given(method("POST"))
        .and(path("/upload-session/1"))
        .and(wiremock::matchers::body_bytes(raw))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-status", "final")
                .set_body_json(uploaded_file_json("files/png", "pixel", "image/png")),
        )
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let file = client.upload_blob(&png, Some("pixel")).await.unwrap();
    assert_eq!(file.mime_type, "image/png");
}

#[tokio::test]
async fn test_upload_non_final_status_is_malformed() {
    let server = MockServer::start().await;
    mount_upload_start(&server, "text/plain", "a.txt").await;

    Mock::given(method("POST"))
        .and(path("/upload-session/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-status", "active")
                .set_body_json(uploaded_file_json("files/a", "a.txt", "text/plain")),
        )
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let err = client
        .upload_file_bytes(b"abc".to_vec(), "text/plain", Some("a.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenaiError::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn test_upload_missing_url_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let err = client
        .upload_file_bytes(b"abc".to_vec(), "text/plain", None)
        .await
        .unwrap_err();
    assert!(matches!(err, GenaiError::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn test_upload_empty_file_is_rejected() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("empty.txt");
    std::fs::write(&file_path, "").unwrap();

    let client = mock_client(&server.uri());
    let err = client.upload_file(&file_path, None, None).await.unwrap_err();
    assert!(matches!(err, GenaiError::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_unknown_extension_needs_mime_type() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("data.unknownext");
    std::fs::write(&file_path, "x").unwrap();

    let client = mock_client(&server.uri());
    let err = client.upload_file(&file_path, None, None).await.unwrap_err();
    assert!(matches!(err, GenaiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_file_get_list_delete() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "files/abc",
            "mimeType": "video/mp4",
            "uri": "https://example/files/abc",
            "state": "PROCESSING"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files"))
        .and(query_param("pageSize", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"name": "files/abc", "mimeType": "video/mp4", "uri": "u"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());

    let file = client.get_file("files/abc").await.unwrap();
    assert_eq!(file.state, Some(FileState::Processing));

    let page = client.list_files(Some(10), None).await.unwrap();
    assert_eq!(page.files.len(), 1);
    assert!(page.next_page_token.is_none());

    client.delete_file("files/abc").await.unwrap();
}

// =============================================================================
// Caches
// =============================================================================

#[tokio::test]
async fn test_create_cached_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/cachedContents"))
        .and(body_partial_json(json!({
            "model": "models/gemini-1.5-flash-001",
            "ttl": "300s",
            "systemInstruction": {"parts": [{"text": "Be brief."}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "cachedContents/xyz",
            "model": "models/gemini-1.5-flash-001",
            "expireTime": "2026-10-16T12:05:00Z",
            "usageMetadata": {"totalTokenCount": 40000}
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let request = CreateCachedContentRequest::new(
        "gemini-1.5-flash-001",
        vec![Content::user("A long document...")],
    )
    .with_ttl("300s")
    .with_system_instruction(Content::text("Be brief."));

    let cache = client.create_cached_content(&request).await.unwrap();
    assert_eq!(cache.name.as_deref(), Some("cachedContents/xyz"));
    assert_eq!(cache.usage_metadata.unwrap().total_token_count, Some(40000));
}

#[tokio::test]
async fn test_update_and_delete_cached_content() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1beta/cachedContents/xyz"))
        .and(query_param("updateMask", "ttl"))
        .and(body_json(json!({"ttl": "600s"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "cachedContents/xyz",
            "model": "models/gemini-1.5-flash-001"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1beta/cachedContents/xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let update = CachedContentUpdate {
        ttl: Some("600s".to_string()),
        ..Default::default()
    };
    client
        .update_cached_content("cachedContents/xyz", &update, Some("ttl"))
        .await
        .unwrap();
    client
        .delete_cached_content("cachedContents/xyz")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_all_cached_contents_single_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/cachedContents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cachedContents": [
                {"name": "cachedContents/1", "model": "models/m"},
                {"name": "cachedContents/2", "model": "models/m"}
            ],
            "nextPageToken": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let caches: Vec<_> = client.list_all_cached_contents().collect().await;
    assert_eq!(caches.len(), 2);
    assert!(caches.iter().all(Result::is_ok));
}
