use chatdock_core::{AudioClip, ReplyOutcome, Role};
use chatdock_engine::{BackendSettings, ChatBackend, FailureKind, ReqwestBackend};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    ReqwestBackend::new(BackendSettings {
        base_url: format!("{}/", server.uri()),
        api_key: "secret".to_string(),
        ..BackendSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn send_posts_message_with_page_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/send"))
        .and(header("X-API-Key", "secret"))
        .and(body_json(serde_json::json!({
            "message": "What are your hours?",
            "link": "https://shop.example/",
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "reply": "9-5"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = backend_for(&server)
        .send("What are your hours?", "https://shop.example/")
        .await
        .expect("send ok");

    assert!(response.ok);
    assert_eq!(response.reply.as_deref(), Some("9-5"));
    assert!(!response.link && !response.button);
}

#[tokio::test]
async fn send_rejection_is_not_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/send"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ok": false, "error": "Empty message."})),
        )
        .mount(&server)
        .await;

    let response = backend_for(&server).send("x", "https://shop.example/").await.unwrap();
    assert_eq!(response.into_outcome(), ReplyOutcome::Rejected);
}

#[tokio::test]
async fn history_parses_messages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat/history"))
        .and(header("X-API-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "messages": [
                {"role": "user", "text": "hi"},
                {"role": "assistant", "text": "https://site.com/contact", "link": true},
            ],
        })))
        .mount(&server)
        .await;

    let response = backend_for(&server).history().await.expect("history ok");

    assert!(response.ok);
    assert_eq!(response.messages.len(), 2);
    assert_eq!(response.messages[0].role, Role::User);
    assert!(response.messages[1].is_navigation);
    assert!(!response.messages[1].is_activation);
}

#[tokio::test]
async fn audio_upload_is_multipart_with_speech_requested() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/audio"))
        .and(query_param("tts", "true"))
        .and(query_param("voice", "alloy"))
        .and(header("X-API-Key", "secret"))
        .and(body_string_contains(r#"name="audio""#))
        .and(body_string_contains(r#"filename="voice.webm""#))
        .and(body_string_contains(r#"name="link""#))
        .and(body_string_contains("https://shop.example/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "transcript": "where is my cart",
            "reply": "Right here.",
            "reply_audio_b64": "c3BlZWNo",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clip = AudioClip::from_fragments(vec![b"abc".to_vec()], "audio/webm");
    let response = backend_for(&server)
        .upload_audio(&clip, "https://shop.example/cart")
        .await
        .expect("upload ok");

    assert_eq!(response.transcript.as_deref(), Some("where is my cart"));
    assert_eq!(response.reply_audio_b64.as_deref(), Some("c3BlZWNo"));
}

#[tokio::test]
async fn server_error_maps_to_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat/history"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = backend_for(&server).history().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn garbage_body_maps_to_malformed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat/history"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server).history().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedPayload);
}

#[tokio::test]
async fn unreachable_backend_maps_to_network() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let backend = ReqwestBackend::new(BackendSettings {
        base_url: format!("http://{addr}/"),
        api_key: "secret".to_string(),
        ..BackendSettings::default()
    })
    .expect("client");

    let err = backend.history().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
}

#[tokio::test]
async fn bad_base_url_is_reported() {
    let backend = ReqwestBackend::new(BackendSettings {
        base_url: "not a url".to_string(),
        ..BackendSettings::default()
    })
    .unwrap();

    let err = backend.history().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
