use imagegen::{
    GenerationRequest, ImageGenError, ImageProvider, OpenAiImageProvider, Secret,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Raw request as seen by the fake server.
struct Captured {
    head: String,
    body: String,
}

/// Serves exactly one HTTP exchange on a local port with a canned reply.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body");
            buf.extend_from_slice(&chunk[..n]);
        }
        let request_body = String::from_utf8_lossy(&buf[header_end..]).to_string();

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        Captured {
            head,
            body: request_body,
        }
    });

    (base_url, handle)
}

fn provider(base_url: &str) -> OpenAiImageProvider {
    OpenAiImageProvider::builder()
        .api_key(Secret::new("sk-test-key").unwrap())
        .base_url(base_url)
        .build()
        .unwrap()
}

#[tokio::test]
async fn posts_request_and_parses_records() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"created": 1, "data": [{"b64_json": "aGVsbG8="}]}"#,
    )
    .await;

    let response = provider(&base_url)
        .generate(&GenerationRequest::default())
        .await
        .unwrap();
    assert_eq!(response.data.len(), 1);
    assert_eq!(response.data[0].b64_json.as_deref(), Some("aGVsbG8="));

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("POST /v1/images/generations HTTP/1.1"));
    assert!(captured
        .head
        .to_ascii_lowercase()
        .contains("authorization: bearer sk-test-key"));

    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(body["model"], "gpt-image-1");
    assert_eq!(body["n"], 1);
    assert_eq!(body["size"], "1024x1024");
    assert!(body["prompt"].as_str().unwrap().contains("baby otter"));
    assert!(body.get("response_format").is_none());
}

#[tokio::test]
async fn unauthorized_maps_to_auth() {
    let (base_url, server) = serve_once(
        "401 Unauthorized",
        r#"{"error": {"message": "Incorrect API key provided: sk-test-key.", "code": "invalid_api_key"}}"#,
    )
    .await;

    let err = provider(&base_url)
        .generate(&GenerationRequest::default())
        .await
        .unwrap_err();
    server.await.unwrap();

    match err {
        ImageGenError::Auth(message) => {
            assert!(message.contains("invalid_api_key"));
            assert!(!message.contains("sk-test-key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_maps_to_api() {
    let (base_url, server) = serve_once("500 Internal Server Error", r#"{"error": "boom"}"#).await;

    let err = provider(&base_url)
        .generate(&GenerationRequest::default())
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, ImageGenError::Api { status: 500, .. }), "{err:?}");
    assert!(err.is_remote());
}

#[tokio::test]
async fn malformed_body_is_json_error() {
    let (base_url, server) = serve_once("200 OK", "not json").await;

    let err = provider(&base_url)
        .generate(&GenerationRequest::default())
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, ImageGenError::Json(_)), "{err:?}");
}
