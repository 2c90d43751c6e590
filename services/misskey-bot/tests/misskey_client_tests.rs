//! REST client tests against a local fake Misskey server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Json},
    Router,
};
use misskey_bot::{MisskeyClient, Note, NoteClient, User};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    headers: HeaderMap,
    body: Bytes,
}

type Log = Arc<Mutex<Vec<Captured>>>;

async fn fake_misskey(
    State(log): State<Log>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    log.lock().unwrap().push(Captured {
        path: path.clone(),
        headers,
        body,
    });

    if path.starts_with("/broken/") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    match path.as_str() {
        "/api/notes/create" => Json(json!({
            "createdNote": {
                "id": "created-1",
                "text": "ok",
                "visibility": "home",
                "user": { "id": "bot", "username": "amesh" }
            }
        }))
        .into_response(),
        "/api/drive/files/create" => Json(json!({
            "id": "file-9",
            "name": "amesh_x_1.png",
            "url": "https://misskey.test/files/file-9"
        }))
        .into_response(),
        "/api/notes/reactions/create" => StatusCode::NO_CONTENT.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn start_server() -> (SocketAddr, Log) {
    let log: Log = Arc::default();
    let app = Router::new()
        .fallback(fake_misskey)
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, log)
}

fn client(addr: SocketAddr, prefix: &str) -> MisskeyClient {
    MisskeyClient::new("misskey.test", "tok", "amesh-bot/test")
        .unwrap()
        .with_api_base(format!("http://{}/{}", addr, prefix))
}

fn original(cw: Option<&str>) -> Note {
    Note {
        id: "orig-1".to_string(),
        text: Some("@amesh amesh".to_string()),
        visibility: Some("public".to_string()),
        cw: cw.map(String::from),
        reply_id: None,
        user: User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            host: Some("remote.example".to_string()),
        },
    }
}

#[tokio::test]
async fn test_create_note_payload_on_the_wire() {
    let (addr, log) = start_server().await;
    let client = client(addr, "api");

    let created = client
        .create_note("hello", &["file-9".to_string()], &original(Some("")))
        .await
        .unwrap();
    assert_eq!(created.id, "created-1");

    let captured = log.lock().unwrap()[0].clone();
    assert_eq!(captured.path, "/api/notes/create");
    assert_eq!(captured.headers["user-agent"], "amesh-bot/test");

    let body: Value = serde_json::from_slice(&captured.body).unwrap();
    assert_eq!(body["i"], "tok");
    assert_eq!(body["text"], "hello");
    assert_eq!(body["visibility"], "home");
    assert_eq!(body["replyId"], "orig-1");
    assert_eq!(body["fileIds"], json!(["file-9"]));
    assert_eq!(body["cw"], "隠すっぽ！");
}

#[tokio::test]
async fn test_add_reaction() {
    let (addr, log) = start_server().await;
    client(addr, "api")
        .add_reaction("orig-1", "👀")
        .await
        .unwrap();

    let captured = log.lock().unwrap()[0].clone();
    assert_eq!(captured.path, "/api/notes/reactions/create");
    let body: Value = serde_json::from_slice(&captured.body).unwrap();
    assert_eq!(body, json!({ "i": "tok", "noteId": "orig-1", "reaction": "👀" }));
}

#[tokio::test]
async fn test_upload_file_is_multipart() {
    let (addr, log) = start_server().await;
    let png = vec![137u8, 80, 78, 71, 13, 10, 26, 10];

    let file = client(addr, "api")
        .upload_file(png.clone(), "amesh_x_1.png")
        .await
        .unwrap();
    assert_eq!(file.id, "file-9");
    assert_eq!(file.url.as_deref(), Some("https://misskey.test/files/file-9"));

    let captured = log.lock().unwrap()[0].clone();
    assert_eq!(captured.path, "/api/drive/files/create");
    let content_type = captured.headers["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("multipart/form-data"));

    let raw = String::from_utf8_lossy(&captured.body);
    assert!(raw.contains("name=\"i\""));
    assert!(raw.contains("tok"));
    assert!(raw.contains("filename=\"amesh_x_1.png\""));
    assert!(captured
        .body
        .windows(png.len())
        .any(|window| window == png.as_slice()));
}

#[tokio::test]
async fn test_error_status_is_an_error() {
    let (addr, _) = start_server().await;
    let client = client(addr, "broken");

    assert!(client.add_reaction("x", "👀").await.is_err());
    assert!(client.upload_file(vec![1, 2, 3], "a.png").await.is_err());
    assert!(client.create_note("t", &[], &original(None)).await.is_err());
}
