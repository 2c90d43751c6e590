//! Misskey API client: streaming mentions plus the REST calls the bot needs.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::USER_AGENT;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, instrument};

/// Content warning attached to replies to notes that carried one.
pub const REPLY_CW: &str = "隠すっぽ！";

/// WebSocket handshake timeout.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// REST request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// API types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub cw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<String>,
    pub user: User,
}

/// A file stored in the bot's drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    body: Option<ChannelEvent>,
}

#[derive(Debug, Deserialize)]
struct ChannelEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    body: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedNote {
    created_note: Note,
}

/// Extract the note from a streaming frame if it is a mention on a
/// connected channel. Other frames, including undecodable ones, are `None`.
pub fn parse_mention(frame: &str) -> Option<Note> {
    let message: StreamMessage = serde_json::from_str(frame).ok()?;
    if message.kind != "channel" {
        return None;
    }
    let event = message.body?;
    if event.kind != "mention" {
        return None;
    }
    serde_json::from_value(event.body).ok()
}

/// Payload for `notes/create` replying to `original`.
///
/// Public notes are answered with `home` visibility, and a content warning
/// is added when the original had one.
pub fn create_note_payload(text: &str, file_ids: &[String], original: &Note) -> Map<String, Value> {
    let visibility = match original.visibility.as_deref() {
        Some("public") | None => "home",
        Some(other) => other,
    };

    let mut payload = Map::new();
    payload.insert("text".into(), json!(text));
    payload.insert("visibility".into(), json!(visibility));
    if !original.id.is_empty() {
        payload.insert("replyId".into(), json!(original.id));
    }
    if !file_ids.is_empty() {
        payload.insert("fileIds".into(), json!(file_ids));
    }
    if original.cw.is_some() {
        payload.insert("cw".into(), json!(REPLY_CW));
    }
    payload
}

// ============================================================================
// NoteClient
// ============================================================================

/// The REST operations the bot performs in reply to a mention.
#[async_trait]
pub trait NoteClient: Send + Sync {
    async fn add_reaction(&self, note_id: &str, reaction: &str) -> Result<()>;

    async fn upload_file(&self, data: Vec<u8>, file_name: &str) -> Result<DriveFile>;

    /// Post `text` as a reply to `original`, attaching `file_ids`.
    async fn create_note(&self, text: &str, file_ids: &[String], original: &Note) -> Result<Note>;
}

// ============================================================================
// MisskeyClient
// ============================================================================

/// Client for one Misskey instance.
#[derive(Debug, Clone)]
pub struct MisskeyClient {
    http: Client,
    domain: String,
    token: String,
    user_agent: String,
    api_base: String,
}

impl MisskeyClient {
    pub fn new(domain: &str, token: &str, user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(HANDSHAKE_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            domain: domain.to_string(),
            token: token.to_string(),
            user_agent: user_agent.to_string(),
            api_base: format!("https://{}/api", domain),
        })
    }

    /// Send REST calls to another base URL (e.g. a local test server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    fn streaming_url(&self) -> String {
        format!("wss://{}/streaming?i={}", self.domain, self.token)
    }

    /// Open the streaming connection and subscribe to the main channel.
    #[instrument(skip(self), fields(domain = %self.domain))]
    pub async fn connect(&self) -> Result<MentionStream> {
        let mut request = self
            .streaming_url()
            .into_client_request()
            .context("Invalid streaming URL")?;
        request.headers_mut().insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent).context("Invalid user agent")?,
        );

        let (mut socket, _) =
            tokio::time::timeout(HANDSHAKE_TIMEOUT, tokio_tungstenite::connect_async(request))
                .await
                .map_err(|_| anyhow!("WebSocket handshake timed out"))?
                .context("WebSocket handshake failed")?;

        let connect = json!({
            "type": "connect",
            "body": { "channel": "main", "id": "main" }
        });
        socket
            .send(Message::Text(connect.to_string()))
            .await
            .context("Failed to subscribe to main channel")?;

        info!("Connected to Misskey streaming API");
        Ok(MentionStream { socket })
    }

    /// POST a JSON API call with the token merged into the payload.
    async fn api_request(&self, endpoint: &str, mut payload: Map<String, Value>) -> Result<reqwest::Response> {
        payload.insert("i".into(), json!(self.token));

        let url = format!("{}/{}", self.api_base, endpoint);
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("POST {} failed", endpoint))?;

        let status = response.status();
        if !status.is_success() {
            bail!("{} returned status {}", endpoint, status);
        }
        Ok(response)
    }
}

#[async_trait]
impl NoteClient for MisskeyClient {
    #[instrument(skip(self))]
    async fn add_reaction(&self, note_id: &str, reaction: &str) -> Result<()> {
        let mut payload = Map::new();
        payload.insert("noteId".into(), json!(note_id));
        payload.insert("reaction".into(), json!(reaction));
        self.api_request("notes/reactions/create", payload).await?;
        Ok(())
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn upload_file(&self, data: Vec<u8>, file_name: &str) -> Result<DriveFile> {
        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str("image/png")
            .context("Invalid MIME type")?;
        let form = Form::new().text("i", self.token.clone()).part("file", part);

        let url = format!("{}/drive/files/create", self.api_base);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("POST drive/files/create failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("drive/files/create returned status {}", status);
        }

        let file: DriveFile = response
            .json()
            .await
            .context("Failed to decode uploaded file")?;
        debug!(file_id = %file.id, "Uploaded file");
        Ok(file)
    }

    #[instrument(skip(self, text, original), fields(reply_to = %original.id))]
    async fn create_note(&self, text: &str, file_ids: &[String], original: &Note) -> Result<Note> {
        let payload = create_note_payload(text, file_ids, original);
        let response = self.api_request("notes/create", payload).await?;
        let created: CreatedNote = response
            .json()
            .await
            .context("Failed to decode created note")?;
        Ok(created.created_note)
    }
}

// ============================================================================
// Streaming
// ============================================================================

/// An open streaming connection yielding mentions.
pub struct MentionStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl MentionStream {
    /// Wait for the next mention. Errors when the connection drops.
    pub async fn next_mention(&mut self) -> Result<Note> {
        while let Some(frame) = self.socket.next().await {
            match frame.context("WebSocket read failed")? {
                Message::Text(text) => {
                    if let Some(note) = parse_mention(&text) {
                        info!(
                            note_id = %note.id,
                            user = %note.user.username,
                            "Received mention"
                        );
                        return Ok(note);
                    }
                }
                Message::Close(frame) => bail!("WebSocket closed: {:?}", frame),
                // Pings are answered by tungstenite on the next read
                _ => {}
            }
        }
        bail!("WebSocket stream ended")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(visibility: Option<&str>, cw: Option<&str>) -> Note {
        Note {
            id: "9abc".to_string(),
            text: Some("@bot amesh".to_string()),
            visibility: visibility.map(String::from),
            cw: cw.map(String::from),
            reply_id: None,
            user: User {
                id: "u1".to_string(),
                username: "alice".to_string(),
                host: None,
            },
        }
    }

    #[test]
    fn test_parse_mention_frame() {
        let frame = r#"{
            "type": "channel",
            "body": {
                "id": "main",
                "type": "mention",
                "body": {
                    "id": "9abc",
                    "text": "@bot amesh 大阪",
                    "visibility": "home",
                    "cw": null,
                    "user": { "id": "u1", "username": "alice", "host": "example.com" }
                }
            }
        }"#;
        let note = parse_mention(frame).unwrap();
        assert_eq!(note.id, "9abc");
        assert_eq!(note.text.as_deref(), Some("@bot amesh 大阪"));
        assert_eq!(note.cw, None);
        assert_eq!(note.user.host.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_other_frames_are_ignored() {
        assert!(parse_mention(r#"{"type":"channel","body":{"id":"main","type":"notification","body":{}}}"#).is_none());
        assert!(parse_mention(r#"{"type":"noteUpdated","body":{"id":"x","type":"reacted","body":{}}}"#).is_none());
        assert!(parse_mention("not json").is_none());
    }

    #[test]
    fn test_payload_public_becomes_home() {
        let payload = create_note_payload("hi", &[], &note(Some("public"), None));
        assert_eq!(payload["visibility"], "home");
        assert_eq!(payload["replyId"], "9abc");
        assert!(!payload.contains_key("fileIds"));
        assert!(!payload.contains_key("cw"));
    }

    #[test]
    fn test_payload_keeps_restricted_visibility() {
        let payload = create_note_payload("hi", &[], &note(Some("followers"), None));
        assert_eq!(payload["visibility"], "followers");
    }

    #[test]
    fn test_payload_with_files_and_cw() {
        let files = vec!["file1".to_string()];
        let payload = create_note_payload("hi", &files, &note(Some("home"), Some("spoiler")));
        assert_eq!(payload["fileIds"], json!(["file1"]));
        assert_eq!(payload["cw"], REPLY_CW);
    }

    #[test]
    fn test_streaming_url() {
        let client = MisskeyClient::new("misskey.example", "tok", "amesh-bot/test").unwrap();
        assert_eq!(client.streaming_url(), "wss://misskey.example/streaming?i=tok");
    }
}
