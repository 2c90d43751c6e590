//! Mention handling: parse, render, upload, reply.

use std::sync::Arc;

use amesh::{HttpFetcher, RenderConfig};
use amesh_common::Location;
use anyhow::{Context, Result};
use tracing::{error, info, instrument, warn};

use crate::command::parse_command;
use crate::misskey::{Note, NoteClient};

/// Reaction added while a command is being processed.
pub const PROCESSING_REACTION: &str = "👀";

/// Reply posted when a command fails. Error details are only logged.
pub const APOLOGY: &str = "申し訳ないっぽ。ameshコマンドの処理中にエラーが発生したっぽ";

/// What happened to a mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not an amesh command
    Ignored,
    /// Image posted
    Replied { file_id: String },
    /// Command failed and the apology was posted (or attempted)
    Apologized,
}

/// Caption for a successful reply.
pub fn caption(location: &Location) -> String {
    format!(
        "📡 {} ({:.4}, {:.4}) の雨雲レーダー画像だっぽ",
        location.display_name, location.latitude, location.longitude
    )
}

/// Answers amesh commands through a [`NoteClient`].
pub struct Bot<C> {
    client: Arc<C>,
    fetcher: Arc<dyn HttpFetcher>,
    config: RenderConfig,
    yahoo_api_token: String,
}

impl<C: NoteClient> Bot<C> {
    pub fn new(
        client: Arc<C>,
        fetcher: Arc<dyn HttpFetcher>,
        config: RenderConfig,
        yahoo_api_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            fetcher,
            config,
            yahoo_api_token: yahoo_api_token.into(),
        }
    }

    /// Handle one mention to completion.
    #[instrument(skip(self, note), fields(note_id = %note.id, user = %note.user.username))]
    pub async fn handle_note(&self, note: &Note) -> Outcome {
        let parsed = parse_command(note.text.as_deref().unwrap_or(""));
        if !parsed.is_recognized {
            return Outcome::Ignored;
        }

        metrics::counter!("amesh_commands_total").increment(1);
        info!(place = %parsed.place, "Processing amesh command");

        match self.process_amesh_command(note, &parsed.place).await {
            Ok(file_id) => Outcome::Replied { file_id },
            Err(e) => {
                metrics::counter!("amesh_command_failures_total").increment(1);
                error!(error = %format!("{:#}", e), "amesh command failed");
                if let Err(reply_err) = self.client.create_note(APOLOGY, &[], note).await {
                    warn!(error = %reply_err, "Failed to post apology");
                }
                Outcome::Apologized
            }
        }
    }

    async fn process_amesh_command(&self, note: &Note, place: &str) -> Result<String> {
        if let Err(e) = self.client.add_reaction(&note.id, PROCESSING_REACTION).await {
            warn!(error = %e, "Failed to add reaction");
        }

        let fetcher = self.fetcher.as_ref();
        let location =
            amesh::resolve_location(fetcher, &self.config, place, &self.yahoo_api_token)
                .await
                .context("Failed to resolve location")?;

        let png = amesh::create_image_png(fetcher, &self.config, &location)
            .await
            .context("Failed to create image")?;

        let file_name = amesh::generate_file_name_now(&location);
        let file = self
            .client
            .upload_file(png, &file_name)
            .await
            .context("Failed to upload image")?;

        self.client
            .create_note(&caption(&location), &[file.id.clone()], note)
            .await
            .context("Failed to post reply")?;

        info!(place = %location.display_name, file_id = %file.id, "Posted radar image");
        Ok(file.id)
    }
}
