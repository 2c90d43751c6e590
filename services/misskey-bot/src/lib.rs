//! Misskey bot that answers `amesh [place]` mentions with a rain radar
//! image of the place.

pub mod bot;
pub mod command;
pub mod misskey;
pub mod server;

pub use bot::{caption, Bot, Outcome, APOLOGY, PROCESSING_REACTION};
pub use command::{parse_command, ParsedCommand};
pub use misskey::{DriveFile, MentionStream, MisskeyClient, Note, NoteClient, User};
