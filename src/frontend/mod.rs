pub mod chat;
pub mod preview;

pub use chat::{BackendClient, ChatFrontend, Command, DeckDownload};
