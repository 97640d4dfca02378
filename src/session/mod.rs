pub mod manager;

pub use manager::{ChatSession, SessionError, SessionStatus};
