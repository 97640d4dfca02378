use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::ai::ChatTurn;
use crate::slides::RawSlide;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Ended,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has ended")]
    Ended,
}

#[derive(Debug, Default)]
struct SessionInner {
    transcript: Vec<ChatTurn>,
    slides: Vec<RawSlide>,
    ended_at: Option<DateTime<Utc>>,
}

/// One interactive chat: an append-only transcript plus the latest slide
/// list, discarded when the session ends.
#[derive(Debug)]
pub struct ChatSession {
    pub id: String,
    pub started_at: DateTime<Utc>,
    inner: Mutex<SessionInner>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            inner: Mutex::new(SessionInner::default()),
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self.inner.lock().ended_at {
            Some(_) => SessionStatus::Ended,
            None => SessionStatus::Active,
        }
    }

    /// Snapshot of the transcript, oldest first.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.inner.lock().transcript.clone()
    }

    pub fn push(&self, turn: ChatTurn) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        if inner.ended_at.is_some() {
            return Err(SessionError::Ended);
        }
        inner.transcript.push(turn);
        Ok(())
    }

    /// Append a prompt and its reply as one exchange.
    pub fn record_exchange(&self, prompt: &str, reply: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        if inner.ended_at.is_some() {
            return Err(SessionError::Ended);
        }
        inner.transcript.push(ChatTurn::user(prompt));
        inner.transcript.push(ChatTurn::assistant(reply));
        Ok(())
    }

    pub fn set_slides(&self, slides: Vec<RawSlide>) {
        self.inner.lock().slides = slides;
    }

    pub fn latest_slides(&self) -> Vec<RawSlide> {
        self.inner.lock().slides.clone()
    }

    /// Forget the transcript and slides; the session stays active.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.transcript.clear();
        inner.slides.clear();
    }

    /// End the session, dropping everything it held. Returns the number of
    /// turns discarded.
    pub fn end(&self) -> usize {
        let mut inner = self.inner.lock();
        let turns = inner.transcript.len();
        inner.transcript.clear();
        inner.slides.clear();
        inner.ended_at.get_or_insert_with(Utc::now);
        turns
    }
}
