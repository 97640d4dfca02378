//! Interactive terminal client for the deck service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use log::{info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::preview::render_output;
use crate::ai::llm::StructuredOutput;
use crate::ai::ChatTurn;
use crate::api::{SLIDES_RENDERED, SLIDES_SKIPPED};
use crate::session::ChatSession;
use crate::slides::RawSlide;

#[derive(Debug, Serialize)]
struct ContentRequest<'a> {
    prompt: &'a str,
    history: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: StructuredOutput,
}

#[derive(Debug, Serialize)]
struct GeneratePptRequest<'a> {
    slides: &'a [RawSlide],
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// A downloaded deck and what the server reported about it.
#[derive(Debug)]
pub struct DeckDownload {
    pub bytes: Vec<u8>,
    pub rendered: Option<usize>,
    pub skipped: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn content(
        &self,
        prompt: &str,
        history: &[ChatTurn],
    ) -> anyhow::Result<StructuredOutput> {
        let response = self
            .http
            .post(format!("{}/content_generation_api", self.base_url))
            .json(&ContentRequest { prompt, history })
            .send()
            .await
            .context("content request failed")?;
        let response = check(response).await?;
        let body: ContentResponse = response
            .json()
            .await
            .context("unexpected content response")?;
        Ok(body.content)
    }

    pub async fn generate_ppt(&self, slides: &[RawSlide]) -> anyhow::Result<DeckDownload> {
        let response = self
            .http
            .post(format!("{}/generate_ppt", self.base_url))
            .json(&GeneratePptRequest { slides })
            .send()
            .await
            .context("deck request failed")?;
        let response = check(response).await?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let rendered = header(SLIDES_RENDERED).and_then(|v| v.parse().ok());
        let skipped = header(SLIDES_SKIPPED)
            .map(|v| v.split(',').filter_map(|i| i.trim().parse().ok()).collect())
            .unwrap_or_default();
        let bytes = response.bytes().await.context("deck download failed")?;

        Ok(DeckDownload {
            bytes: bytes.to_vec(),
            rendered,
            skipped,
        })
    }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(anyhow!("backend error ({}): {}", status, message))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Prompt(String),
    Create,
    Reset,
    Quit,
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Command::Empty,
            "/create" => Command::Create,
            "/reset" => Command::Reset,
            "/quit" | "/exit" => Command::Quit,
            prompt => Command::Prompt(prompt.to_string()),
        }
    }
}

pub struct ChatFrontend {
    client: BackendClient,
    session: Arc<ChatSession>,
    output: PathBuf,
}

impl ChatFrontend {
    pub fn new(client: BackendClient, output: PathBuf) -> Self {
        Self {
            client,
            session: Arc::new(ChatSession::new()),
            output,
        }
    }

    pub fn session(&self) -> &Arc<ChatSession> {
        &self.session
    }

    /// Send a prompt with the transcript so far and return the markdown
    /// preview. The exchange is recorded only when the request succeeds.
    pub async fn submit(&self, prompt: &str) -> anyhow::Result<String> {
        let history = self.session.history();
        let output = self.client.content(prompt, &history).await?;
        let preview = render_output(&output);

        if let Some(slides) = output.slides() {
            self.session.set_slides(slides.to_vec());
        }
        self.session.record_exchange(prompt, &preview)?;
        Ok(preview)
    }

    /// Build the deck for the latest slides and write it to the output path.
    pub async fn create_deck(&self) -> anyhow::Result<DeckDownload> {
        let slides = self.session.latest_slides();
        if slides.is_empty() {
            return Err(anyhow!("no slides yet; describe a presentation first"));
        }
        let download = self.client.generate_ppt(&slides).await?;
        tokio::fs::write(&self.output, &download.bytes)
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        info!(
            "Saved {} ({} bytes)",
            self.output.display(),
            download.bytes.len()
        );
        Ok(download)
    }

    /// Read commands from stdin until `/quit` or end of input.
    pub async fn run(self) -> anyhow::Result<()> {
        println!("Describe your presentation. Commands: /create, /reset, /quit");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                Command::Empty => continue,
                Command::Quit => break,
                Command::Reset => {
                    self.session.reset();
                    println!("Conversation cleared.");
                }
                Command::Create => match self.create_deck().await {
                    Ok(download) => {
                        println!("Presentation saved to {}", self.output.display());
                        if !download.skipped.is_empty() {
                            println!("Skipped slides: {:?}", download.skipped);
                        }
                    }
                    Err(e) => {
                        warn!("Deck creation failed: {:#}", e);
                        println!("Failed to generate PowerPoint file: {:#}", e);
                    }
                },
                Command::Prompt(prompt) => match self.submit(&prompt).await {
                    Ok(preview) => println!("{}", preview),
                    Err(e) => {
                        warn!("Prompt failed: {:#}", e);
                        println!("Request failed: {:#}", e);
                    }
                },
            }
        }

        let turns = self.session.end();
        info!("Session {} ended after {} turns", self.session.id, turns);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse() {
        assert_eq!(Command::parse("  /create "), Command::Create);
        assert_eq!(Command::parse("/reset"), Command::Reset);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(
            Command::parse("5 slides on bees"),
            Command::Prompt("5 slides on bees".into())
        );
    }

    #[tokio::test]
    async fn create_without_slides_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let frontend = ChatFrontend::new(
            BackendClient::new("http://127.0.0.1:9"),
            dir.path().join("deck.pptx"),
        );
        assert!(frontend.create_deck().await.is_err());
        assert!(!dir.path().join("deck.pptx").exists());
    }
}
