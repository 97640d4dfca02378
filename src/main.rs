use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use deckgen::ai::{GeminiClient, ImageGenerator};
use deckgen::config::AppConfig;
use deckgen::frontend::{BackendClient, ChatFrontend};
use deckgen::pipeline::DeckPipeline;
use deckgen::slides::RawSlide;

#[derive(Parser)]
#[command(name = "deckgen", version, about = "Turn a text prompt into a slide deck")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default).
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Interactive prompt session against a running service.
    Chat {
        /// Service URL; defaults to BACKEND_API_URL.
        #[arg(long)]
        backend: Option<String>,
        #[arg(long, default_value = "generated_presentation.pptx")]
        output: PathBuf,
    },
    /// Render a JSON slide list to a deck without the HTTP service.
    Render {
        slides: PathBuf,
        #[arg(long, default_value = "generated_presentation.pptx")]
        output: PathBuf,
        /// Use placeholders instead of calling the image model.
        #[arg(long)]
        no_images: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    deckgen::init_logging();
    let cli = Cli::parse();
    let mut config = AppConfig::load();

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            deckgen::serve(config).await
        }
        Command::Chat { backend, output } => {
            let url = backend.unwrap_or_else(|| config.backend_api_url.clone());
            info!("Using backend {}", url);
            ChatFrontend::new(BackendClient::new(&url), output).run().await
        }
        Command::Render {
            slides,
            output,
            no_images,
        } => render(&config, &slides, &output, no_images).await,
    }
}

async fn render(
    config: &AppConfig,
    slides: &Path,
    output: &Path,
    no_images: bool,
) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(slides)
        .await
        .with_context(|| format!("failed to read {}", slides.display()))?;
    let slides: Vec<RawSlide> =
        serde_json::from_str(&text).context("slide file is not a JSON slide list")?;

    let images: Option<Arc<dyn ImageGenerator>> = if no_images {
        None
    } else {
        Some(Arc::new(GeminiClient::new(config)))
    };
    let deck = DeckPipeline::new(images, config.render_capabilities())
        .with_debug_dir(config.debug_images_dir())
        .build(&slides)
        .await?;

    tokio::fs::write(output, &deck.bytes)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Wrote {} ({} slides{})",
        output.display(),
        deck.rendered,
        if deck.skipped.is_empty() {
            String::new()
        } else {
            format!(", skipped {}", deck.skipped_indices())
        }
    );
    Ok(())
}
