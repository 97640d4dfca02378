use log::warn;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::ai::RetryPolicy;
use crate::deck::RenderCapabilities;

/// Service configuration.
///
/// Built from defaults, then an optional JSON file named by `DECKGEN_CONFIG`,
/// then environment variables (a `.env` file is loaded first):
///
/// | Env var              | Default                                     |
/// |----------------------|---------------------------------------------|
/// | `GENAI_API_KEY`      | (none; `GEMINI_API_KEY` is also accepted)   |
/// | `GEMINI_BASE_URL`    | `https://generativelanguage.googleapis.com` |
/// | `TEXT_MODEL`         | `gemini-2.0-flash-exp`                      |
/// | `STRUCTURED_MODEL`   | `gemini-2.5-flash`                          |
/// | `IMAGE_MODEL`        | `gemini-2.0-flash-exp`                      |
/// | `HOST`               | `0.0.0.0`                                   |
/// | `PORT`               | `8000`                                      |
/// | `BACKEND_API_URL`    | `http://localhost:8000`                     |
/// | `DEBUG_IMAGES_DIR`   | `images` (empty disables)                   |
/// | `IMAGE_MAX_ATTEMPTS` | `10`                                        |
/// | `DECK_GRADIENTS`     | `true`                                      |
/// | `DECK_SHADOWS`       | `true`                                      |
/// | `CORS_ORIGINS`       | (any origin; comma-separated list)          |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub genai_api_key: String,
    pub gemini_base_url: String,
    pub text_model: String,
    pub structured_model: String,
    pub image_model: String,
    pub host: String,
    pub port: u16,
    pub backend_api_url: String,
    /// Where generated images are copied for inspection. Empty disables.
    pub debug_images_dir: String,
    pub image_max_attempts: u32,
    pub deck_gradients: bool,
    pub deck_shadows: bool,
    /// Allowed CORS origins. Empty allows any.
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            genai_api_key: String::new(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            text_model: "gemini-2.0-flash-exp".to_string(),
            structured_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.0-flash-exp".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            backend_api_url: "http://localhost:8000".to_string(),
            debug_images_dir: "images".to_string(),
            image_max_attempts: 10,
            deck_gradients: true,
            deck_shadows: true,
            cors_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let mut config = match std::env::var("DECKGEN_CONFIG") {
            Ok(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Read a JSON config file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                warn!("Could not read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Overlay values from `lookup` (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let non_empty = |key: &str| text(key).filter(|v| !v.is_empty());

        if let Some(key) = non_empty("GENAI_API_KEY").or_else(|| non_empty("GEMINI_API_KEY")) {
            self.genai_api_key = key;
        }
        if let Some(url) = non_empty("GEMINI_BASE_URL") {
            self.gemini_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = non_empty("TEXT_MODEL") {
            self.text_model = model;
        }
        if let Some(model) = non_empty("STRUCTURED_MODEL") {
            self.structured_model = model;
        }
        if let Some(model) = non_empty("IMAGE_MODEL") {
            self.image_model = model;
        }
        if let Some(host) = non_empty("HOST") {
            self.host = host;
        }
        if let Some(port) = non_empty("PORT") {
            parse_into(&port, "PORT", &mut self.port);
        }
        if let Some(url) = non_empty("BACKEND_API_URL") {
            self.backend_api_url = url.trim_end_matches('/').to_string();
        }
        // Set-but-empty is meaningful here: it turns debug images off.
        if let Some(dir) = text("DEBUG_IMAGES_DIR") {
            self.debug_images_dir = dir;
        }
        if let Some(attempts) = non_empty("IMAGE_MAX_ATTEMPTS") {
            parse_into(&attempts, "IMAGE_MAX_ATTEMPTS", &mut self.image_max_attempts);
        }
        if let Some(flag) = non_empty("DECK_GRADIENTS") {
            parse_flag(&flag, "DECK_GRADIENTS", &mut self.deck_gradients);
        }
        if let Some(flag) = non_empty("DECK_SHADOWS") {
            parse_flag(&flag, "DECK_SHADOWS", &mut self.deck_shadows);
        }
        if let Some(origins) = non_empty("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
    }

    pub fn debug_images_dir(&self) -> Option<&Path> {
        let dir = self.debug_images_dir.trim();
        (!dir.is_empty()).then(|| Path::new(dir))
    }

    pub fn render_capabilities(&self) -> RenderCapabilities {
        RenderCapabilities {
            gradients: self.deck_gradients,
            shadows: self.deck_shadows,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_max_attempts(self.image_max_attempts)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {}: {}", addr, e))
    }
}

fn parse_into<T: std::str::FromStr>(raw: &str, key: &str, target: &mut T) {
    match raw.parse() {
        Ok(value) => *target = value,
        Err(_) => warn!("Ignoring invalid {}={:?}", key, raw),
    }
}

fn parse_flag(raw: &str, key: &str, target: &mut bool) {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => *target = true,
        "0" | "false" | "no" | "off" => *target = false,
        _ => warn!("Ignoring invalid {}={:?}", key, raw),
    }
}
