use std::sync::Arc;

use crate::ai::{ImageGenerator, TextGenerator};
use crate::config::AppConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Built once at startup; nothing in it is mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub text: Arc<dyn TextGenerator>,
    pub images: Arc<dyn ImageGenerator>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            text,
            images,
        }
    }
}
