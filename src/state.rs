//! Application state shared by every connection: the document generator and
//! the default interface language. Immutable after startup.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::load_generator_config_from_env;
use crate::domain::Language;
use crate::gemini::{Gemini, Generator};

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn Generator>,
    pub default_language: Language,
}

impl AppState {
    /// Build state from env: load prompt config, init the Gemini client.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Result<Self, reqwest::Error> {
        let prompts = load_generator_config_from_env()
            .map(|c| c.prompts)
            .unwrap_or_default();

        let gemini = Gemini::from_env(prompts)?;
        if gemini.has_api_key() {
            info!(target: "ikasnova_backend", base_url = %gemini.base_url, model = %gemini.model, temperature = gemini.temperature, "Gemini enabled.");
        } else {
            warn!(target: "ikasnova_backend", "GEMINI_API_KEY not set; generation requests will fail until it is provided.");
        }

        let default_language = std::env::var("DEFAULT_LANGUAGE")
            .ok()
            .and_then(|code| Language::from_code(&code))
            .unwrap_or_default();

        Ok(Self::with_generator(Arc::new(gemini), default_language))
    }

    pub fn with_generator(generator: Arc<dyn Generator>, default_language: Language) -> Self {
        Self { generator, default_language }
    }
}
