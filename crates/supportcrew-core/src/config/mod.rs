use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{defaults, endpoints, env, models};
use crate::error::CrewError;
use crate::llm::{LlmClient, MistralClient};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub crew: CrewSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    pub embed_model: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrewSettings {
    pub task_timeout_secs: u64,
    pub max_iterations: usize,
    pub docs_url: String,
    /// Carried for parity with crew configurations; no memory backend exists.
    pub memory: bool,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: models::DEFAULT_CHAT_MODEL.to_string(),
            embed_model: models::DEFAULT_EMBED_MODEL.to_string(),
            api_key_env: env::API_KEY.to_string(),
            base_url: None,
            temperature: None,
            max_tokens: None,
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for CrewSettings {
    fn default() -> Self {
        Self {
            task_timeout_secs: defaults::TASK_TIMEOUT_SECS,
            max_iterations: defaults::MAX_ITERATIONS,
            docs_url: endpoints::CREW_DOCS_URL.to_string(),
            memory: false,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("supportcrew")
            .join("config.toml")
    }

    /// Load from the default path, falling back to defaults when absent or unreadable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(settings) => return settings,
                Err(e) => tracing::warn!(path = %config_path.display(), error = %e, "ignoring config file"),
            }
        }
        Self::default()
    }

    /// Load from an explicit path. Unlike [`Settings::load`], errors are reported.
    pub fn load_from(path: &Path) -> Result<Self, CrewError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)
            .map_err(|e| CrewError::Config(format!("{}: {e}", path.display())))?;
        if settings.crew.task_timeout_secs == 0 {
            return Err(CrewError::Config(format!(
                "{}: crew.task_timeout_secs must be at least 1",
                path.display()
            )));
        }
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CrewError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CrewError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `SUPPORTCREW_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), CrewError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Empty values are ignored.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), CrewError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = get(env::MODEL) {
            self.llm.model = model;
        }
        if let Some(model) = get(env::EMBED_MODEL) {
            self.llm.embed_model = model;
        }
        if let Some(url) = get(env::BASE_URL) {
            self.llm.base_url = Some(url);
        }
        if let Some(secs) = get(env::TIMEOUT_SECS) {
            self.crew.task_timeout_secs = secs
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&s| s > 0)
                .ok_or_else(|| {
                    CrewError::Config(format!(
                        "{} must be a positive number of seconds, got '{secs}'",
                        env::TIMEOUT_SECS
                    ))
                })?;
        }
        Ok(())
    }

    /// Get the API key from the environment variable specified in settings.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.crew.task_timeout_secs)
    }

    /// Build the Mistral client described by these settings.
    pub fn build_llm_client(&self) -> Result<Arc<dyn LlmClient>, CrewError> {
        let api_key = self.api_key().ok_or_else(|| {
            CrewError::Config(format!(
                "API key not found; set the {} environment variable",
                self.llm.api_key_env
            ))
        })?;
        Ok(Arc::new(self.build_client_with_key(api_key)))
    }

    pub fn build_client_with_key(&self, api_key: impl Into<String>) -> MistralClient {
        let mut client = MistralClient::new(api_key)
            .with_model(&self.llm.model)
            .with_embed_model(&self.llm.embed_model)
            .with_timeout(Duration::from_secs(self.llm.request_timeout_secs));

        if let Some(ref url) = self.llm.base_url {
            client = client.with_base_url(url);
        }
        if let Some(temperature) = self.llm.temperature {
            client = client.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.llm.max_tokens {
            client = client.with_max_tokens(max_tokens);
        }
        client
    }
}
