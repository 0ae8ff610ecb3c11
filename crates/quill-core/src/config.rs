//! Configuration model: AI endpoint settings and edit-session timings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_SUPPRESSION_WINDOW_MS: u64 = 100;
pub const DEFAULT_NOTICE_DURATION_MS: u64 = 3000;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// AI provider family.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AiProvider {
    /// OpenAI-compatible endpoints (OpenAI, DeepSeek, Zhipu, Qwen, Moonshot, ...)
    #[default]
    OpenAiCompatible,
    Anthropic,
    Google,
    /// Local Ollama through its OpenAI-compatible `/v1` API
    Ollama,
}

impl AiProvider {
    /// Whether requests speak the chat-completions stream format.
    pub fn streams_chat_completions(&self) -> bool {
        matches!(self, AiProvider::OpenAiCompatible | AiProvider::Ollama)
    }

    /// Whether a bearer credential is mandatory.
    pub fn requires_credential(&self) -> bool {
        !matches!(self, AiProvider::Ollama)
    }
}

/// AI endpoint settings as seen by the stream client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AiSettings {
    pub provider: AiProvider,
    pub base_url: String,
    /// Never written to config.toml; lives in secret.json.
    #[serde(skip)]
    pub api_key: String,
    pub model: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: AiProvider::OpenAiCompatible,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl AiSettings {
    /// Full chat-completions URL, or `None` when no base URL is set.
    pub fn endpoint(&self) -> Option<String> {
        let base = self.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return None;
        }
        if base.ends_with(CHAT_COMPLETIONS_PATH) {
            Some(base.to_string())
        } else {
            Some(format!("{base}{CHAT_COMPLETIONS_PATH}"))
        }
    }

    /// Bearer credential, or `None` when blank.
    pub fn credential(&self) -> Option<&str> {
        let key = self.api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}

/// Timings of the edit-session controller.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AssistConfig {
    /// How long external content updates are ignored after a resolution.
    #[serde(default = "default_suppression_window_ms")]
    pub suppression_window_ms: u64,
    /// Visibility of error notices.
    #[serde(default = "default_notice_duration_ms")]
    pub notice_duration_ms: u64,
}

fn default_suppression_window_ms() -> u64 {
    DEFAULT_SUPPRESSION_WINDOW_MS
}

fn default_notice_duration_ms() -> u64 {
    DEFAULT_NOTICE_DURATION_MS
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            suppression_window_ms: DEFAULT_SUPPRESSION_WINDOW_MS,
            notice_duration_ms: DEFAULT_NOTICE_DURATION_MS,
        }
    }
}

impl AssistConfig {
    pub fn suppression_window(&self) -> Duration {
        Duration::from_millis(self.suppression_window_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }
}

/// Root of config.toml.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub assist: AssistConfig,
}

/// Root of secret.json.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiSecret>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AiSecret {
    pub api_key: String,
}
