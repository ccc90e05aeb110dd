use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LLMProvider {
    OpenAI,
    Gemini,
}

impl LLMProvider {
    /// Name used for keyring entries and log lines.
    pub fn key_name(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "openai",
            LLMProvider::Gemini => "gemini",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "https://api.openai.com/v1",
            LLMProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta/models",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "gpt-4o-mini",
            LLMProvider::Gemini => "gemini-2.0-flash",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LLMConfig {
    /// The configured key, treating blank strings as absent.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn for_provider(provider: LLMProvider) -> Self {
        Self {
            provider,
            base_url: provider.default_base_url().to_string(),
            model: provider.default_model().to_string(),
            ..Self::default()
        }
    }

    /// Swap in the selected provider's endpoint and model where the config
    /// still carries another provider's defaults.
    pub fn apply_provider_defaults(&mut self) {
        let stock = [LLMProvider::OpenAI, LLMProvider::Gemini];
        if stock
            .iter()
            .any(|p| *p != self.provider && self.base_url == p.default_base_url())
        {
            self.base_url = self.provider.default_base_url().to_string();
        }
        if stock
            .iter()
            .any(|p| *p != self.provider && self.model == p.default_model())
        {
            self.model = self.provider.default_model().to_string();
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            base_url: LLMProvider::OpenAI.default_base_url().to_string(),
            model: LLMProvider::OpenAI.default_model().to_string(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.3),
        }
    }
}
