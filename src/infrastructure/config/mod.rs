use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tracing::{debug, warn};
use validator::Validate;

use crate::domain::app_config::AppConfig;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMProvider;
use crate::infrastructure::security::keyring::KeyringManager;

pub const CONFIG_FILE: &str = "req2test.toml";
pub const KEYRING_SERVICE: &str = "Req2Test";

pub struct ConfigService {
    keyring: KeyringManager,
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            keyring: KeyringManager::new(KEYRING_SERVICE),
        }
    }

    /// Layered sources, lowest precedence first: defaults, the TOML file,
    /// `OPENAI_API_KEY`, then `REQ2TEST_*` variables (`__` separates levels).
    pub fn figment() -> Figment {
        let path = std::env::var("REQ2TEST_CONFIG").unwrap_or_else(|_| CONFIG_FILE.to_string());

        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(
                Env::raw()
                    .only(&["OPENAI_API_KEY"])
                    .map(|_| "llm.api_key".into()),
            )
            .merge(Env::prefixed("REQ2TEST_").ignore(&["CONFIG"]).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<AppConfig> {
        let mut config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        config
            .validate()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        config.llm.apply_provider_defaults();
        Ok(config)
    }

    /// Read `.env`, extract the layered config, then fill a missing API key
    /// from the keyring when enabled.
    pub fn load(&self) -> Result<AppConfig> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }

        let mut config = Self::from_figment(Self::figment())?;
        if config.llm.credential().is_none() && config.use_keyring {
            match self.keyring.get_secret(config.llm.provider.key_name()) {
                Ok(Some(secret)) => config.llm.api_key = Some(secret),
                Ok(None) => debug!(
                    provider = config.llm.provider.key_name(),
                    "No API key in keyring"
                ),
                Err(err) => warn!(error = %err, "Keyring lookup failed"),
            }
        }
        Ok(config)
    }

    pub fn save_api_key(&self, provider: LLMProvider, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::ValidationError("API key is empty".to_string()));
        }
        self.keyring.set_secret(provider.key_name(), key)
    }

    pub fn delete_api_key(&self, provider: LLMProvider) -> Result<()> {
        self.keyring.delete_secret(provider.key_name())
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_case::GenerationMode;
    use figment::Jail;

    #[test]
    fn test_layered_sources() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                mode = "remote"

                [llm]
                model = "gpt-4o"

                [remote]
                max_concurrency = 2
                "#,
            )?;
            jail.set_env("OPENAI_API_KEY", "sk-from-env");
            jail.set_env("REQ2TEST_REMOTE__REQUEST_TIMEOUT_SECS", "5");
            jail.set_env("REQ2TEST_HTTP__PORT", "8088");

            let config = ConfigService::from_figment(ConfigService::figment()).unwrap();
            assert_eq!(config.mode, GenerationMode::Remote);
            assert_eq!(config.llm.model, "gpt-4o");
            assert_eq!(config.llm.api_key.as_deref(), Some("sk-from-env"));
            assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
            assert_eq!(config.remote.max_concurrency, 2);
            assert_eq!(config.remote.request_timeout_secs, 5);
            assert_eq!(config.http.port, 8088);
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_key_beats_openai_key() {
        Jail::expect_with(|jail| {
            jail.set_env("OPENAI_API_KEY", "sk-generic");
            jail.set_env("REQ2TEST_LLM__API_KEY", "sk-specific");

            let config = ConfigService::from_figment(ConfigService::figment()).unwrap();
            assert_eq!(config.llm.api_key.as_deref(), Some("sk-specific"));
            Ok(())
        });
    }

    #[test]
    fn test_out_of_range_value_is_config_error() {
        Jail::expect_with(|jail| {
            jail.set_env("REQ2TEST_REMOTE__MAX_CONCURRENCY", "0");

            let result = ConfigService::from_figment(ConfigService::figment());
            assert!(matches!(result, Err(AppError::ConfigError(_))));
            Ok(())
        });
    }

    #[test]
    fn test_defaults_fall_back_to_keyring() {
        Jail::expect_with(|_jail| {
            let config = ConfigService::from_figment(ConfigService::figment()).unwrap();
            assert!(config.use_keyring);
            assert_eq!(config.mode, GenerationMode::Local);
            Ok(())
        });
    }

    #[test]
    fn test_gemini_provider_gets_gemini_endpoint() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                [llm]
                provider = "Gemini"
                "#,
            )?;

            let config = ConfigService::from_figment(ConfigService::figment()).unwrap();
            assert_eq!(config.llm.provider, LLMProvider::Gemini);
            assert_eq!(
                config.llm.base_url,
                "https://generativelanguage.googleapis.com/v1beta/models"
            );
            assert_eq!(config.llm.model, "gemini-2.0-flash");
            Ok(())
        });
    }

    #[test]
    fn test_empty_key_not_saved() {
        let service = ConfigService::new();
        assert!(matches!(
            service.save_api_key(LLMProvider::OpenAI, "  "),
            Err(AppError::ValidationError(_))
        ));
    }
}
