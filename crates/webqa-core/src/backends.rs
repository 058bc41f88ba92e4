//! Maps logical backend names to ready-to-use provider instances.
//!
//! Selection happens entirely before any network call: an unknown name or a
//! missing/placeholder credential fails here and nothing else runs.

use std::fmt;
use std::str::FromStr;

use tracing::debug;
use webqa_config::{BackendEntry, Config};
use webqa_providers::{GeminiProvider, LLMProvider, OpenAiProvider, ProviderRegistry};

use crate::error::QaError;

pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";
pub const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Temperature used by the OpenAI-compatible backends when the config does
/// not set one.
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Gemini,
    Gpt,
    Deepseek,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::Gemini, BackendKind::Gpt, BackendKind::Deepseek];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Gemini => "gemini",
            BackendKind::Gpt => "gpt",
            BackendKind::Deepseek => "deepseek",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(BackendKind::Gemini),
            "gpt" | "openai" => Ok(BackendKind::Gpt),
            "deepseek" => Ok(BackendKind::Deepseek),
            other => Err(QaError::UnknownBackend(other.to_string())),
        }
    }
}

/// Fetch the config entry for a backend.
pub fn backend_entry<'a>(config: &'a Config, kind: BackendKind) -> &'a BackendEntry {
    match kind {
        BackendKind::Gemini => &config.backends.gemini,
        BackendKind::Gpt => &config.backends.openai,
        BackendKind::Deepseek => &config.backends.deepseek,
    }
}

/// Construct the provider for a backend, or fail with `MissingCredential`
/// when the key is absent or a placeholder.
pub fn build_provider(config: &Config, kind: BackendKind) -> Result<Box<dyn LLMProvider>, QaError> {
    let entry = backend_entry(config, kind);
    let api_key = entry
        .effective_key()
        .ok_or_else(|| QaError::MissingCredential {
            backend: kind.to_string(),
        })?
        .to_string();

    let provider: Box<dyn LLMProvider> = match kind {
        BackendKind::Gemini => {
            let model = entry
                .model
                .clone()
                .unwrap_or_else(|| GEMINI_DEFAULT_MODEL.to_string());
            match entry.base_url.clone() {
                Some(base_url) => Box::new(GeminiProvider::with_base_url(
                    api_key,
                    model,
                    entry.temperature,
                    base_url,
                )),
                None => Box::new(GeminiProvider::new(api_key, model, entry.temperature)),
            }
        }
        BackendKind::Gpt => {
            let model = entry
                .model
                .clone()
                .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string());
            let temperature = entry.temperature.or(Some(DEFAULT_TEMPERATURE));
            match entry.base_url.clone() {
                Some(base_url) => Box::new(OpenAiProvider::new_with_name(
                    "gpt".to_string(),
                    api_key,
                    model,
                    temperature,
                    base_url,
                )),
                None => Box::new(OpenAiProvider::new(api_key, model, temperature)),
            }
        }
        BackendKind::Deepseek => {
            let model = entry
                .model
                .clone()
                .unwrap_or_else(|| DEEPSEEK_DEFAULT_MODEL.to_string());
            let base_url = entry
                .base_url
                .clone()
                .unwrap_or_else(|| DEEPSEEK_BASE_URL.to_string());
            Box::new(OpenAiProvider::new_with_name(
                "deepseek".to_string(),
                api_key,
                model,
                entry.temperature.or(Some(DEFAULT_TEMPERATURE)),
                base_url,
            ))
        }
    };

    debug!(
        "Configured backend {} with model {}",
        provider.name(),
        provider.model()
    );
    Ok(provider)
}

/// Build a registry holding the selected backend as default.
///
/// `selected` overrides the config's `default_backend`; the config value is
/// parsed here so a bad `DEFAULT_MODEL` env value surfaces as
/// `UnknownBackend` rather than silently falling back.
pub fn build_registry(
    config: &Config,
    selected: Option<BackendKind>,
) -> Result<ProviderRegistry, QaError> {
    let kind = match selected {
        Some(kind) => kind,
        None => config.default_backend.parse()?,
    };

    let mut registry = ProviderRegistry::new();
    registry.register(build_provider(config, kind)?);
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_keys() -> Config {
        let mut config = Config::default();
        config.backends.gemini.api_key = Some("gemini-key".to_string());
        config.backends.openai.api_key = Some("openai-key".to_string());
        config.backends.deepseek.api_key = Some("deepseek-key".to_string());
        config
    }

    #[test]
    fn parses_supported_backend_names() {
        assert_eq!("gemini".parse::<BackendKind>().unwrap(), BackendKind::Gemini);
        assert_eq!("GPT".parse::<BackendKind>().unwrap(), BackendKind::Gpt);
        assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::Gpt);
        assert_eq!(
            "deepseek".parse::<BackendKind>().unwrap(),
            BackendKind::Deepseek
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = "claude".parse::<BackendKind>().unwrap_err();
        assert!(matches!(err, QaError::UnknownBackend(name) if name == "claude"));
    }

    #[test]
    fn placeholder_credential_is_treated_as_absent() {
        let mut config = Config::default();
        config.backends.gemini.api_key = Some("your_gemini_api_key_here".to_string());

        let err = build_provider(&config, BackendKind::Gemini).unwrap_err();
        assert!(matches!(
            err,
            QaError::MissingCredential { backend } if backend == "gemini"
        ));
    }

    #[test]
    fn registry_defaults_to_selected_backend() {
        let config = config_with_keys();
        let registry = build_registry(&config, Some(BackendKind::Deepseek)).unwrap();
        let provider = registry.get(None).unwrap();
        assert_eq!(provider.name(), "deepseek");
        assert_eq!(provider.model(), DEEPSEEK_DEFAULT_MODEL);
    }

    #[test]
    fn registry_falls_back_to_config_default() {
        let config = config_with_keys();
        let registry = build_registry(&config, None).unwrap();
        assert_eq!(registry.get(None).unwrap().name(), "gemini");
    }

    #[test]
    fn bad_config_default_surfaces_as_unknown_backend() {
        let mut config = config_with_keys();
        config.default_backend = "llama".to_string();
        let err = build_registry(&config, None).unwrap_err();
        assert!(matches!(err, QaError::UnknownBackend(_)));
    }

    #[test]
    fn model_defaults_are_applied() {
        let config = config_with_keys();
        let gemini = build_provider(&config, BackendKind::Gemini).unwrap();
        let gpt = build_provider(&config, BackendKind::Gpt).unwrap();
        assert_eq!(gemini.model(), GEMINI_DEFAULT_MODEL);
        assert_eq!(gpt.model(), OPENAI_DEFAULT_MODEL);
    }
}
