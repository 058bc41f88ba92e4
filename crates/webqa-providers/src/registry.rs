use std::collections::HashMap;

use anyhow::Result;

use crate::LLMProvider;

/// Holds the configured LLM providers keyed by backend name.
///
/// The first registered provider becomes the default unless overridden with
/// `set_default`. `get(None)` resolves the default; `get(Some(name))` resolves
/// a specific backend.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Box<dyn LLMProvider>>,
    default_name: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Box<dyn LLMProvider>) {
        let name = provider.name().to_string();
        if self.default_name.is_none() {
            self.default_name = Some(name.clone());
        }
        self.providers.insert(name, provider);
    }

    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.providers.contains_key(name) {
            anyhow::bail!("no provider registered under '{}'", name);
        }
        self.default_name = Some(name.to_string());
        Ok(())
    }

    pub fn get(&self, name: Option<&str>) -> Result<&dyn LLMProvider> {
        let name = match name {
            Some(name) => name,
            None => self
                .default_name
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("no providers registered"))?,
        };

        self.providers
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| anyhow::anyhow!("no provider registered under '{}'", name))
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompletionRequest, CompletionResponse, LLMProvider, Usage};
    use async_trait::async_trait;

    struct FakeProvider {
        name: String,
    }

    #[async_trait]
    impl LLMProvider for FakeProvider {
        async fn complete(&self, _request: CompletionRequest) -> anyhow::Result<CompletionResponse> {
            Ok(CompletionResponse {
                content: format!("reply from {}", self.name),
                usage: Usage::default(),
                model: "fake".to_string(),
            })
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn model(&self) -> &str {
            "fake"
        }
    }

    fn fake(name: &str) -> Box<dyn LLMProvider> {
        Box::new(FakeProvider {
            name: name.to_string(),
        })
    }

    #[test]
    fn first_registered_becomes_default() {
        let mut registry = ProviderRegistry::new();
        registry.register(fake("gemini"));
        registry.register(fake("gpt"));

        assert_eq!(registry.default_name(), Some("gemini"));
        assert_eq!(registry.get(None).unwrap().name(), "gemini");
        assert_eq!(registry.get(Some("gpt")).unwrap().name(), "gpt");
    }

    #[test]
    fn set_default_switches_resolution() {
        let mut registry = ProviderRegistry::new();
        registry.register(fake("gemini"));
        registry.register(fake("deepseek"));
        registry.set_default("deepseek").unwrap();

        assert_eq!(registry.get(None).unwrap().name(), "deepseek");
    }

    #[test]
    fn unknown_name_is_an_error() {
        let mut registry = ProviderRegistry::new();
        registry.register(fake("gemini"));

        assert!(registry.get(Some("claude")).is_err());
        assert!(registry.set_default("claude").is_err());
    }

    #[test]
    fn empty_registry_has_no_default() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(None).is_err());
    }
}
