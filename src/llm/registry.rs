use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{AppConfig, LlmConfig};
use crate::errors::{SurfError, SurfResult};
use crate::llm::provider::LlmProvider;
use crate::llm::providers::openai_compatible::OpenAiCompatibleProvider;
use crate::llm::types::CallConfig;

/// Registry of all available LLM providers, keyed by their config.toml identifier.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    active: String,
    llm_config: LlmConfig,
}

impl ProviderRegistry {
    pub fn register(&mut self, provider: Arc<dyn LlmProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get_active(&self) -> SurfResult<Arc<dyn LlmProvider>> {
        self.providers
            .get(&self.active)
            .cloned()
            .ok_or_else(|| SurfError::Config(format!("Active provider '{}' not found in registry", self.active)))
    }

    pub fn set_active(&mut self, name: String) -> SurfResult<()> {
        if self.providers.contains_key(&name) {
            self.active = name;
            Ok(())
        } else {
            Err(SurfError::Config(format!("Provider '{name}' not registered")))
        }
    }

    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Return the active provider together with the sampling parameters from its entry.
    pub fn active_call_config(&self) -> SurfResult<(Arc<dyn LlmProvider>, CallConfig)> {
        let provider = self.get_active()?;
        let entry = self.llm_config.providers.get(&self.active).ok_or_else(|| {
            SurfError::Config(format!("No config entry for provider '{}'", self.active))
        })?;
        tracing::debug!(
            provider = %self.active,
            model = %entry.model,
            temperature = entry.temperature,
            max_tokens = entry.max_tokens,
            "resolved call config"
        );
        Ok((
            provider,
            CallConfig {
                model: entry.model.clone(),
                temperature: entry.temperature,
                top_p: entry.top_p,
                max_tokens: entry.max_tokens,
            },
        ))
    }

    /// Build a registry from the loaded app config.
    /// API keys are read from environment variables named `SURF_<ID>_API_KEY`.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut registry = Self {
            providers: HashMap::new(),
            active: config.llm.active_provider.clone(),
            llm_config: config.llm.clone(),
        };
        for (id, entry) in &config.llm.providers {
            let api_key = std::env::var(api_key_env_var(id))
                .unwrap_or_else(|_| entry.api_key.clone().unwrap_or_default());
            if api_key.is_empty() {
                tracing::warn!(provider = %id, "no API key configured");
            }
            let provider = OpenAiCompatibleProvider::new(id.clone(), entry.api_base.clone(), api_key);
            registry.register(Arc::new(provider));
        }
        registry
    }
}

fn api_key_env_var(id: &str) -> String {
    format!("SURF_{}_API_KEY", id.to_uppercase().replace('-', "_"))
}
