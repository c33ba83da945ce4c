use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{SurfError, SurfResult};

pub const DEFAULT_PROVIDER_ID: &str = "dashscope";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub active_provider: String,
    pub providers: HashMap<String, ProviderEntry>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let mut providers = HashMap::new();
        providers.insert(
            DEFAULT_PROVIDER_ID.to_string(),
            ProviderEntry {
                display_name: "Qwen (DashScope)".into(),
                api_base: "https://dashscope-intl.aliyuncs.com/compatible-mode/v1/chat/completions"
                    .into(),
                model: "qwen3-vl-235b-a22b-instruct".into(),
                temperature: default_temperature(),
                top_p: Some(0.8),
                max_tokens: default_max_tokens(),
                api_key: None,
            },
        );
        Self {
            active_provider: DEFAULT_PROVIDER_ID.to_string(),
            providers,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub display_name: String,
    /// Full chat-completions endpoint URL.
    pub api_base: String,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Optional API key stored in config.toml (falls back to env var SURF_<ID>_API_KEY).
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Replaces the built-in system instructions when set.
    #[serde(default)]
    pub system_prompt_file: Option<PathBuf>,
    #[serde(default = "default_scroll_clicks")]
    pub default_scroll_clicks: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt_file: None,
            default_scroll_clicks: default_scroll_clicks(),
        }
    }
}

fn default_scroll_clicks() -> u32 {
    3
}

impl AgentConfig {
    /// Reads the override prompt file if one is configured.
    pub fn load_system_prompt(&self) -> SurfResult<Option<String>> {
        match &self.system_prompt_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                tracing::debug!(path = %path.display(), len = text.len(), "system prompt override loaded");
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }
}

fn resolve_config_path() -> SurfResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(SurfError::Config(
        "config.toml not found next to executable or in working directory".into(),
    ))
}

pub fn load_config() -> SurfResult<AppConfig> {
    let path = resolve_config_path()?;
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> SurfResult<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    if !config.llm.providers.contains_key(&config.llm.active_provider) {
        return Err(SurfError::Config(format!(
            "active provider '{}' has no [llm.providers.{}] entry",
            config.llm.active_provider, config.llm.active_provider
        )));
    }
    tracing::info!(path = %path.display(), provider = %config.llm.active_provider, "config loaded");
    Ok(config)
}

pub fn save_config(config: &AppConfig, path: &Path) -> SurfResult<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_dashscope_qwen() {
        let cfg = AppConfig::default();
        let entry = &cfg.llm.providers[&cfg.llm.active_provider];
        assert_eq!(entry.model, "qwen3-vl-235b-a22b-instruct");
        assert_eq!(entry.max_tokens, 4096);
        assert_eq!(entry.top_p, Some(0.8));
        assert_eq!(cfg.agent.default_scroll_clicks, 3);
    }

    #[test]
    fn parses_minimal_provider_table() {
        let raw = r#"
            [llm]
            active_provider = "local"

            [llm.providers.local]
            display_name = "Local"
            api_base = "http://localhost:8000/v1/chat/completions"
            model = "qwen-vl"
        "#;
        let cfg: AppConfig = toml::from_str(raw).unwrap();
        let entry = &cfg.llm.providers["local"];
        assert_eq!(entry.temperature, 0.7);
        assert_eq!(entry.max_tokens, 4096);
        assert!(entry.top_p.is_none());
        assert!(cfg.agent.system_prompt_file.is_none());
    }

    #[test]
    fn rejects_missing_active_provider() {
        let dir = std::env::temp_dir().join(format!("surf-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[llm]\nactive_provider = \"missing\"\n[llm.providers]\n",
        )
        .unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, SurfError::Config(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
