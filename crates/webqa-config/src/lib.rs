//! Configuration for the webqa orchestrator.
//!
//! Values come from a YAML file (`webqa.yaml` in the working directory, or
//! `webqa/config.yaml` under the platform config dir) and are then overridden
//! by environment variables. Credentials are held as plain values inside the
//! config object and passed explicitly to the provider constructors; nothing
//! here mutates the process environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variables recognized as overrides.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_DEEPSEEK_API_KEY: &str = "DEEPSEEK_API_KEY";
pub const ENV_DEFAULT_MODEL: &str = "DEFAULT_MODEL";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_BROWSER_USE_MODEL: &str = "BROWSER_USE_MODEL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logical backend selected when the CLI does not name one.
    pub default_backend: String,
    pub backends: BackendsConfig,
    pub agent: AgentConfig,
    pub evidence: EvidenceConfig,
    pub target: TargetConfig,
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_backend: "gemini".to_string(),
            backends: BackendsConfig::default(),
            agent: AgentConfig::default(),
            evidence: EvidenceConfig::default(),
            target: TargetConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendsConfig {
    pub gemini: BackendEntry,
    pub openai: BackendEntry,
    pub deepseek: BackendEntry,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendEntry {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
}

impl BackendEntry {
    /// The usable credential, if any. Empty strings and the documented
    /// `your_..._api_key_here` placeholders count as not configured.
    pub fn effective_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !is_placeholder_key(key))
    }
}

/// True for credential values that mean "not configured": empty strings and
/// the sample-config placeholders (e.g. `your_gemini_api_key_here`).
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || (key.starts_with("your_") && key.ends_with("_api_key_here"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// External browser-automation agent executable.
    pub command: String,
    /// Arguments placed before the task text.
    pub args: Vec<String>,
    /// Hard limit on a single agent run.
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: "browser-use".to_string(),
            args: Vec::new(),
            timeout_secs: 900,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Root directory for evidence bundles; `~` is expanded.
    pub root_dir: String,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            root_dir: "evidencias".to_string(),
        }
    }
}

impl EvidenceConfig {
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.root_dir).into_owned())
    }
}

/// The web application under test and the account the agent logs in with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub url: String,
    pub email: String,
    pub password: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: "https://bibliotechapp.vercel.app/login".to_string(),
            email: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// When true a failed report call aborts the session instead of falling
    /// back to the default error report.
    pub strict: bool,
}

impl Config {
    /// Load the config file if one exists, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_file(&path)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load a specific config file, then apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from("webqa.yaml");
        if local.exists() {
            return Some(local);
        }
        let global = dirs::config_dir()?.join("webqa").join("config.yaml");
        global.exists().then_some(global)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(ENV_GEMINI_API_KEY) {
            self.backends.gemini.api_key = Some(value);
        }
        if let Ok(value) = std::env::var(ENV_OPENAI_API_KEY) {
            self.backends.openai.api_key = Some(value);
        }
        if let Ok(value) = std::env::var(ENV_DEEPSEEK_API_KEY) {
            self.backends.deepseek.api_key = Some(value);
        }
        if let Ok(value) = std::env::var(ENV_DEFAULT_MODEL) {
            self.default_backend = value.to_lowercase();
        }
        if let Ok(value) = std::env::var(ENV_OPENAI_MODEL) {
            self.backends.openai.model = Some(value);
        }
        if let Ok(value) = std::env::var(ENV_BROWSER_USE_MODEL) {
            self.backends.gemini.model = Some(value);
        }
    }
}
