//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.devguardian.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Scan settings.
    #[serde(default)]
    pub scan: ScanSettings,

    /// Fix pipeline settings.
    #[serde(default)]
    pub fix: FixSettings,

    /// Report settings.
    #[serde(default)]
    pub report: ReportSettings,
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Request timeout in seconds for one model call.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of retries on connection failure.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
        }
    }
}

impl ModelConfig {
    /// Builds the client-facing settings from this section.
    pub fn llm_config(&self) -> crate::llm::LlmConfig {
        crate::llm::LlmConfig {
            ollama_url: self.ollama_url.clone(),
            model_name: self.name.clone(),
            timeout_seconds: self.timeout_seconds,
            retries: self.retries,
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    2
}

/// Scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Agents to run when none are requested on the command line.
    #[serde(default = "default_agents")]
    pub default_agents: Vec<String>,

    /// Time budget in seconds for each agent call. Sits above the
    /// model timeout so the model error surfaces first.
    #[serde(default = "default_agent_timeout")]
    pub agent_timeout_seconds: u64,

    /// File extensions to include in directory scans.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Patterns to exclude from directory scans.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    /// Maximum file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,

    /// Maximum files to analyze per directory scan.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            default_agents: default_agents(),
            agent_timeout_seconds: default_agent_timeout(),
            extensions: default_extensions(),
            excludes: default_excludes(),
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
        }
    }
}

fn default_agents() -> Vec<String> {
    vec!["security".to_string(), "quality".to_string()]
}

fn default_agent_timeout() -> u64 {
    180
}

fn default_extensions() -> Vec<String> {
    vec![
        "rs", "py", "js", "ts", "jsx", "tsx", "go", "java", "c", "cpp", "h", "hpp", "cs", "rb",
        "php", "swift", "kt", "scala", "vue", "svelte",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_excludes() -> Vec<String> {
    vec![
        ".git",
        "target",
        "node_modules",
        "vendor",
        "dist",
        "build",
        "__pycache__",
        ".venv",
        "venv",
        ".idea",
        ".vscode",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_max_file_size() -> usize {
    100 * 1024 // 100KB; every file body goes into a prompt
}

fn default_max_files() -> usize {
    100
}

/// Fix pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixSettings {
    /// Number of issues fixed concurrently.
    #[serde(default = "default_fix_concurrency")]
    pub concurrency: usize,
}

impl Default for FixSettings {
    fn default() -> Self {
        Self {
            concurrency: default_fix_concurrency(),
        }
    }
}

fn default_fix_concurrency() -> usize {
    4
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "devguardian_report.md".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".devguardian.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but
    /// only when they were explicitly provided.
    pub fn merge_with_args(&mut self, cli: &crate::cli::Cli) {
        if let Some(ref model) = cli.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = cli.ollama_url {
            self.model.ollama_url = url.clone();
        }
        if let Some(timeout) = cli.timeout {
            self.model.timeout_seconds = timeout;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
