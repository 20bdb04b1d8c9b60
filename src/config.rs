use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub inference_service: InferenceServiceConfig,
    #[serde(default)]
    pub translator: DeploymentConfig,
    #[serde(default)]
    pub summarizer: DeploymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where the pretrained pipelines actually run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_inference_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_model() -> String {
    "t5-small".to_string()
}

fn default_inference_timeout_secs() -> u64 {
    120
}

impl Default for InferenceServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_inference_timeout_secs(),
        }
    }
}

impl InferenceServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Per-deployment settings. `user_config` is handed to the deployment's
/// `reconfigure` once its replicas are up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default = "default_num_replicas")]
    pub num_replicas: usize,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_reconfigure_timeout_ms")]
    pub reconfigure_timeout_ms: u64,
    #[serde(default)]
    pub user_config: Option<serde_json::Value>,
}

fn default_num_replicas() -> usize {
    1
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_reconfigure_timeout_ms() -> u64 {
    300_000
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            num_replicas: default_num_replicas(),
            request_timeout_ms: default_request_timeout_ms(),
            reconfigure_timeout_ms: default_reconfigure_timeout_ms(),
            user_config: None,
        }
    }
}

impl DeploymentConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn reconfigure_timeout(&self) -> Duration {
        Duration::from_millis(self.reconfigure_timeout_ms)
    }
}

impl Config {
    /// Load configuration from a YAML or JSON file, expanding `${VAR}` references
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let content = load_text_file(path)?;
        let content = substitute_env_vars(&content)?;
        Self::parse(path, &content)
    }

    fn parse(path: &str, content: &str) -> Result<Self> {
        let path_lower = path.to_lowercase();
        let config = if path_lower.ends_with(".json") {
            serde_json::from_str(content)?
        } else {
            serde_yaml::from_str(content)?
        };
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.system_config.host, self.system_config.port)
    }
}

/// Replace `${VAR_NAME}` with the variable's value, leaving unknown names as-is
fn substitute_env_vars(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let replaced = pattern.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    Ok(replaced.into_owned())
}

/// Read a text file, dropping a UTF-8 BOM and replacing invalid sequences
fn load_text_file(file_path: &str) -> Result<String> {
    let bytes = fs::read(file_path)?;
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if had_errors {
        tracing::warn!("Configuration file {} contains invalid UTF-8", file_path);
    }
    Ok(text.into_owned())
}
