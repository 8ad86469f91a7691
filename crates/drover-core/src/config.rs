//! Configuration management for Drover
//!
//! Repository-level settings loaded from `.drover/config.toml`: model
//! selection, loop bounds, instance service endpoint, and the display
//! geometry advertised by the computer tool.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// Repository-level Drover configuration
///
/// Loaded from `.drover/config.toml`; every field falls back to a default
/// so a missing file or a partial file both work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DroverConfig {
    /// Model selection and token limits
    #[serde(default)]
    pub model: ModelConfig,

    /// Loop execution defaults
    #[serde(default)]
    pub loop_defaults: LoopDefaults,

    /// Instance provisioning service
    #[serde(default)]
    pub instance: InstanceConfig,

    /// Display geometry advertised by the computer tool
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Model selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier sent to the completion API
    #[serde(default = "default_model")]
    pub id: String,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Default loop execution parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopDefaults {
    /// Maximum loop iterations before stopping; 0 means unbounded
    #[serde(default)]
    pub max_iterations: usize,
}

impl Default for LoopDefaults {
    fn default() -> Self {
        Self { max_iterations: 0 }
    }
}

/// Instance provisioning service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Base URL of the provisioning service
    #[serde(default = "default_instance_url")]
    pub base_url: String,

    /// Environment variable containing the provisioning API key
    #[serde(default = "default_instance_key_env")]
    pub api_key_env: String,
}

/// Display geometry for the computer tool descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_display_width")]
    pub width: u32,

    #[serde(default = "default_display_height")]
    pub height: u32,

    #[serde(default = "default_display_number")]
    pub number: u32,
}

// Default value providers

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_max_tokens() -> usize {
    4096
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_instance_url() -> String {
    "http://127.0.0.1:8700".to_string()
}

fn default_instance_key_env() -> String {
    "DROVER_INSTANCE_KEY".to_string()
}

fn default_display_width() -> u32 {
    1024
}

fn default_display_height() -> u32 {
    768
}

fn default_display_number() -> u32 {
    1
}

impl DroverConfig {
    /// Load configuration from `.drover/config.toml` or use defaults
    pub fn load_or_default(repo_root: &Path) -> Result<Self> {
        let config_path = repo_root.join(".drover/config.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content).map_err(|e| {
                crate::DroverError::Config(format!("Failed to parse config file: {}", e))
            })?)
        } else {
            Ok(Self::default())
        }
    }

    /// Write default configuration to `.drover/config.toml`
    pub fn write_default(repo_root: &Path) -> Result<()> {
        let config_dir = repo_root.join(".drover");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let config = Self::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| crate::DroverError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: default_model(),
            max_tokens: default_max_tokens(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            base_url: default_instance_url(),
            api_key_env: default_instance_key_env(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_display_width(),
            height: default_display_height(),
            number: default_display_number(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DroverConfig::default();
        assert_eq!(config.model.id, "claude-3-5-sonnet-20241022");
        assert_eq!(config.model.max_tokens, 4096);
        assert_eq!(config.loop_defaults.max_iterations, 0);
        assert_eq!(config.display.width, 1024);
        assert_eq!(config.display.height, 768);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: DroverConfig = toml::from_str(
            r#"
            [model]
            id = "claude-3-7-sonnet-20250219"

            [loop_defaults]
            max_iterations = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.model.id, "claude-3-7-sonnet-20250219");
        assert_eq!(config.model.max_tokens, 4096);
        assert_eq!(config.loop_defaults.max_iterations, 25);
        assert_eq!(config.instance.api_key_env, "DROVER_INSTANCE_KEY");
    }
}
