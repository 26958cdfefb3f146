//! Configuration loading for the parrot agent.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Load settings from an optional JSON file, falling back to defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Settings file not found at {}",
                    path.display()
                )));
            }
            let content = std::fs::read_to_string(path)?;
            let settings: Settings = serde_json::from_str(&content)?;
            tracing::debug!("Loaded settings from {}", path.display());
            settings
        }
        None => Settings::default(),
    };

    validate_settings(&settings)?;
    Ok(settings)
}

/// Check settings that would otherwise produce a broken manifest.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.agent.speaker_uri.trim().is_empty() {
        return Err(Error::Config("agent.speaker_uri must not be empty".to_string()));
    }

    let url = settings.agent.service_url.as_str();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::Config(format!(
            "agent.service_url '{}' must be an http(s) URL",
            url
        )));
    }

    Ok(())
}

/// Identity advertised in the agent manifest.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AgentSettings {
    #[serde(default = "default_speaker_uri")]
    pub speaker_uri: String,
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_organization")]
    pub organization: String,
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_speaker_uri() -> String {
    "tag:openfloor-demo.com,2025:parrot-agent".to_string()
}

fn default_service_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_agent_name() -> String {
    "Polly the Parrot".to_string()
}

fn default_organization() -> String {
    "OpenFloor Demo Corp".to_string()
}

fn default_description() -> String {
    "A friendly parrot that repeats everything you say!".to_string()
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            speaker_uri: default_speaker_uri(),
            service_url: default_service_url(),
            name: default_agent_name(),
            organization: default_organization(),
            description: default_description(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// The one browser origin granted CORS access.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_allowed_origin() -> String {
    "http://127.0.0.1:4000".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

/// Parrot agent settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub agent: AgentSettings,

    #[serde(default)]
    pub server: ServerSettings,
}
