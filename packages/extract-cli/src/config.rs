use anyhow::{Context, Result};
use dotenvy::dotenv;
use knowledge_extraction::security::{SearchCredentials, SecretString};
use knowledge_extraction::{ExtractionConfig, ResearchConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Secrets and endpoints from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub search: SearchCredentials,
    pub gemini_api_key: Option<SecretString>,
    pub gemini_model: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let api_key = SecretString::from_env("GOOGLE_API_KEY").context("GOOGLE_API_KEY must be set")?;
        let engine_id = env::var("GOOGLE_CSE_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .context("GOOGLE_CSE_ID must be set")?;

        Ok(Self {
            search: SearchCredentials::new(api_key, engine_id),
            gemini_api_key: SecretString::from_env("GEMINI_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL").ok().filter(|v| !v.trim().is_empty()),
        })
    }
}

/// Tunables, optionally read from a JSON file. Missing keys keep defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub extraction: ExtractionConfig,
    pub research: ResearchConfig,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid settings in {}", path.display()))
    }
}
