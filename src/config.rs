//! Runtime configuration, read from the environment (after `.env` is loaded)
//! and overridable from the command line.

use crate::error::{AgentError, Result};
use crate::workspace::DEFAULT_WORK_DIR;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_STEPS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Never serialized, so configs can be logged
    #[serde(skip)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_steps: usize,
    pub work_dir: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_steps: DEFAULT_MAX_STEPS,
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
        }
    }
}

impl AgentConfig {
    /// Read `GOOGLE_API_KEY` (or `OPENAI_API_KEY`), `LLM_BASE_URL`, `LLM_MODEL`,
    /// `LLM_TEMPERATURE`, `AGENT_MAX_STEPS` and `AGENT_WORK_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let temperature = match non_empty("LLM_TEMPERATURE") {
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .map_err(|e| AgentError::Config(format!("LLM_TEMPERATURE '{}': {}", raw, e)))?,
            None => defaults.temperature,
        };

        let max_steps = match non_empty("AGENT_MAX_STEPS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| AgentError::Config(format!("AGENT_MAX_STEPS '{}': {}", raw, e)))?,
            None => defaults.max_steps,
        };
        if max_steps == 0 {
            return Err(AgentError::Config("AGENT_MAX_STEPS must be at least 1".to_string()));
        }

        Ok(Self {
            api_key: non_empty("GOOGLE_API_KEY").or_else(|| non_empty("OPENAI_API_KEY")),
            base_url: non_empty("LLM_BASE_URL").unwrap_or(defaults.base_url),
            model: non_empty("LLM_MODEL").unwrap_or(defaults.model),
            temperature,
            max_steps,
            work_dir: non_empty("AGENT_WORK_DIR").map(PathBuf::from).unwrap_or(defaults.work_dir),
        })
    }

    /// The credential, or `CredentialMissing`
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(AgentError::CredentialMissing(
                "API Key não encontrada! Defina GOOGLE_API_KEY no arquivo .env".to_string(),
            )),
        }
    }
}
