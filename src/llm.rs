use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// OpenAI-compatible chat-completions client
#[derive(Clone)]
pub struct LlmClient {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, base_url: String, temperature: f32) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature,
            http: reqwest::Client::new(),
        }
    }

    /// Build a client from config; fails with `CredentialMissing` before touching the network
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self::new(api_key, config.model.clone(), config.base_url.clone(), config.temperature))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn request_body(&self, messages: &[ChatMessage], stop: &[&str]) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
        });
        if !stop.is_empty() {
            body["stop"] = serde_json::json!(stop);
        }
        body
    }

    pub async fn call_llm(&self, messages: &[ChatMessage], stop: &[&str]) -> Result<String> {
        let body = self.request_body(messages, stop);
        debug!("Calling {} with {} messages", self.model, messages.len());

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::AgentExecution(format!("LLM API call failed: {}", e)))?;

        let status = response.status();
        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AgentError::AgentExecution(format!("Failed to parse LLM response: {}", e)))?;

        if !status.is_success() {
            let message = response_json["error"]["message"]
                .as_str()
                .unwrap_or("unknown error");
            return Err(AgentError::AgentExecution(format!(
                "LLM API returned {}: {}",
                status, message
            )));
        }

        extract_content(&response_json)
    }
}

/// `choices[0].message.content` of a chat-completions response
pub fn extract_content(response_json: &serde_json::Value) -> Result<String> {
    response_json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| AgentError::AgentExecution("No content in LLM response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_key() {
        let config = AgentConfig::default();
        assert!(matches!(
            LlmClient::from_config(&config),
            Err(AgentError::CredentialMissing(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let client = LlmClient::new("k".to_string(), "m".to_string(), "http://localhost/v1/".to_string(), 0.3);
        let body = client.request_body(&[ChatMessage::user("oi")], &["\nObservação:"]);
        assert_eq!(body["model"], "m");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "oi");
        assert_eq!(body["stop"][0], "\nObservação:");
        assert_eq!(client.base_url, "http://localhost/v1");
    }

    #[test]
    fn test_extract_content() {
        let ok = serde_json::json!({"choices": [{"message": {"content": "Resposta Final: 42"}}]});
        assert_eq!(extract_content(&ok).unwrap(), "Resposta Final: 42");

        let empty = serde_json::json!({"choices": []});
        assert!(matches!(extract_content(&empty), Err(AgentError::AgentExecution(_))));
    }
}
