//! OpenAI-compatible chat completions client.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Value, json};
use texsurgeon_config::GeneratorConfig;
use texsurgeon_engine::TextGenerator;

pub struct OpenAiGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
}

impl OpenAiGenerator {
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        let api_key = config.api_key();
        if api_key.is_none() {
            log::warn!(
                "{} is not set, sending requests without authorization",
                config.api_key_env
            );
        }

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
        })
    }
}

impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        log::debug!("POST {} (model {})", self.endpoint, self.model);
        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.endpoint))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            bail!("Provider error ({status}): {text}");
        }

        let parsed: Value = response
            .json()
            .await
            .context("Provider returned invalid JSON")?;
        message_content(&parsed)
    }
}

/// Text of the first choice's message.
fn message_content(parsed: &Value) -> Result<String> {
    let choice = parsed
        .get("choices")
        .and_then(|choices| choices.get(0))
        .ok_or_else(|| anyhow!("Missing choices"))?;

    Ok(choice
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_choice() {
        let parsed = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "\\section{A}" } },
                { "message": { "content": "ignored" } }
            ]
        });
        assert_eq!(message_content(&parsed).unwrap(), "\\section{A}");
    }

    #[test]
    fn null_content_is_empty() {
        let parsed = json!({ "choices": [{ "message": { "content": null } }] });
        assert_eq!(message_content(&parsed).unwrap(), "");
    }

    #[test]
    fn missing_choices_is_an_error() {
        assert!(message_content(&json!({ "error": "overloaded" })).is_err());
    }

    #[test]
    fn endpoint_is_derived_from_base_url() {
        let generator = OpenAiGenerator::from_config(&GeneratorConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            ..GeneratorConfig::default()
        })
        .unwrap();
        assert_eq!(generator.endpoint, "http://localhost:11434/v1/chat/completions");
    }
}
