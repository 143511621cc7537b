// Chat-completions oracle over HTTP
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{Oracle, OracleError};
use crate::config::OracleConfig;

const SYSTEM_PROMPT: &str = "You are an expert academic reviewer checking a university course \
outline against a compliance checklist. For every checklist item decide whether the outline \
satisfies it. Be generous: an item is present when the outline covers its intent, even briefly \
or under a different heading. Quote the supporting passage as evidence. Reply with JSON only.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client
#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    config: OracleConfig,
    api_key: String,
}

impl HttpOracle {
    /// Reads the API key from the configured environment variable
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| OracleError::MissingApiKey(config.api_key_env.clone()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            api_key,
        })
    }

    fn request_body(&self, items: &[String], document: &str, context: &str) -> Value {
        json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt(items, document, context, self.config.max_document_chars)},
            ],
        })
    }
}

fn user_prompt(items: &[String], document: &str, context: &str, max_chars: usize) -> String {
    let document: String = document.chars().take(max_chars).collect();
    let list = items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let context = if context.trim().is_empty() {
        String::new()
    } else {
        format!("ADDITIONAL CONTEXT:\n{}\n\n", context.trim())
    };
    format!(
        "{context}CHECKLIST ITEMS:\n{list}\n\nCOURSE OUTLINE:\n{document}\n\n\
         Return {{\"results\": [...]}} with one object per checklist item, each with the fields \
         \"item\" (the item text exactly as given), \"present\" (boolean), \"confidence\" \
         (0.0 to 1.0), \"explanation\" and \"evidence\"."
    )
}

/// JSON body of the assistant message, tolerating a markdown code fence
fn parse_content(content: &str) -> Result<Value, OracleError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim()).map_err(|e| OracleError::Malformed(e.to_string()))
}

#[async_trait]
impl Oracle for HttpOracle {
    async fn assess(
        &self,
        items: &[String],
        document: &str,
        context: &str,
    ) -> Result<Value, OracleError> {
        info!(items = items.len(), model = %self.config.model, "Sending oracle request");
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(items, document, context))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| OracleError::Malformed("response has no message content".to_string()))?;
        debug!(chars = content.len(), "oracle response received");
        parse_content(&content)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
