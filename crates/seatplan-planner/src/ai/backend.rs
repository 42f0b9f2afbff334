//! Chat backends
//!
//! `HttpChatBackend` talks to an OpenAI-compatible chat-completions endpoint
//! with a blocking client, so batches run strictly one after another.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use seatplan_types::{Error, Result};

/// Sends one prompt and returns the model's text reply
pub trait ChatBackend {
    fn send_prompt(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking HTTP backend for chat-completions APIs
pub struct HttpChatBackend {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: String,
}

impl HttpChatBackend {
    pub fn new(endpoint: &str, model: &str, temperature: f32, api_key: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .map_err(|e| Error::Llm(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            temperature,
            api_key: api_key.to_string(),
        })
    }
}

impl ChatBackend for HttpChatBackend {
    fn send_prompt(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "sending chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::Llm(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let truncated: String = body.chars().take(300).collect();
            return Err(Error::Llm(format!("HTTP {}: {}", status, truncated)));
        }

        let parsed: ChatResponse = response.json().map_err(|e| Error::Llm(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Llm("response contained no message content".to_string()))
    }
}
