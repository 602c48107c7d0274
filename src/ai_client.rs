use anyhow::Result;
use log::{error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum AiModel {
    Gpt4Turbo,
    Gpt4,
    Gpt35Turbo,
}

impl AiModel {
    pub fn as_str(&self) -> &str {
        match self {
            AiModel::Gpt4Turbo => "gpt-4-turbo-preview",
            AiModel::Gpt4 => "gpt-4",
            AiModel::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "gpt-4-turbo" | "gpt-4-turbo-preview" | "GPT-4 Turbo" => Some(AiModel::Gpt4Turbo),
            "gpt-4" | "GPT-4" => Some(AiModel::Gpt4),
            "gpt-3.5-turbo" | "GPT-3.5 Turbo" => Some(AiModel::Gpt35Turbo),
            _ => None,
        }
    }

    pub fn from_string(s: &str) -> Result<Self> {
        Self::from_str(s).ok_or_else(|| anyhow::anyhow!("Unknown model: {}", s))
    }
}

impl Default for AiModel {
    fn default() -> Self {
        AiModel::Gpt35Turbo
    }
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Thin client over an OpenAI-compatible chat-completions endpoint. This is
/// the only component that talks to the network; everything above it sees a
/// prompt in and a reply string out.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.openai.com/v1".to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            base_url,
        }
    }

    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &AiModel,
    ) -> Result<String> {
        let request = ChatRequest {
            model: model.as_str().to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens: 1000,
            temperature: 0.7,
            stream: false,
        };

        info!("Sending completion request with model: {}", model.as_str());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Completion API error: {}", error_text);
            return Err(anyhow::anyhow!("Completion API error: {}", error_text));
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(choice) = chat_response.choices.first() {
            if let Some(usage) = chat_response.usage {
                info!(
                    "Token usage - Prompt: {}, Completion: {}, Total: {}",
                    usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
                );
            }
            Ok(choice.message.content.clone())
        } else {
            Err(anyhow::anyhow!("No response choices from completion API"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name_round_trip() {
        assert_eq!(AiModel::Gpt4Turbo.as_str(), "gpt-4-turbo-preview");
        assert!(AiModel::from_str("gpt-4").is_some());
        assert!(AiModel::from_str("unknown-model").is_none());
        assert!(AiModel::from_string("gpt-3.5-turbo").is_ok());
        assert!(AiModel::from_string("nope").is_err());
    }
}
