use crate::changelog::prompt::{create_system_prompt, create_user_prompt};
use crate::config::AiSettings;
use crate::error::{HeraldError, Result};
use crate::gitlab::Commit;
use crate::{log_debug, log_warn};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// A text-generation backend taking a system prompt and a user prompt
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Any endpoint speaking the `/chat/completions` protocol (`OpenAI`, Ollama, vLLM, ...)
pub struct OpenAiCompatibleBackend {
    http: reqwest::Client,
    settings: AiSettings,
}

impl OpenAiCompatibleBackend {
    pub fn new(http: reqwest::Client, settings: AiSettings) -> Self {
        Self { http, settings }
    }

    fn endpoint(&self) -> Result<Url> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| HeraldError::Generation("AI_BASE_URL cannot be used as a base".to_string()))?
            .pop_if_empty()
            .extend(["chat", "completions"]);
        Ok(url)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatibleBackend {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        log_debug!("Requesting changelog from model {}", self.settings.model);

        let response = self
            .http
            .post(self.endpoint()?)
            .bearer_auth(self.settings.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HeraldError::Generation("request timed out".to_string())
                } else {
                    HeraldError::Generation(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log_debug!("Generation backend error body: {}", body);
            return Err(HeraldError::Generation(format!(
                "backend returned status {}",
                status.as_u16()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| HeraldError::Generation(format!("invalid backend response: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| HeraldError::Generation("backend returned no content".to_string()))
    }
}

/// Turn a commit range into changelog text
pub async fn summarize(
    backend: &dyn CompletionBackend,
    commits: &[Commit],
    include_authors: bool,
) -> Result<String> {
    if commits.is_empty() {
        log_warn!("No commits in range, the changelog will be generated from an empty list");
    }

    let system_prompt = create_system_prompt(include_authors);
    let user_prompt = create_user_prompt(commits, include_authors);
    log_debug!("User prompt: {}", user_prompt);

    let changelog = backend.complete(&system_prompt, &user_prompt).await?;
    log_debug!("Generated changelog ({} chars)", changelog.len());
    Ok(changelog)
}
