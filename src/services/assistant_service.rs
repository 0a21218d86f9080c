//! Client for hosted assistants (OpenAI Assistants API, v2).
//!
//! One call to [`AssistantClient::ask`] makes a fresh thread, starts a run
//! with the assistant's stored instructions plus the JSON payload, polls the
//! run until it completes, and returns the newest message text.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::services::polling::{poll_until, PollOutcome, PollPolicy};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Returned in place of a reply when a run produced no message in time.
pub const NO_RESPONSE: &str = "⏳ No response (timed out or empty).";

const RUN_COMPLETED: &str = "completed";
// Statuses after which a run will never complete.
const RUN_TERMINAL: [&str; 5] = [RUN_COMPLETED, "failed", "cancelled", "expired", "incomplete"];
const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Assistant API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Assistant call cancelled")]
    Cancelled,
}

#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Send `payload` to the assistant and return its free-text reply.
    async fn ask(&self, assistant_id: &str, payload: &Value) -> Result<String, AssistantError>;
}

#[derive(Debug, Deserialize)]
struct AssistantObject {
    #[serde(default)]
    instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: String,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
    instructions: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    text: Option<MessageText>,
}

#[derive(Debug, Deserialize)]
struct MessageText {
    value: String,
}

impl MessageList {
    fn first_text(self) -> Option<String> {
        self.data
            .into_iter()
            .next()?
            .content
            .into_iter()
            .next()?
            .text
            .map(|text| text.value)
    }
}

pub fn build_instructions(stored: Option<&str>, payload: &Value) -> Result<String, AssistantError> {
    Ok(format!(
        "{}\n\nHere is the input payload in JSON:\n{}",
        stored.unwrap_or_default(),
        serde_json::to_string(payload)?
    ))
}

#[derive(Clone)]
pub struct OpenAiAssistantClient {
    client: Client,
    api_key: String,
    base_url: String,
    poll: PollPolicy,
    cancel: CancellationToken,
}

impl OpenAiAssistantClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll: PollPolicy::default(),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AssistantError> {
        let request = self.authorized(self.client.get(format!("{}{}", self.base_url, path)));
        Self::read(request).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AssistantError> {
        let request = self
            .authorized(self.client.post(format!("{}{}", self.base_url, path)))
            .json(body);
        Self::read(request).await
    }

    async fn read<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, AssistantError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AssistantError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl AssistantClient for OpenAiAssistantClient {
    async fn ask(&self, assistant_id: &str, payload: &Value) -> Result<String, AssistantError> {
        let assistant: AssistantObject = self.get(&format!("/assistants/{}", assistant_id)).await?;
        let thread: ThreadObject = self.post("/threads", &serde_json::json!({})).await?;

        let run_request = CreateRunRequest {
            assistant_id,
            instructions: build_instructions(assistant.instructions.as_deref(), payload)?,
        };
        let run: RunObject = self
            .post(&format!("/threads/{}/runs", thread.id), &run_request)
            .await?;
        log::debug!(
            "Started run {} on thread {} for assistant {}",
            run.id,
            thread.id,
            assistant_id
        );

        let run_path = format!("/threads/{}/runs/{}", thread.id, run.id);
        let mut first_status = Some(run.status);
        let outcome = poll_until(&self.poll, &self.cancel, || {
            let known = first_status.take();
            let run_path = run_path.as_str();
            async move {
                let status = match known {
                    Some(status) => status,
                    None => self.get::<RunObject>(run_path).await?.status,
                };
                let finished = RUN_TERMINAL.contains(&status.as_str());
                Ok::<_, AssistantError>(finished.then_some(status))
            }
        })
        .await?;

        match outcome {
            PollOutcome::Ready(status) if status == RUN_COMPLETED => {}
            PollOutcome::Ready(status) => {
                log::warn!("Run {} for assistant {} ended as {}", run.id, assistant_id, status);
            }
            PollOutcome::TimedOut => {
                log::warn!(
                    "Run {} for assistant {} did not complete within {:?}",
                    run.id,
                    assistant_id,
                    self.poll.timeout
                );
            }
            PollOutcome::Cancelled => return Err(AssistantError::Cancelled),
        }

        let messages: MessageList = self
            .get(&format!("/threads/{}/messages", thread.id))
            .await?;
        Ok(messages.first_text().unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}
