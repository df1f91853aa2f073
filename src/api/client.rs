use super::ChatBackend;
use super::types::{ChatRequest, ChatResponse, HealthStatus, ModelList};
use crate::core::error::ChatError;
use crate::store::{Message, Settings};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Transport-wide retry policy. Every call gets `retries` extra attempts,
/// whatever the failure was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { retries: 1 }
    }
}

#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
        retry: RetryPolicy,
    ) -> Result<Self, ChatError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ChatError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn with_retry<T, F, Fut>(&self, what: &str, call: F) -> Result<T, ChatError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ChatError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retry.retries => {
                    attempt += 1;
                    warn!(call = what, attempt, error = %e, "request failed, retrying");
                }
                Err(e) => {
                    warn!(call = what, error = %e, "request failed");
                    return Err(e);
                }
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ChatError> {
        let url = self.url(path);
        let (http, url) = (&self.http, &url);
        self.with_retry(path, move || async move {
            let response = http.get(url).send().await?;
            read_json(response).await
        })
        .await
    }

    async fn post_json<B, T>(&self, path: &str, payload: &B) -> Result<T, ChatError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let (http, url) = (&self.http, &url);
        self.with_retry(path, move || async move {
            let response = http.post(url).json(payload).send().await?;
            read_json(response).await
        })
        .await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ChatError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ChatError::from_status(status, &body));
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_chat(
        &self,
        messages: &[Message],
        settings: &Settings,
    ) -> Result<String, ChatError> {
        let payload = ChatRequest::new(messages, settings);
        debug!(
            model = %payload.model,
            messages = payload.messages.len(),
            stream = payload.stream,
            "sending chat request"
        );

        let parsed: ChatResponse = self.post_json("chat", &payload).await?;
        debug!(
            model = parsed.model.as_deref().unwrap_or(&payload.model),
            chars = parsed.response.len(),
            "chat response received"
        );
        Ok(parsed.response)
    }

    async fn fetch_models(&self) -> Result<Vec<String>, ChatError> {
        let list: ModelList = self.get_json("models").await?;
        Ok(list.models)
    }

    async fn health(&self) -> Result<String, ChatError> {
        let status: HealthStatus = self.get_json("").await?;
        Ok(status.status)
    }
}
