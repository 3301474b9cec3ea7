mod types;

use self::types::{ChatRequest, ChatResponse};
use crate::error::LlmError;
use crate::llm::http_client::build_client_with_timeout;
use crate::llm::scrub::sanitize_api_error;
use crate::llm::traits::CompletionProvider;
use crate::llm::types::ChatMessage;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const PROVIDER: &str = "openai";

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiProvider {
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: String,
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Self {
        Self {
            cached_auth_header: format!("Bearer {api_key}"),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: build_client_with_timeout(timeout),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn call_api(&self, request: &ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", &self.cached_auth_header)
            .json(request)
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                return Err(LlmError::Auth {
                    provider: PROVIDER.into(),
                }
                .into());
            }
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
            return Err(LlmError::Api {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                message: sanitize_api_error(&body),
            }
            .into());
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| self.request_error(&e).into())
    }

    fn request_error(&self, error: &reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout {
                provider: PROVIDER.into(),
                secs: self.timeout.as_secs(),
            }
        } else {
            LlmError::Request {
                provider: PROVIDER.into(),
                message: sanitize_api_error(&error.to_string()),
            }
        }
    }

    fn extract_text(response: ChatResponse) -> anyhow::Result<String> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                LlmError::EmptyResponse {
                    provider: PROVIDER.into(),
                }
                .into()
            })
    }
}

impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn complete<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [ChatMessage],
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = ChatRequest {
                model,
                messages,
                temperature,
            };
            let response = self.call_api(&request).await?;
            if let Some(usage) = &response.usage {
                tracing::debug!(
                    model,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "completion received"
                );
            }
            Self::extract_text(response)
        })
    }
}
