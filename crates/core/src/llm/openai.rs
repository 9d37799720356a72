use crate::config::Settings;
use crate::llm::error::{CompletionDiagnosticsError, Stage};
use crate::llm::{CompletionClient, CompletionRequest, Provider};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo-instruct";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the legacy text-completions endpoint (`/v1/completions`).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .context("OPENAI_API_KEY is not a valid header value")?,
        );
        Ok(headers)
    }

    async fn create_completion(
        &self,
        req: &CreateCompletionRequest<'_>,
    ) -> anyhow::Result<CreateCompletionResponse> {
        let url = format!("{}/v1/completions", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(self.headers()?)
            .json(req)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read OpenAI response body")?;
        if !status.is_success() {
            return Err(CompletionDiagnosticsError {
                provider: Provider::OpenAI,
                stage: Stage::Http,
                detail: format!("status={status}"),
                raw_output: Some(text),
            }
            .into());
        }

        match serde_json::from_str::<CreateCompletionResponse>(&text) {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(CompletionDiagnosticsError {
                provider: Provider::OpenAI,
                stage: Stage::Decode,
                detail: e.to_string(),
                raw_output: Some(text),
            }
            .into()),
        }
    }

    fn first_choice_text(res: CreateCompletionResponse) -> anyhow::Result<String> {
        res.choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| {
                CompletionDiagnosticsError {
                    provider: Provider::OpenAI,
                    stage: Stage::NoChoices,
                    detail: "response contained no choices".to_string(),
                    raw_output: None,
                }
                .into()
            })
    }
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String> {
        let body = CreateCompletionRequest {
            model: &self.model,
            prompt: &req.prompt,
            max_tokens: req.max_tokens,
            temperature: req.temperature,
        };

        let res = self.create_completion(&body).await?;
        if let Some(usage) = &res.usage {
            tracing::debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion finished"
            );
        }
        Self::first_choice_text(res)
    }
}

#[derive(Debug, Serialize)]
struct CreateCompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,

    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_matches_completions_api() {
        let body = CreateCompletionRequest {
            model: DEFAULT_MODEL,
            prompt: "Categorize",
            max_tokens: 10,
            temperature: 0.5,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "gpt-3.5-turbo-instruct",
                "prompt": "Categorize",
                "max_tokens": 10,
                "temperature": 0.5,
            })
        );
    }

    #[test]
    fn reads_first_choice_text() {
        let res: CreateCompletionResponse = serde_json::from_value(json!({
            "id": "cmpl-1",
            "object": "text_completion",
            "choices": [
                {"text": "\n\nTransportation", "index": 0, "finish_reason": "stop"},
                {"text": "Travel", "index": 1, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 120, "completion_tokens": 3, "total_tokens": 123}
        }))
        .unwrap();

        assert_eq!(
            OpenAiClient::first_choice_text(res).unwrap(),
            "\n\nTransportation"
        );
    }

    #[test]
    fn missing_choices_is_a_diagnostics_error() {
        let res: CreateCompletionResponse = serde_json::from_value(json!({"id": "cmpl-2"})).unwrap();
        let err = OpenAiClient::first_choice_text(res).unwrap_err();
        let diag = err.downcast_ref::<CompletionDiagnosticsError>().unwrap();
        assert_eq!(diag.stage, Stage::NoChoices);
    }

    #[test]
    fn from_settings_requires_api_key() {
        let settings = Settings {
            openai_api_key: None,
            sentry_dsn: None,
        };
        assert!(OpenAiClient::from_settings(&settings).is_err());
    }
}
