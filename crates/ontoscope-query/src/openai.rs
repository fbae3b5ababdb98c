//! OpenAI-compatible chat completion client

use crate::completion::{CompletionRequest, CompletionService, CompletionSettings};
use crate::error::CompletionError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Connect timeout for every request
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Client for `POST <base_url>/chat/completions`
pub struct OpenAiCompletion {
    client: Client,
    settings: CompletionSettings,
}

impl OpenAiCompletion {
    pub fn new(settings: CompletionSettings) -> Result<Self, CompletionError> {
        if !settings.is_configured() {
            return Err(CompletionError::NotConfigured(
                "set an API key with `ontoscope config set api_key <key>` or OPENAI_API_KEY"
                    .to_string(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    fn body(&self, request: &CompletionRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.settings.model_or_default(),
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": request.temperature,
        })
    }
}

fn transport_error(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        CompletionError::Timeout(err.to_string())
    } else {
        CompletionError::Network(err.to_string())
    }
}

/// Pull `choices[0].message.content` out of a chat completion response
pub fn extract_content(data: &serde_json::Value) -> Result<String, CompletionError> {
    data["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            CompletionError::InvalidResponse("missing choices[0].message.content".to_string())
        })
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let url = self.settings.endpoint();
        tracing::debug!(
            "POST {} (model {}, temperature {})",
            url,
            self.settings.model_or_default(),
            request.temperature
        );

        let mut builder = self.client.post(&url).json(&self.body(request));
        if self.settings.sends_auth_header() {
            builder = builder.bearer_auth(self.settings.api_key.trim());
        }

        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Completion service returned {}: {}", status, body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CompletionError::Auth {
                    status: status.as_u16(),
                    body,
                },
                _ => CompletionError::Api {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        let content = extract_content(&data)?;
        tracing::debug!("Completion returned {} chars", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let result = OpenAiCompletion::new(CompletionSettings::default());
        assert!(matches!(result, Err(CompletionError::NotConfigured(_))));
    }

    #[test]
    fn test_body_shape() {
        let client = OpenAiCompletion::new(CompletionSettings {
            api_key: "demo".into(),
            ..CompletionSettings::default()
        })
        .unwrap();

        let body = client.body(&CompletionRequest::new("system", "user").with_temperature(0.7));
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_extract_content() {
        let data = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "QUERY_TYPE: classes" } }]
        });
        assert_eq!(extract_content(&data).unwrap(), "QUERY_TYPE: classes");

        let empty = serde_json::json!({ "choices": [] });
        assert!(matches!(
            extract_content(&empty),
            Err(CompletionError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = OpenAiCompletion::new(CompletionSettings {
            base_url: "http://127.0.0.1:9".into(),
            api_key: "demo".into(),
            timeout_secs: 2,
            ..CompletionSettings::default()
        })
        .unwrap();

        let err = client
            .complete(&CompletionRequest::new("s", "u"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CompletionError::Network(_) | CompletionError::Timeout(_)
        ));
    }
}
