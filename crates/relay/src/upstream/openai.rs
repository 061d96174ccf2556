use async_trait::async_trait;
use axum::body::Bytes;
use config::RelayConfig;
use reqwest::{Client, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::de::IgnoredAny;

use crate::{error::RelayError, messages::CompletionRequest, upstream::Upstream};

/// Upstream speaking the OpenAI chat completions protocol, such as Groq.
pub(crate) struct OpenAiUpstream {
    client: Client,
    url: String,
    api_key: SecretString,
}

impl OpenAiUpstream {
    pub fn new(config: &RelayConfig) -> crate::Result<Self> {
        let Some(api_key) = config.api_key.clone() else {
            log::error!("Cannot create the upstream client without an API key");
            return Err(RelayError::internal("No upstream API key configured"));
        };

        let mut builder = Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            log::error!("Failed to create HTTP client for the upstream API: {e}");
            RelayError::internal("Failed to create the upstream HTTP client")
        })?;

        Ok(Self {
            client,
            url: config.completions_url(),
            api_key,
        })
    }
}

#[async_trait]
impl Upstream for OpenAiUpstream {
    async fn complete(&self, request: &CompletionRequest<'_>) -> crate::Result<Bytes> {
        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key.expose_secret()))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to send request to {}: {e}", self.url);
                RelayError::internal("Failed to reach the upstream completion service")
            })?;

        let status = response.status();

        let body = response.bytes().await.map_err(|e| {
            log::error!("Failed to read upstream response body ({status}): {e}");
            RelayError::internal("Failed to read the upstream response")
        })?;

        if !status.is_success() {
            return match serde_json::from_slice::<serde_json::Value>(&body) {
                Ok(details) => {
                    log::error!("Upstream API error ({status}): {details}");

                    Err(RelayError::Upstream {
                        status: status.as_u16(),
                        details,
                    })
                }
                Err(e) => {
                    log::error!(
                        "Upstream API error ({status}) with a body that is not JSON ({e}): {}",
                        String::from_utf8_lossy(&body)
                    );

                    Err(RelayError::internal("Failed to parse the upstream error response"))
                }
            };
        }

        if let Err(e) = serde_json::from_slice::<IgnoredAny>(&body) {
            log::error!("Failed to parse upstream chat completion response: {e}");
            log::error!("Raw response that failed to parse: {}", String::from_utf8_lossy(&body));

            return Err(RelayError::internal("Failed to parse the upstream response"));
        }

        Ok(body)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
