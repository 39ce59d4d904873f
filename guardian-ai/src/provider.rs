use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use guardian_common::{Error, TransportError};

use crate::models::{ANTHROPIC_VERSION, GatewayConfig, GatewayRequest};
use crate::traits::AiGateway;

/// Anthropic Messages API gateway
pub struct AnthropicGateway {
    config: GatewayConfig,
    client: Client,
}

impl AnthropicGateway {
    /// Create a gateway with the configured request timeout.
    pub fn new(config: GatewayConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn map_send_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.config.timeout())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Request body for the Messages API. Text-only prompts are sent as a plain
/// string; image prompts as an image block followed by a text block.
pub fn build_message_body(model: &str, request: &GatewayRequest) -> Value {
    let content = match &request.image {
        Some(image) => json!([
            {
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": image.media_type,
                    "data": image.to_base64(),
                }
            },
            {
                "type": "text",
                "text": request.prompt,
            }
        ]),
        None => json!(request.prompt),
    };

    json!({
        "model": model,
        "max_tokens": request.max_tokens,
        "messages": [{
            "role": "user",
            "content": content,
        }],
    })
}

/// Pull the first text block out of a Messages API reply.
pub fn extract_text(data: &Value) -> Option<String> {
    data.get("content")?
        .as_array()?
        .iter()
        .find(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
        .and_then(|block| block.get("text"))
        .and_then(|text| text.as_str())
        .map(|s| s.to_string())
}

#[async_trait]
impl AiGateway for AnthropicGateway {
    async fn invoke(&self, request: &GatewayRequest) -> Result<String, Error> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Configuration("Anthropic API key not configured".to_string()))?;

        let body = build_message_body(&self.config.model, request);
        debug!(
            "Calling {}/messages model={} max_tokens={} image={:?}",
            self.config.api_base, self.config.model, request.max_tokens, request.image
        );

        let response = self
            .client
            .post(format!("{}/messages", self.config.api_base))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            error!("Gateway returned {}: {}", status, response_text);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: response_text,
            }
            .into());
        }

        let data: Value = serde_json::from_str(&response_text).map_err(|e| {
            error!("Failed to parse gateway response as JSON: {:?}", e);
            TransportError::MalformedResponse(format!("non-JSON body: {}", e))
        })?;

        extract_text(&data).ok_or_else(|| {
            error!("Gateway response has no text block: {}", response_text);
            TransportError::MalformedResponse("response has no text content".to_string()).into()
        })
    }
}
