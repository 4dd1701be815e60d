//! SMS delivery through an HTTP gateway.
//!
//! The gateway accepts `POST {SMS_GATEWAY_URL}` with a JSON body
//! `{"to", "message", "reference"}` and a bearer API key. One attempt per
//! message; a non-2xx response is an error.

use std::time::Duration;

use serde::Serialize;

use super::OutboundMessage;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("SMS gateway returned HTTP {0}")]
    HttpStatus(u16),
}

#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub gateway_url: String,
    pub api_key: Option<String>,
}

impl SmsConfig {
    /// Returns `None` when `SMS_GATEWAY_URL` is unset (SMS disabled).
    pub fn from_env() -> Option<Self> {
        let gateway_url = std::env::var("SMS_GATEWAY_URL").ok()?;
        Some(Self {
            gateway_url,
            api_key: std::env::var("SMS_API_KEY").ok(),
        })
    }
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    to: &'a str,
    message: &'a str,
    reference: &'a str,
}

pub struct SmsDelivery {
    client: reqwest::Client,
    config: SmsConfig,
}

impl SmsDelivery {
    pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Make one send attempt. SMS has no subject; only the body is sent.
    pub async fn send(&self, message: &OutboundMessage) -> Result<(), SmsError> {
        let mut request = self.client.post(&self.config.gateway_url).json(&GatewayRequest {
            to: &message.to,
            message: &message.body,
            reference: &message.reference,
        });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SmsError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(to = %message.to, reference = %message.reference, "SMS sent");
        Ok(())
    }
}
