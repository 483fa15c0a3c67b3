//! Nexmo 短信客户端
//!
//! 通过 Nexmo（Vonage）SMS HTTP API 发送短信：
//! `POST {base_url}/sms/json`，表单提交凭据与短信内容。
//! 每条返回的消息状态都为 `"0"` 才算成功，任一非零状态视为服务商拒绝。

use std::time::Duration;

use async_trait::async_trait;
use messaging_shared::delivery::{DeliveryClient, DeliveryError, DeliveryReceipt};
use messaging_shared::error::MessagingError;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::NexmoConfig;
use crate::templates::SmsMessage;

const PROVIDER: &str = "nexmo";

/// Nexmo 短信客户端
pub struct NexmoClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_secret: String,
}

impl NexmoClient {
    pub fn new(config: &NexmoConfig, timeout: Duration) -> Result<Self, MessagingError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MessagingError::Startup(format!("创建 Nexmo HTTP 客户端失败: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/sms/json", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }
}

/// Nexmo 响应体
#[derive(Debug, Deserialize)]
struct SendSmsResponse {
    #[serde(default)]
    messages: Vec<MessageStatus>,
}

#[derive(Debug, Deserialize)]
struct MessageStatus {
    status: String,
    #[serde(rename = "message-id")]
    message_id: Option<String>,
    #[serde(rename = "error-text")]
    error_text: Option<String>,
}

fn into_receipt(response: SendSmsResponse) -> Result<DeliveryReceipt, DeliveryError> {
    if response.messages.is_empty() {
        return Err(DeliveryError::InvalidResponse(
            "响应中没有消息状态".to_string(),
        ));
    }

    if let Some(rejected) = response.messages.iter().find(|m| m.status != "0") {
        return Err(DeliveryError::Rejected {
            status: rejected.status.clone(),
            reason: rejected.error_text.clone().unwrap_or_default(),
        });
    }

    Ok(DeliveryReceipt {
        provider: PROVIDER,
        message_id: response.messages.into_iter().find_map(|m| m.message_id),
    })
}

#[async_trait]
impl DeliveryClient<SmsMessage> for NexmoClient {
    async fn deliver(&self, message: &SmsMessage) -> Result<DeliveryReceipt, DeliveryError> {
        debug!(to = %message.to, from = %message.from, "通过 Nexmo 发送短信");

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("api_key", self.api_key.as_str()),
                ("api_secret", self.api_secret.as_str()),
                ("from", message.from.as_str()),
                ("to", message.to.as_str()),
                ("text", message.text.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %body, "Nexmo API error");
            return Err(DeliveryError::Rejected {
                status: status.as_u16().to_string(),
                reason: body,
            });
        }

        let body: SendSmsResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;

        into_receipt(body)
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SendSmsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_success_takes_first_message_id() {
        let receipt = into_receipt(parse(
            r#"{"message-count":"1","messages":[{"to":"15551234567","message-id":"0A0000000123ABCD1","status":"0"}]}"#,
        ))
        .unwrap();

        assert_eq!(receipt.provider, "nexmo");
        assert_eq!(receipt.message_id.as_deref(), Some("0A0000000123ABCD1"));
    }

    #[test]
    fn test_nonzero_status_is_rejected() {
        let err = into_receipt(parse(
            r#"{"message-count":"1","messages":[{"status":"2","error-text":"Missing to param"}]}"#,
        ))
        .unwrap_err();

        match err {
            DeliveryError::Rejected { status, reason } => {
                assert_eq!(status, "2");
                assert_eq!(reason, "Missing to param");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_messages_is_invalid() {
        let err = into_receipt(parse(r#"{"message-count":"0","messages":[]}"#)).unwrap_err();
        assert_eq!(err.code(), "DELIVERY_INVALID_RESPONSE");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = NexmoClient::new(
            &NexmoConfig {
                base_url: "http://127.0.0.1:1/".to_string(),
                ..Default::default()
            },
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:1/sms/json");
    }
}
