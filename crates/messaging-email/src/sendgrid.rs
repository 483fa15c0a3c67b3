//! SendGrid 邮件客户端
//!
//! 通过 SendGrid v3 API 发送动态模板邮件：
//! `POST {base_url}/v3/mail/send`，Bearer 鉴权，JSON 请求体。
//! 2xx 视为成功，消息 ID 取自 `X-Message-Id` 响应头。

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use messaging_shared::delivery::{DeliveryClient, DeliveryError, DeliveryReceipt};
use messaging_shared::error::MessagingError;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::SendGridConfig;
use crate::templates::EmailMessage;

const PROVIDER: &str = "sendgrid";

/// SendGrid 邮件客户端
pub struct SendGridClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl SendGridClient {
    pub fn new(config: &SendGridConfig, timeout: Duration) -> Result<Self, MessagingError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MessagingError::Startup(format!("创建 SendGrid HTTP 客户端失败: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v3/mail/send", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }
}

/// SendGrid 请求体
#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: EmailAddress<'a>,
    template_id: &'a str,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<EmailAddress<'a>>,
    dynamic_template_data: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl<'a> From<&'a EmailMessage> for MailSendRequest<'a> {
    fn from(message: &'a EmailMessage) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: &message.to,
                    name: None,
                }],
                dynamic_template_data: &message.substitutions,
            }],
            from: EmailAddress {
                email: &message.from.address,
                name: Some(&message.from.name),
            },
            template_id: &message.template_id,
        }
    }
}

#[async_trait]
impl DeliveryClient<EmailMessage> for SendGridClient {
    async fn deliver(&self, message: &EmailMessage) -> Result<DeliveryReceipt, DeliveryError> {
        debug!(
            to = %message.to,
            template_id = %message.template_id,
            "通过 SendGrid 发送邮件"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&MailSendRequest::from(message))
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %body, "SendGrid API error");
            return Err(DeliveryError::Rejected {
                status: status.as_u16().to_string(),
                reason: body,
            });
        }

        let message_id = response
            .headers()
            .get("X-Message-Id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(DeliveryReceipt {
            provider: PROVIDER,
            message_id,
        })
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }
}
