//! 通知处理管道
//!
//! 单条消息的完整流程：解码信封 -> 按判别值解码记录 -> 渲染 -> 调用投递客户端。
//! 渠道之间唯一的差别是渲染器与投递客户端，管道本身对两个渠道通用。

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use messaging_schemas::{TypedRecord, decode_envelope};
use tracing::debug;

use crate::delivery::DeliveryClient;
use crate::dispatch::{HandleOutcome, MessageHandler};
use crate::error::MessagingError;
use crate::kafka::RawRecord;

/// 渲染器：把具体记录映射为服务商所需的消息
///
/// 实现中对记录族使用穷尽 `match`，新增判别值而没有对应模板时无法通过编译。
pub trait Renderer: Send + Sync + 'static {
    type Record: TypedRecord;
    type Message: Debug + Send + Sync + 'static;

    fn render(&self, record: Self::Record) -> Self::Message;
}

/// 通用通知管道
pub struct NotificationPipeline<R: Renderer> {
    renderer: R,
    client: Arc<dyn DeliveryClient<R::Message>>,
}

impl<R: Renderer> NotificationPipeline<R> {
    pub fn new(renderer: R, client: Arc<dyn DeliveryClient<R::Message>>) -> Self {
        Self { renderer, client }
    }

    /// 解码并渲染，不涉及任何 I/O
    pub fn prepare(&self, payload: &[u8]) -> Result<(&'static str, R::Message), MessagingError> {
        let envelope = decode_envelope(payload)?;
        let record = R::Record::decode(envelope.kind, &envelope.data)?;
        let kind = record.kind_name();
        Ok((kind, self.renderer.render(record)))
    }
}

#[async_trait]
impl<R: Renderer> MessageHandler for NotificationPipeline<R> {
    async fn handle(&self, record: RawRecord) -> Result<HandleOutcome, MessagingError> {
        let (kind, message) = self.prepare(&record.payload)?;

        debug!(
            channel = R::Record::CHANNEL,
            kind,
            provider = self.client.provider(),
            "消息已渲染，开始投递"
        );

        let receipt = self.client.deliver(&message).await?;
        Ok(HandleOutcome { kind, receipt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::{DeliveryError, DeliveryReceipt};
    use crate::kafka::PartitionSource;
    use messaging_schemas::sms::{MfaCode, SmsRecord};
    use std::sync::Mutex;

    struct PlainRenderer;

    impl Renderer for PlainRenderer {
        type Record = SmsRecord;
        type Message = String;

        fn render(&self, record: SmsRecord) -> String {
            match record {
                SmsRecord::Mfa(mfa) => format!("{}:{}", mfa.phone_number, mfa.code),
            }
        }
    }

    #[derive(Default)]
    struct RecordingClient {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl DeliveryClient<String> for RecordingClient {
        async fn deliver(&self, message: &String) -> Result<DeliveryReceipt, DeliveryError> {
            self.sent.lock().unwrap().push(message.clone());
            if self.fail {
                return Err(DeliveryError::Transport("connection reset".to_string()));
            }
            Ok(DeliveryReceipt {
                provider: "recording",
                message_id: Some("m-1".to_string()),
            })
        }

        fn provider(&self) -> &'static str {
            "recording"
        }
    }

    fn raw(payload: Vec<u8>) -> RawRecord {
        RawRecord::new(
            PartitionSource {
                topic: "messaging.sms".to_string(),
                partition: 0,
            },
            7,
            payload,
        )
    }

    fn mfa_payload() -> Vec<u8> {
        SmsRecord::Mfa(MfaCode {
            phone_number: "+15551234567".to_string(),
            code: "482913".to_string(),
        })
        .to_envelope_bytes()
    }

    #[tokio::test]
    async fn test_handle_delivers_rendered_message() {
        let client = Arc::new(RecordingClient::default());
        let pipeline = NotificationPipeline::new(PlainRenderer, client.clone());

        let outcome = pipeline.handle(raw(mfa_payload())).await.unwrap();

        assert_eq!(outcome.kind, "MFA");
        assert_eq!(outcome.receipt.message_id.as_deref(), Some("m-1"));
        assert_eq!(*client.sent.lock().unwrap(), vec!["+15551234567:482913"]);
    }

    #[tokio::test]
    async fn test_handle_decode_failure_skips_delivery() {
        let client = Arc::new(RecordingClient::default());
        let pipeline = NotificationPipeline::new(PlainRenderer, client.clone());

        let err = pipeline.handle(raw(vec![0x08])).await.unwrap_err();

        assert!(matches!(err, MessagingError::Decode(_)));
        assert!(client.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handle_delivery_failure_propagates() {
        let client = Arc::new(RecordingClient {
            fail: true,
            ..Default::default()
        });
        let pipeline = NotificationPipeline::new(PlainRenderer, client.clone());

        let err = pipeline.handle(raw(mfa_payload())).await.unwrap_err();

        assert_eq!(err.code(), "DELIVERY_TRANSPORT");
        assert_eq!(client.sent.lock().unwrap().len(), 1);
    }
}
