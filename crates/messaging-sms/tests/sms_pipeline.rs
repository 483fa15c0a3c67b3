//! 短信 worker 端到端测试
//!
//! 用内存消息流替代 Kafka 分区，经汇聚、分发、解码、渲染后交给记录型投递客户端。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use messaging_schemas::Envelope;
use messaging_schemas::sms::{MfaCode, SmsRecord};
use messaging_shared::delivery::{DeliveryClient, DeliveryError, DeliveryReceipt};
use messaging_shared::dispatch::{DispatchStats, Dispatcher, LoopState};
use messaging_shared::fan_in::{self, PartitionStream};
use messaging_shared::kafka::{PartitionSource, RawRecord};
use messaging_shared::pipeline::NotificationPipeline;
use messaging_sms::config::PhoneConfig;
use messaging_sms::templates::{SmsMessage, SmsRenderer};
use tokio::sync::watch;

#[derive(Default)]
struct RecordingClient {
    sent: Mutex<Vec<SmsMessage>>,
}

#[async_trait]
impl DeliveryClient<SmsMessage> for RecordingClient {
    async fn deliver(&self, message: &SmsMessage) -> Result<DeliveryReceipt, DeliveryError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(DeliveryReceipt {
            provider: "recording",
            message_id: Some("sms-1".to_string()),
        })
    }

    fn provider(&self) -> &'static str {
        "recording"
    }
}

fn source() -> PartitionSource {
    PartitionSource {
        topic: "messaging.sms".to_string(),
        partition: 0,
    }
}

fn stream_of(payloads: Vec<Vec<u8>>) -> PartitionStream {
    let records: Vec<_> = payloads
        .into_iter()
        .enumerate()
        .map(|(offset, payload)| Ok(RawRecord::new(source(), offset as i64, payload)))
        .collect();
    futures::stream::iter(records).boxed()
}

async fn wait_for(stats: &DispatchStats, delivered: u64, dropped: u64) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let snapshot = stats.snapshot();
            if snapshot.delivered == delivered && snapshot.dropped == dropped {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("处理任务未在预期时间内完成");
}

#[tokio::test]
async fn test_mfa_delivered_once_and_unknown_kind_dropped() {
    let client = Arc::new(RecordingClient::default());
    let pipeline = NotificationPipeline::new(
        SmsRenderer::new(&PhoneConfig {
            from_name: "RSOBicycle".to_string(),
        }),
        client.clone(),
    );

    let mfa = SmsRecord::Mfa(MfaCode {
        phone_number: "+15551234567".to_string(),
        code: "482913".to_string(),
    })
    .to_envelope_bytes();
    let unknown = Envelope::new(99, b"\x0a\x01x".to_vec()).encode_to_vec();

    let (queue, _fan_in) = fan_in::spawn_all(vec![(source(), stream_of(vec![mfa, unknown]))]);

    let dispatcher = Dispatcher::new(Arc::new(pipeline));
    let stats = dispatcher.stats();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loop_handle = tokio::spawn(dispatcher.run(queue, shutdown_rx));

    wait_for(&stats, 1, 1).await;

    assert_eq!(
        *client.sent.lock().unwrap(),
        vec![SmsMessage {
            to: "+15551234567".to_string(),
            from: "RSOBicycle".to_string(),
            text: "RSO-482913 is your RSO Bicycle activation code".to_string(),
        }]
    );

    shutdown_tx.send(true).unwrap();
    assert_eq!(loop_handle.await.unwrap(), LoopState::Stopped);
}

#[tokio::test]
async fn test_unknown_kind_is_decode_error_without_delivery() {
    let client = Arc::new(RecordingClient::default());
    let pipeline = NotificationPipeline::new(SmsRenderer::new(&PhoneConfig::default()), client.clone());

    let unknown = Envelope::new(99, Vec::new()).encode_to_vec();
    let err = pipeline.prepare(&unknown).unwrap_err();

    assert_eq!(err.code(), "UNKNOWN_DISCRIMINANT");
    assert!(client.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_short_buffers_never_reach_client() {
    let client = Arc::new(RecordingClient::default());
    let pipeline = NotificationPipeline::new(SmsRenderer::new(&PhoneConfig::default()), client.clone());

    for payload in [Vec::new(), vec![0x08]] {
        assert!(pipeline.prepare(&payload).is_err());
    }
    assert!(client.sent.lock().unwrap().is_empty());
}
