//! 测试消息发布工具
//!
//! 构造短信或邮件信封并写入指定的主题分区，用于本地端到端联调。

pub mod cli;

use messaging_shared::config::KafkaConfig;
use messaging_shared::kafka::KafkaProducer;
use tracing::info;
use uuid::Uuid;

use crate::cli::Commands;

/// 构造信封并发送到目标分区
pub async fn publish(brokers: &str, command: &Commands) -> anyhow::Result<()> {
    let target = command.target();
    let payload = command.to_envelope_bytes();

    let producer = KafkaProducer::new(&KafkaConfig {
        brokers: brokers.to_string(),
        client_id: "mock-publisher".to_string(),
        ..Default::default()
    })?;

    let key = Uuid::new_v4().to_string();
    let (partition, offset) = producer
        .send_to_partition(&target.topic, target.partition, &key, &payload)
        .await?;

    info!(
        topic = %target.topic,
        partition,
        offset,
        bytes = payload.len(),
        "测试消息已发布"
    );
    Ok(())
}
