//! Kafka 基础设施封装
//!
//! 将 rdkafka 的底层 API 封装为分区级别的消息流，统一消息所有权转换与错误映射。
//! worker 采用手动分配分区（不加入消费组、不提交位点），每个分区拆分为独立队列，
//! 以抽象的消息流形式交给汇聚任务。

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::stream_consumer::StreamPartitionQueue;
use rdkafka::consumer::{Consumer, DefaultConsumerContext, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::{Offset, TopicPartitionList};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{KafkaConfig, TopicPartitionConfig};
use crate::error::MessagingError;
use crate::fan_in::PartitionStream;

// ---------------------------------------------------------------------------
// RawRecord
// ---------------------------------------------------------------------------

/// 消息来源分区
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionSource {
    pub topic: String,
    pub partition: i32,
}

impl std::fmt::Display for PartitionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.topic, self.partition)
    }
}

/// 消费到的 Kafka 消息的统一表示
///
/// 将 rdkafka 的 `BorrowedMessage`（带生命周期约束）转换为拥有所有权的结构体，
/// 使消息可以安全地经过共享队列交给独立的处理任务。
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub source: PartitionSource,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub payload: Vec<u8>,
    pub timestamp: Option<i64>,
}

impl RawRecord {
    /// 构造一条没有 key 与时间戳的记录
    pub fn new(source: PartitionSource, offset: i64, payload: Vec<u8>) -> Self {
        Self {
            source,
            offset,
            key: None,
            payload,
            timestamp: None,
        }
    }

    /// 从 rdkafka 的借用消息构造，提取并拥有所有字段
    fn from_borrowed(msg: &BorrowedMessage<'_>) -> Self {
        Self {
            source: PartitionSource {
                topic: msg.topic().to_string(),
                partition: msg.partition(),
            },
            offset: msg.offset(),
            key: msg.key().map(|k| k.to_vec()),
            payload: msg.payload().map(|p| p.to_vec()).unwrap_or_default(),
            timestamp: msg.timestamp().to_millis(),
        }
    }
}

// ---------------------------------------------------------------------------
// KafkaPartitionConsumer
// ---------------------------------------------------------------------------

/// 主队列丢弃消息时的指标原因标签
const UNSPLIT_PARTITION: &str = "unsplit_partition";

/// 按分区拆分的 Kafka 消费者
///
/// 主队列仍需持续轮询以处理客户端事件，由 `spawn_event_loop` 负责；
/// 各分区的消息只会出现在 `assign` 返回的分区流中。
pub struct KafkaPartitionConsumer {
    consumer: Arc<StreamConsumer>,
    start_offset: Offset,
}

impl KafkaPartitionConsumer {
    /// 创建消费者
    ///
    /// 关闭自动提交：位点管理不属于 worker 的职责。
    pub fn new(config: &KafkaConfig) -> Result<Self, MessagingError> {
        let start_offset = parse_start_offset(&config.start_offset)?;

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("client.id", &config.client_id)
            .set("group.id", &config.client_id)
            .set("enable.auto.commit", "false")
            .set("enable.auto.offset.store", "false")
            .create()
            .map_err(|e| MessagingError::Kafka(format!("创建消费者失败: {e}")))?;

        info!(
            brokers = %config.brokers,
            client_id = %config.client_id,
            "Kafka 消费者已初始化"
        );
        Ok(Self {
            consumer: Arc::new(consumer),
            start_offset,
        })
    }

    /// 分配分区并为每个分区返回独立的消息流
    pub fn assign(
        &self,
        partitions: &[TopicPartitionConfig],
    ) -> Result<Vec<(PartitionSource, PartitionStream)>, MessagingError> {
        let mut tpl = TopicPartitionList::new();
        for p in partitions {
            tpl.add_partition_offset(&p.name, p.partition_id, self.start_offset)
                .map_err(|e| MessagingError::Kafka(format!("无效的分区位点: {e}")))?;
        }

        self.consumer
            .assign(&tpl)
            .map_err(|e| MessagingError::Kafka(format!("分配分区失败: {e}")))?;

        let mut streams = Vec::with_capacity(partitions.len());
        for p in partitions {
            let source = PartitionSource {
                topic: p.name.clone(),
                partition: p.partition_id,
            };

            let queue = self
                .consumer
                .split_partition_queue(&p.name, p.partition_id)
                .ok_or_else(|| {
                    MessagingError::Kafka(format!("拆分分区队列失败: {source}"))
                })?;

            info!(topic = %p.name, partition = p.partition_id, "已订阅分区");
            streams.push((source.clone(), partition_stream(source, queue)));
        }

        Ok(streams)
    }

    /// 轮询主队列，驱动客户端事件回调，直到收到关闭信号
    pub fn spawn_event_loop(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let consumer = Arc::clone(&self.consumer);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            debug!("Kafka 主队列轮询退出");
                            break;
                        }
                    }

                    result = consumer.recv() => {
                        match result {
                            Ok(msg) => {
                                drop_unsplit(msg.topic(), msg.partition(), msg.offset())
                            }
                            Err(e) => error!(error = %e, "Kafka 客户端错误"),
                        }
                    }
                }
            }
        })
    }
}

/// 主队列上的消息不属于任何分区流，记录后丢弃
fn drop_unsplit(topic: &str, partition: i32, offset: i64) {
    metrics::counter!("messages_dropped_total", "reason" => UNSPLIT_PARTITION).increment(1);
    warn!(topic, partition, offset, "主队列收到未拆分分区的消息，已丢弃");
}

/// 将分区队列包装为拥有所有权的消息流
///
/// 每次拉取都在借用结束前转换为 `RawRecord`，因此流本身是 `'static` 的。
fn partition_stream(
    source: PartitionSource,
    queue: StreamPartitionQueue<DefaultConsumerContext>,
) -> PartitionStream {
    futures::stream::unfold(queue, move |queue| {
        let source = source.clone();
        async move {
            let item = match queue.recv().await {
                Ok(msg) => Ok(RawRecord::from_borrowed(&msg)),
                Err(e) => Err(MessagingError::SourceStream {
                    topic: source.topic,
                    partition: source.partition,
                    reason: e.to_string(),
                }),
            };
            Some((item, queue))
        }
    })
    .boxed()
}

fn parse_start_offset(value: &str) -> Result<Offset, MessagingError> {
    match value {
        "earliest" | "oldest" | "beginning" => Ok(Offset::Beginning),
        "latest" | "newest" | "end" => Ok(Offset::End),
        other => other
            .parse::<i64>()
            .map(Offset::Offset)
            .map_err(|_| MessagingError::Startup(format!("无法识别的起始位点: {other}"))),
    }
}

// ---------------------------------------------------------------------------
// KafkaProducer
// ---------------------------------------------------------------------------

/// Kafka 生产者
///
/// 封装 `FutureProducer`，内部已派生 Clone（`FutureProducer` 本身是 Arc 包装的）。
#[derive(Clone)]
pub struct KafkaProducer {
    producer: FutureProducer,
}

impl KafkaProducer {
    /// 根据配置创建生产者
    pub fn new(config: &KafkaConfig) -> Result<Self, MessagingError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("client.id", &config.client_id)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| MessagingError::Kafka(format!("创建生产者失败: {e}")))?;

        info!(brokers = %config.brokers, "Kafka 生产者已初始化");
        Ok(Self { producer })
    }

    /// 向指定分区发送原始字节消息
    pub async fn send_to_partition(
        &self,
        topic: &str,
        partition: i32,
        key: &str,
        payload: &[u8],
    ) -> Result<(i32, i64), MessagingError> {
        let record = FutureRecord::to(topic)
            .partition(partition)
            .key(key)
            .payload(payload);

        // rdkafka 0.39+ 返回 Delivery 结构体而非元组
        let delivery = self
            .producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(e, _)| MessagingError::Kafka(format!("发送消息失败: {e}")))?;

        debug!(
            topic,
            key,
            partition = delivery.partition,
            offset = delivery.offset,
            "消息已发送"
        );
        Ok((delivery.partition, delivery.offset))
    }
}

// ---------------------------------------------------------------------------
// 测试
// ---------------------------------------------------------------------------
