//! Worker 装配
//!
//! 把分区消费、汇聚与分发循环串起来：分配分区 -> 每分区一个汇聚任务 -> 单一分发循环。
//! 两个渠道的 worker 只在消息处理器上不同。

use std::sync::Arc;

use tracing::info;

use crate::config::KafkaConfig;
use crate::dispatch::{Dispatcher, LoopState, MessageHandler};
use crate::error::MessagingError;
use crate::fan_in;
use crate::kafka::KafkaPartitionConsumer;
use crate::shutdown::ShutdownCoordinator;

/// 通知 worker
pub struct NotificationWorker<H> {
    consumer: KafkaPartitionConsumer,
    kafka: KafkaConfig,
    handler: Arc<H>,
}

impl<H: MessageHandler> NotificationWorker<H> {
    /// 创建 worker
    ///
    /// 未配置任何分区属于启动错误。
    pub fn new(kafka: &KafkaConfig, handler: Arc<H>) -> Result<Self, MessagingError> {
        if kafka.topics.is_empty() {
            return Err(MessagingError::Startup("未配置任何订阅分区".to_string()));
        }

        let consumer = KafkaPartitionConsumer::new(kafka)?;
        Ok(Self {
            consumer,
            kafka: kafka.clone(),
            handler,
        })
    }

    /// 启动消费与分发，直到关闭信号触发
    ///
    /// 返回时不等待仍在执行的处理任务与汇聚任务。
    pub async fn run(self, shutdown: &ShutdownCoordinator) -> Result<LoopState, MessagingError> {
        let partitions = self.consumer.assign(&self.kafka.topics)?;
        let partition_count = partitions.len();

        let _event_loop = self.consumer.spawn_event_loop(shutdown.subscribe());
        let (queue, _fan_in) = fan_in::spawn_all(partitions);

        info!(partitions = partition_count, "通知 worker 已启动");

        let state = Dispatcher::new(self.handler)
            .run(queue, shutdown.subscribe())
            .await;

        info!(?state, "通知 worker 已停止");
        Ok(state)
    }
}
