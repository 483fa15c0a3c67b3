//! 分发循环
//!
//! 单一控制循环，同时等待两个事件：共享队列上有消息、关闭信号被触发。
//! 收到消息时立即为其启动一个独立的处理任务并回到等待，从不等待处理任务完成；
//! 收到关闭信号时直接退出，不排空队列，也不等待仍在执行的处理任务。
//! 投递因此是尽力而为的：进程可能在投递进行中退出。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::delivery::DeliveryReceipt;
use crate::error::MessagingError;
use crate::kafka::RawRecord;

/// 单条消息处理成功的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleOutcome {
    /// 判别值名称（如 `MFA`）
    pub kind: &'static str,
    pub receipt: DeliveryReceipt,
}

/// 单条消息的处理器
///
/// 每条消息在独立任务中调用一次；处理器内部不与其他任务共享可变状态。
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    async fn handle(&self, record: RawRecord) -> Result<HandleOutcome, MessagingError>;
}

/// 分发循环状态
///
/// 只有一种转换：`Running` -> `Stopped`，且只能由关闭信号触发。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// 分发统计
///
/// 由分发循环与所有处理任务共享，处理任务结束时各自累加。
#[derive(Debug, Default)]
pub struct DispatchStats {
    dispatched: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

/// 某一时刻的统计快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchSnapshot {
    pub dispatched: u64,
    pub delivered: u64,
    pub dropped: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// 分发器
pub struct Dispatcher<H> {
    handler: Arc<H>,
    stats: Arc<DispatchStats>,
}

impl<H: MessageHandler> Dispatcher<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            stats: Arc::new(DispatchStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    /// 运行分发循环，直到收到关闭信号
    ///
    /// 所有分区流都结束后队列会关闭，此时循环保持 `Running` 并空闲等待关闭信号。
    /// 关闭信号的发送端被丢弃同样视为关闭。
    pub async fn run(
        self,
        mut queue: mpsc::Receiver<RawRecord>,
        mut shutdown: watch::Receiver<bool>,
    ) -> LoopState {
        let mut state = LoopState::Running;
        let mut queue_open = true;

        if *shutdown.borrow_and_update() {
            state = LoopState::Stopped;
        }

        info!("分发循环已启动");

        while state == LoopState::Running {
            tokio::select! {
                // 偏向关闭信号，保证收到关闭时能尽快退出
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow_and_update() {
                        state = LoopState::Stopped;
                    }
                }

                record = queue.recv(), if queue_open => {
                    match record {
                        Some(record) => self.dispatch(record),
                        None => {
                            warn!("所有分区消息流均已结束，等待关闭信号");
                            queue_open = false;
                        }
                    }
                }
            }
        }

        let snapshot = self.stats.snapshot();
        info!(
            dispatched = snapshot.dispatched,
            delivered = snapshot.delivered,
            dropped = snapshot.dropped,
            in_flight = snapshot
                .dispatched
                .saturating_sub(snapshot.delivered + snapshot.dropped),
            "分发循环已停止，未完成的处理任务不再等待"
        );

        state
    }

    /// 为一条消息启动处理任务，不保留 JoinHandle
    fn dispatch(&self, record: RawRecord) {
        self.stats.dispatched.fetch_add(1, Ordering::Relaxed);

        debug!(
            source = %record.source,
            offset = record.offset,
            "分发消息"
        );

        let handler = Arc::clone(&self.handler);
        let stats = Arc::clone(&self.stats);
        tokio::spawn(handle_one(handler, stats, record));
    }
}

/// 处理任务：任何错误都在这里终结，不会传回分发循环
async fn handle_one<H: MessageHandler>(
    handler: Arc<H>,
    stats: Arc<DispatchStats>,
    record: RawRecord,
) {
    let source = record.source.clone();
    let offset = record.offset;
    let start = Instant::now();

    match handler.handle(record).await {
        Ok(outcome) => {
            stats.delivered.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("messages_delivered_total", "kind" => outcome.kind).increment(1);
            metrics::histogram!("delivery_duration_seconds").record(start.elapsed().as_secs_f64());

            info!(
                %source,
                offset,
                kind = outcome.kind,
                provider = outcome.receipt.provider,
                message_id = ?outcome.receipt.message_id,
                "消息投递成功"
            );
        }
        Err(e) => {
            stats.dropped.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("messages_dropped_total", "reason" => e.code()).increment(1);

            // 不重试、不重新入队
            warn!(
                %source,
                offset,
                error = %e,
                code = e.code(),
                "消息处理失败，已丢弃"
            );
        }
    }
}
