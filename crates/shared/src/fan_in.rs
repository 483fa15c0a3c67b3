//! 分区汇聚
//!
//! 每个订阅分区对应一个轻量任务，把该分区的消息按到达顺序推入共享的有界队列。
//! 分区内顺序得到保持；不同分区之间的先后取决于到达时机，不作保证。
//! 队列满时生产者阻塞，这是整个系统唯一的背压来源。

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::MessagingError;
use crate::kafka::{PartitionSource, RawRecord};

/// 单个分区的消息流
pub type PartitionStream = BoxStream<'static, Result<RawRecord, MessagingError>>;

/// 汇聚任务的结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanInExit {
    /// 源消息流正常结束
    SourceClosed,
    /// 源消息流报告错误；不重新订阅
    SourceFailed,
    /// 分发端已停止接收
    QueueClosed,
}

impl FanInExit {
    fn as_str(&self) -> &'static str {
        match self {
            Self::SourceClosed => "source_closed",
            Self::SourceFailed => "source_failed",
            Self::QueueClosed => "queue_closed",
        }
    }
}

/// 汇聚任务的执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanInReport {
    pub forwarded: u64,
    pub exit: FanInExit,
}

/// 持续把分区消息搬运到共享队列，直到源消息流结束或出错
///
/// 任务只持有发送端的克隆，结束时仅释放自己的那一份，不会主动关闭共享队列。
pub async fn forward_partition<S>(
    source: PartitionSource,
    mut stream: S,
    queue: mpsc::Sender<RawRecord>,
) -> FanInReport
where
    S: Stream<Item = Result<RawRecord, MessagingError>> + Send + Unpin,
{
    let mut forwarded = 0u64;

    let exit = loop {
        match stream.next().await {
            Some(Ok(record)) => {
                metrics::counter!(
                    "messages_received_total",
                    "topic" => source.topic.clone()
                )
                .increment(1);

                if queue.send(record).await.is_err() {
                    warn!(%source, "共享队列已关闭，分区汇聚任务退出");
                    break FanInExit::QueueClosed;
                }
                forwarded += 1;
            }
            Some(Err(e)) => {
                error!(%source, error = %e, code = e.code(), "分区消息流出错，汇聚任务退出");
                break FanInExit::SourceFailed;
            }
            None => {
                info!(%source, "分区消息流已结束");
                break FanInExit::SourceClosed;
            }
        }
    };

    metrics::counter!(
        "partition_streams_closed_total",
        "topic" => source.topic.clone(),
        "outcome" => exit.as_str()
    )
    .increment(1);

    FanInReport { forwarded, exit }
}

/// 为单个分区启动汇聚任务
pub fn spawn_partition(
    source: PartitionSource,
    stream: PartitionStream,
    queue: mpsc::Sender<RawRecord>,
) -> JoinHandle<FanInReport> {
    tokio::spawn(forward_partition(source, stream, queue))
}

/// 为所有分区启动汇聚任务并返回共享队列的接收端
///
/// 队列容量等于分区数量（至少为 1）。
pub fn spawn_all(
    partitions: Vec<(PartitionSource, PartitionStream)>,
) -> (mpsc::Receiver<RawRecord>, Vec<JoinHandle<FanInReport>>) {
    let (tx, rx) = mpsc::channel(partitions.len().max(1));

    let handles = partitions
        .into_iter()
        .map(|(source, stream)| spawn_partition(source, stream, tx.clone()))
        .collect();

    (rx, handles)
}
