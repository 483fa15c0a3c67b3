//! 关闭协调器与分发循环的集成测试
//!
//! 分区流永不结束、处理任务永不完成时，触发关闭后分发循环仍应立即停止。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use messaging_shared::dispatch::{Dispatcher, HandleOutcome, LoopState, MessageHandler};
use messaging_shared::error::MessagingError;
use messaging_shared::fan_in::{self, PartitionStream};
use messaging_shared::kafka::{PartitionSource, RawRecord};
use messaging_shared::shutdown::ShutdownCoordinator;

/// 记录调用次数后永久挂起
#[derive(Default)]
struct HangingHandler {
    calls: AtomicUsize,
}

#[async_trait]
impl MessageHandler for HangingHandler {
    async fn handle(&self, _record: RawRecord) -> Result<HandleOutcome, MessagingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        futures::future::pending().await
    }
}

/// 先产出若干消息，然后永远不结束
fn endless(partition: i32, count: i64) -> PartitionStream {
    let source = PartitionSource {
        topic: "messaging.sms".to_string(),
        partition,
    };
    let records: Vec<_> = (0..count)
        .map(|offset| Ok(RawRecord::new(source.clone(), offset, vec![1, 2])))
        .collect();
    futures::stream::iter(records)
        .chain(futures::stream::pending())
        .boxed()
}

#[tokio::test]
async fn test_trigger_stops_loop_with_hanging_handlers_and_open_streams() {
    let partitions = (0..2)
        .map(|p| {
            (
                PartitionSource {
                    topic: "messaging.sms".to_string(),
                    partition: p,
                },
                endless(p, 3),
            )
        })
        .collect();
    let (queue, fan_in_handles) = fan_in::spawn_all(partitions);

    let handler = Arc::new(HangingHandler::default());
    let dispatcher = Dispatcher::new(Arc::clone(&handler));
    let stats = dispatcher.stats();

    let coordinator = ShutdownCoordinator::new();
    let loop_handle = tokio::spawn(dispatcher.run(queue, coordinator.subscribe()));

    tokio::time::timeout(Duration::from_secs(2), async {
        while handler.calls.load(Ordering::SeqCst) < 6 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("消息未全部分发");

    assert!(coordinator.trigger("test"));
    let state = tokio::time::timeout(Duration::from_millis(500), loop_handle)
        .await
        .expect("分发循环未及时退出")
        .unwrap();

    assert_eq!(state, LoopState::Stopped);
    let snapshot = stats.snapshot();
    assert_eq!(snapshot.dispatched, 6);
    assert_eq!(snapshot.delivered + snapshot.dropped, 0);

    // 汇聚任务不受关闭影响，由进程退出回收
    for handle in fan_in_handles {
        handle.abort();
    }
}
