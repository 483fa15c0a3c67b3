//! 关闭协调
//!
//! 监听进程终止信号（SIGINT、SIGTERM、SIGABRT），首次收到时置位关闭标志，
//! 分发循环通过 `watch` channel 观察该标志并停止拉取新消息。
//! 置位是幂等的：之后的信号或重复调用 `trigger` 不再产生任何效果。

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::MessagingError;

/// 关闭协调器
#[derive(Clone)]
pub struct ShutdownCoordinator {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// 获取关闭信号的接收端
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// 置位关闭标志
    ///
    /// 只有第一次调用会通知观察者并返回 `true`。
    pub fn trigger(&self, reason: &str) -> bool {
        let first = self.tx.send_if_modified(|raised| {
            if *raised {
                false
            } else {
                *raised = true;
                true
            }
        });

        if first {
            info!(reason, "收到关闭请求，停止拉取新消息");
        } else {
            debug!(reason, "已在关闭中，忽略重复的关闭请求");
        }
        first
    }

    /// 注册信号处理并在后台监听
    ///
    /// 信号注册失败属于启动错误。
    pub fn spawn_signal_listener(&self) -> Result<JoinHandle<()>, MessagingError> {
        let mut signals = Signals::register()
            .map_err(|e| MessagingError::Startup(format!("注册信号处理失败: {e}")))?;
        let coordinator = self.clone();

        Ok(tokio::spawn(async move {
            loop {
                let name = signals.recv().await;
                coordinator.trigger(name);
            }
        }))
    }
}

#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    abort: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    // POSIX 规定的固定编号，所有 unix 平台一致
    const SIGABRT: i32 = 6;

    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            abort: signal(SignalKind::from_raw(Self::SIGABRT))?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
            _ = self.abort.recv() => "SIGABRT",
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        if tokio::signal::ctrl_c().await.is_err() {
            futures::future::pending::<()>().await;
        }
        "CTRL_C"
    }
}
