//! 投递客户端抽象
//!
//! 通过 `DeliveryClient` trait 抽象外部服务商（短信、邮件）的发送行为。
//! 核心只关心成功与否以及服务商返回的消息标识，用于日志追踪。
//! 客户端在多个处理任务间通过 `Arc` 共享，实现必须是无状态或内部同步的。

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// 投递回执
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub provider: &'static str,
    /// 服务商返回的消息标识，用于追踪投递状态
    pub message_id: Option<String>,
}

/// 投递失败
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("网络请求失败: {0}")]
    Transport(String),

    #[error("服务商拒绝投递: 状态={status}, 原因={reason}")]
    Rejected { status: String, reason: String },

    #[error("服务商响应无法解析: {0}")]
    InvalidResponse(String),
}

impl DeliveryError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "DELIVERY_TRANSPORT",
            Self::Rejected { .. } => "DELIVERY_REJECTED",
            Self::InvalidResponse(_) => "DELIVERY_INVALID_RESPONSE",
        }
    }
}

/// 投递客户端 trait，各服务商实现具体的发送逻辑
#[async_trait]
pub trait DeliveryClient<M>: Send + Sync
where
    M: Send + Sync + 'static,
{
    /// 发送一条已渲染的消息
    async fn deliver(&self, message: &M) -> Result<DeliveryReceipt, DeliveryError>;

    /// 服务商名称
    fn provider(&self) -> &'static str;
}

/// 演练模式客户端
///
/// 只记录日志并返回生成的消息标识，便于在没有服务商凭据的环境中
/// 验证消费管道的完整性。
pub struct DryRunClient<M> {
    _message: PhantomData<fn(&M)>,
}

impl<M> DryRunClient<M> {
    pub fn new() -> Self {
        Self {
            _message: PhantomData,
        }
    }
}

impl<M> Default for DryRunClient<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M> DeliveryClient<M> for DryRunClient<M>
where
    M: Debug + Send + Sync + 'static,
{
    async fn deliver(&self, message: &M) -> Result<DeliveryReceipt, DeliveryError> {
        let message_id = format!("dry-run-{}", Uuid::now_v7());

        info!(
            provider = "dry-run",
            message_id = %message_id,
            message = ?message,
            "演练模式，跳过实际投递"
        );

        Ok(DeliveryReceipt {
            provider: "dry-run",
            message_id: Some(message_id),
        })
    }

    fn provider(&self) -> &'static str {
        "dry-run"
    }
}
