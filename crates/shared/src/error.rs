//! 统一错误处理模块
//!
//! 单条消息的错误（解码、投递）在处理任务内部终结；分区流错误只终止该分区的
//! 汇聚任务；启动错误则由 `main` 直接返回并退出进程。

use messaging_schemas::DecodeError;
use thiserror::Error;

use crate::delivery::DeliveryError;

/// 系统错误类型
#[derive(Debug, Error)]
pub enum MessagingError {
    // ==================== 单条消息错误 ====================
    #[error("消息解码失败: {0}")]
    Decode(#[from] DecodeError),

    #[error("消息投递失败: {0}")]
    Delivery(#[from] DeliveryError),

    // ==================== 分区流错误 ====================
    #[error("分区消息流异常: topic={topic}, partition={partition}, 原因={reason}")]
    SourceStream {
        topic: String,
        partition: i32,
        reason: String,
    },

    #[error("Kafka 错误: {0}")]
    Kafka(String),

    // ==================== 启动错误 ====================
    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("启动失败: {0}")]
    Startup(String),

    // ==================== 通用错误 ====================
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, MessagingError>;

impl MessagingError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(e) => e.code(),
            Self::Delivery(e) => e.code(),
            Self::SourceStream { .. } => "SOURCE_STREAM_ERROR",
            Self::Kafka(_) => "KAFKA_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Startup(_) => "STARTUP_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
