//! 解码错误类型

use thiserror::Error;

/// 信封或渠道记录解码失败
///
/// 所有变体对单条消息而言都是终态：调用方记录日志后直接丢弃消息。
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("负载过短: 长度={len}, 最小长度={min}")]
    Truncated { len: usize, min: usize },

    #[error("负载结构错误: {0}")]
    Malformed(#[from] prost::DecodeError),

    #[error("缺少必填字段: {field}")]
    MissingField { field: &'static str },

    #[error("未知的消息类型: 渠道={channel}, 类型={kind}")]
    UnknownDiscriminant { channel: &'static str, kind: i32 },
}

impl DecodeError {
    /// 稳定的错误码，用作指标标签
    pub fn code(&self) -> &'static str {
        match self {
            Self::Truncated { .. } => "TRUNCATED",
            Self::Malformed(_) => "MALFORMED",
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::UnknownDiscriminant { .. } => "UNKNOWN_DISCRIMINANT",
        }
    }
}
