//! 消息信封与各渠道记录的线上格式
//!
//! 上游服务写入 Kafka 的每条记录都是一个 protobuf 编码的信封：
//! `type` 字段为渠道内的判别值，`data` 字段为按判别值定义的子负载。
//! 本 crate 只负责纯同步的编解码，不涉及任何 I/O。

pub mod email;
pub mod envelope;
pub mod error;
pub mod sms;

pub use envelope::{Envelope, MIN_ENVELOPE_LEN, TypedRecord, decode_envelope};
pub use error::DecodeError;
