//! 通用信封
//!
//! 线上格式（protobuf）：
//!
//! ```text
//! message Envelope {
//!   optional int32 type = 1;
//!   bytes data = 2;
//! }
//! ```
//!
//! `type` 必须显式出现；缺失时视为结构错误，而不是退化为判别值 0。
//! 生产者必须按 `optional` 字段编码：即使值为 0 也要写出 tag。
//! 采用 proto3 隐式存在语义的生成代码会省略 `type = 0`，这样的信封会以
//! `MissingField` 被拒绝。

use prost::Message;

use crate::error::DecodeError;

/// 最短的合法信封：`type` 字段的 tag 与一个字节的 varint 值
pub const MIN_ENVELOPE_LEN: usize = 2;

#[derive(Clone, PartialEq, Message)]
struct EnvelopeWire {
    #[prost(int32, optional, tag = "1")]
    r#type: Option<i32>,
    #[prost(bytes = "vec", tag = "2")]
    data: Vec<u8>,
}

/// 解码后的信封：判别值 + 未解析的子负载
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub kind: i32,
    pub data: Vec<u8>,
}

impl Envelope {
    pub fn new(kind: i32, data: Vec<u8>) -> Self {
        Self { kind, data }
    }

    /// 编码为线上格式，供生产者与测试使用
    pub fn encode_to_vec(&self) -> Vec<u8> {
        EnvelopeWire {
            r#type: Some(self.kind),
            data: self.data.clone(),
        }
        .encode_to_vec()
    }
}

/// 从原始字节解码信封
///
/// 过短的缓冲区直接拒绝，保证任何输入都只会得到错误而不会 panic。
pub fn decode_envelope(bytes: &[u8]) -> Result<Envelope, DecodeError> {
    if bytes.len() < MIN_ENVELOPE_LEN {
        return Err(DecodeError::Truncated {
            len: bytes.len(),
            min: MIN_ENVELOPE_LEN,
        });
    }

    let wire = EnvelopeWire::decode(bytes)?;
    let kind = wire.r#type.ok_or(DecodeError::MissingField { field: "type" })?;

    Ok(Envelope {
        kind,
        data: wire.data,
    })
}

/// 某个渠道的具体记录族
///
/// 判别值到记录结构的映射在 `decode` 内完成，未知判别值必须返回
/// `DecodeError::UnknownDiscriminant`，不允许回落到默认分支。
pub trait TypedRecord: Sized + Send + 'static {
    /// 渠道名，用于日志与错误信息
    const CHANNEL: &'static str;

    fn decode(kind: i32, data: &[u8]) -> Result<Self, DecodeError>;

    /// 记录对应判别值的规范名称（如 `MFA`）
    fn kind_name(&self) -> &'static str;
}

/// 取出必填字段
pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> Result<T, DecodeError> {
    value.ok_or(DecodeError::MissingField { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_envelope_well_formed() {
        let bytes = Envelope::new(0, b"payload".to_vec()).encode_to_vec();
        let envelope = decode_envelope(&bytes).unwrap();
        assert_eq!(envelope.kind, 0);
        assert_eq!(envelope.data, b"payload");
    }

    #[test]
    fn test_decode_envelope_minimum_length() {
        // 仅包含 type=0，data 为空
        let envelope = decode_envelope(&[0x08, 0x00]).unwrap();
        assert_eq!(envelope, Envelope::new(0, Vec::new()));
    }

    #[test]
    fn test_decode_envelope_short_buffers_rejected() {
        assert!(matches!(
            decode_envelope(&[]),
            Err(DecodeError::Truncated { len: 0, min: 2 })
        ));

        // 任意单字节输入都应得到错误
        for byte in 0..=u8::MAX {
            assert!(decode_envelope(&[byte]).is_err(), "byte {byte:#04x}");
        }
    }

    #[test]
    fn test_decode_envelope_truncated_data() {
        // data 字段声明长度 10，实际只有 2 字节
        let bytes = [0x08, 0x00, 0x12, 0x0A, 0x01, 0x02];
        assert!(matches!(
            decode_envelope(&bytes),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_envelope_missing_type() {
        // 只有 data 字段
        let bytes = [0x12, 0x01, 0xFF];
        assert!(matches!(
            decode_envelope(&bytes),
            Err(DecodeError::MissingField { field: "type" })
        ));
    }

    #[test]
    fn test_implicit_zero_type_rejected() {
        // proto3 隐式存在语义省略了 type = 0，只剩 data 字段
        let implicit = [0x12, 0x02, 0x0A, 0x00];
        assert!(matches!(
            decode_envelope(&implicit),
            Err(DecodeError::MissingField { field: "type" })
        ));

        // 显式写出 type = 0 时同样的 data 可以解码
        let explicit = Envelope::new(0, vec![0x0A, 0x00]).encode_to_vec();
        assert_eq!(explicit[..2], [0x08, 0x00]);
        assert_eq!(decode_envelope(&explicit).unwrap().kind, 0);
    }

    #[test]
    fn test_decode_envelope_keeps_unknown_kind() {
        // 信封层不校验判别值，留给记录解码阶段
        let bytes = Envelope::new(99, vec![1, 2, 3]).encode_to_vec();
        let envelope = decode_envelope(&bytes).unwrap();
        assert_eq!(envelope.kind, 99);
    }
}
