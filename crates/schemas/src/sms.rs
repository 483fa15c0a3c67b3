//! 短信渠道记录
//!
//! ```text
//! enum SmsType { MFA = 0; }
//! message SmsMfa {
//!   optional string phone_number = 1;
//!   optional string code = 2;
//! }
//! ```
//!
//! 所有字段都是 `optional`：生产者必须显式写出每个字段（包括空字符串），
//! 缺失的字段解码时返回 `MissingField`。

use prost::Message;

use crate::envelope::{Envelope, TypedRecord, required};
use crate::error::DecodeError;

/// 短信判别值（与邮件渠道的枚举互不相关）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SmsType {
    Mfa = 0,
}

impl SmsType {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Mfa => "MFA",
        }
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct SmsMfaWire {
    #[prost(string, optional, tag = "1")]
    pub phone_number: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub code: Option<String>,
}

/// 多因素认证验证码短信
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaCode {
    pub phone_number: String,
    pub code: String,
}

/// 短信记录族
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsRecord {
    Mfa(MfaCode),
}

impl SmsRecord {
    pub fn kind(&self) -> SmsType {
        match self {
            Self::Mfa(_) => SmsType::Mfa,
        }
    }

    /// 编码为完整的信封字节
    pub fn to_envelope_bytes(&self) -> Vec<u8> {
        let data = match self {
            Self::Mfa(mfa) => SmsMfaWire {
                phone_number: Some(mfa.phone_number.clone()),
                code: Some(mfa.code.clone()),
            }
            .encode_to_vec(),
        };
        Envelope::new(self.kind() as i32, data).encode_to_vec()
    }
}

impl TypedRecord for SmsRecord {
    const CHANNEL: &'static str = "sms";

    fn decode(kind: i32, data: &[u8]) -> Result<Self, DecodeError> {
        let kind = SmsType::try_from(kind).map_err(|_| DecodeError::UnknownDiscriminant {
            channel: Self::CHANNEL,
            kind,
        })?;

        match kind {
            SmsType::Mfa => {
                let wire = SmsMfaWire::decode(data)?;
                Ok(Self::Mfa(MfaCode {
                    phone_number: required(wire.phone_number, "phone_number")?,
                    code: required(wire.code, "code")?,
                }))
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        self.kind().as_str_name()
    }
}
