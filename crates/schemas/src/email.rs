//! 邮件渠道记录
//!
//! ```text
//! enum EmailType { ACTIVATE_USER = 0; }
//! message EmailActivateUser {
//!   optional string email = 1;
//!   optional string name = 2;
//!   optional string activate_url = 3;
//! }
//! ```
//!
//! 所有字段都是 `optional`：生产者必须显式写出每个字段（包括空字符串），
//! 缺失的字段解码时返回 `MissingField`。

use prost::Message;

use crate::envelope::{Envelope, TypedRecord, required};
use crate::error::DecodeError;

/// 邮件判别值
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum EmailType {
    ActivateUser = 0,
}

impl EmailType {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::ActivateUser => "ACTIVATE_USER",
        }
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct EmailActivateUserWire {
    #[prost(string, optional, tag = "1")]
    pub email: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub activate_url: Option<String>,
}

/// 账号激活邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateUser {
    pub email: String,
    pub name: String,
    pub activate_url: String,
}

/// 邮件记录族
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailRecord {
    ActivateUser(ActivateUser),
}

impl EmailRecord {
    pub fn kind(&self) -> EmailType {
        match self {
            Self::ActivateUser(_) => EmailType::ActivateUser,
        }
    }

    /// 编码为完整的信封字节
    pub fn to_envelope_bytes(&self) -> Vec<u8> {
        let data = match self {
            Self::ActivateUser(v) => EmailActivateUserWire {
                email: Some(v.email.clone()),
                name: Some(v.name.clone()),
                activate_url: Some(v.activate_url.clone()),
            }
            .encode_to_vec(),
        };
        Envelope::new(self.kind() as i32, data).encode_to_vec()
    }
}

impl TypedRecord for EmailRecord {
    const CHANNEL: &'static str = "email";

    fn decode(kind: i32, data: &[u8]) -> Result<Self, DecodeError> {
        let kind = EmailType::try_from(kind).map_err(|_| DecodeError::UnknownDiscriminant {
            channel: Self::CHANNEL,
            kind,
        })?;

        match kind {
            EmailType::ActivateUser => {
                let wire = EmailActivateUserWire::decode(data)?;
                Ok(Self::ActivateUser(ActivateUser {
                    email: required(wire.email, "email")?,
                    name: required(wire.name, "name")?,
                    activate_url: required(wire.activate_url, "activate_url")?,
                }))
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        self.kind().as_str_name()
    }
}
