//! 短信模板
//!
//! 每个判别值对应一个纯函数渲染，渲染不会失败。

use messaging_schemas::sms::{MfaCode, SmsRecord};
use messaging_shared::pipeline::Renderer;

use crate::config::PhoneConfig;

/// 待发送的短信
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    pub to: String,
    pub from: String,
    pub text: String,
}

/// 短信渲染器
pub struct SmsRenderer {
    from_name: String,
}

impl SmsRenderer {
    pub fn new(phone: &PhoneConfig) -> Self {
        Self {
            from_name: phone.from_name.clone(),
        }
    }

    fn render_mfa(&self, mfa: MfaCode) -> SmsMessage {
        SmsMessage {
            text: format!("RSO-{} is your RSO Bicycle activation code", mfa.code),
            to: mfa.phone_number,
            from: self.from_name.clone(),
        }
    }
}

impl Renderer for SmsRenderer {
    type Record = SmsRecord;
    type Message = SmsMessage;

    fn render(&self, record: SmsRecord) -> SmsMessage {
        match record {
            SmsRecord::Mfa(mfa) => self.render_mfa(mfa),
        }
    }
}
