//! 邮件模板映射
//!
//! 邮件正文由 SendGrid 动态模板渲染，这里只决定模板 ID 与替换变量。
//! 模板 ID 由判别值名称派生：`email_` + 小写名称。

use std::collections::BTreeMap;

use messaging_schemas::email::{ActivateUser, EmailRecord, EmailType};
use messaging_shared::pipeline::Renderer;

use crate::config::SenderConfig;

/// 发件人
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub name: String,
    pub address: String,
}

/// 待发送的模板邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub from: Sender,
    pub template_id: String,
    pub substitutions: BTreeMap<String, String>,
}

/// 由判别值得到模板 ID
pub fn template_id(kind: EmailType) -> String {
    format!("email_{}", kind.as_str_name().to_lowercase())
}

/// 邮件渲染器
pub struct EmailRenderer {
    sender: Sender,
}

impl EmailRenderer {
    pub fn new(config: &SenderConfig) -> Self {
        Self {
            sender: Sender {
                name: config.from_name.clone(),
                address: config.from_address.clone(),
            },
        }
    }

    fn render_activate_user(&self, record: ActivateUser) -> EmailMessage {
        let substitutions = BTreeMap::from([
            ("name".to_string(), record.name),
            ("activateUrl".to_string(), record.activate_url),
        ]);

        EmailMessage {
            to: record.email,
            from: self.sender.clone(),
            template_id: template_id(EmailType::ActivateUser),
            substitutions,
        }
    }
}

impl Renderer for EmailRenderer {
    type Record = EmailRecord;
    type Message = EmailMessage;

    fn render(&self, record: EmailRecord) -> EmailMessage {
        match record {
            EmailRecord::ActivateUser(v) => self.render_activate_user(v),
        }
    }
}
