//! CLI 命令定义

use clap::{Args, Parser, Subcommand};
use messaging_schemas::Envelope;
use messaging_schemas::email::{ActivateUser, EmailRecord};
use messaging_schemas::sms::{MfaCode, SmsRecord};

/// 测试消息发布工具
#[derive(Parser, Debug)]
#[command(name = "mock-publisher")]
#[command(version, about = "向通知主题发布测试消息")]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Kafka brokers 地址
    #[arg(long, default_value = "localhost:9092")]
    pub kafka_brokers: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// 目标主题分区
#[derive(Args, Debug, Clone)]
pub struct Target {
    #[arg(short, long)]
    pub topic: String,

    #[arg(short, long, default_value = "0")]
    pub partition: i32,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 发布 MFA 验证码短信
    SmsMfa {
        #[arg(long)]
        phone_number: String,

        #[arg(long)]
        code: String,

        #[command(flatten)]
        target: Target,
    },

    /// 发布账号激活邮件
    EmailActivate {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        activate_url: String,

        #[command(flatten)]
        target: Target,
    },

    /// 发布任意判别值的信封（用于验证未知判别值被丢弃）
    Raw {
        #[arg(long)]
        kind: i32,

        /// 原样作为 data 字段的字节
        #[arg(long, default_value = "")]
        data: String,

        #[command(flatten)]
        target: Target,
    },
}

impl Commands {
    pub fn target(&self) -> &Target {
        match self {
            Self::SmsMfa { target, .. }
            | Self::EmailActivate { target, .. }
            | Self::Raw { target, .. } => target,
        }
    }

    pub fn to_envelope_bytes(&self) -> Vec<u8> {
        match self {
            Self::SmsMfa {
                phone_number, code, ..
            } => SmsRecord::Mfa(MfaCode {
                phone_number: phone_number.clone(),
                code: code.clone(),
            })
            .to_envelope_bytes(),
            Self::EmailActivate {
                email,
                name,
                activate_url,
                ..
            } => EmailRecord::ActivateUser(ActivateUser {
                email: email.clone(),
                name: name.clone(),
                activate_url: activate_url.clone(),
            })
            .to_envelope_bytes(),
            Self::Raw { kind, data, .. } => {
                Envelope::new(*kind, data.as_bytes().to_vec()).encode_to_vec()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use messaging_schemas::{TypedRecord, decode_envelope};

    #[test]
    fn test_parse_sms_mfa() {
        let cli = Cli::parse_from([
            "mock-publisher",
            "sms-mfa",
            "--phone-number",
            "+15551234567",
            "--code",
            "482913",
            "--topic",
            "messaging.sms",
        ]);

        assert_eq!(cli.kafka_brokers, "localhost:9092");
        let target = cli.command.target();
        assert_eq!(target.topic, "messaging.sms");
        assert_eq!(target.partition, 0);

        let envelope = decode_envelope(&cli.command.to_envelope_bytes()).unwrap();
        let record = SmsRecord::decode(envelope.kind, &envelope.data).unwrap();
        assert_eq!(
            record,
            SmsRecord::Mfa(MfaCode {
                phone_number: "+15551234567".to_string(),
                code: "482913".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_email_activate() {
        let cli = Cli::parse_from([
            "mock-publisher",
            "email-activate",
            "--email",
            "a@b.com",
            "--name",
            "Ana",
            "--activate-url",
            "https://x/y",
            "--topic",
            "messaging.email",
            "--partition",
            "2",
        ]);

        assert_eq!(cli.command.target().partition, 2);
        let envelope = decode_envelope(&cli.command.to_envelope_bytes()).unwrap();
        let record = EmailRecord::decode(envelope.kind, &envelope.data).unwrap();
        assert_eq!(record.kind_name(), "ACTIVATE_USER");
    }

    #[test]
    fn test_raw_unknown_kind_is_rejected_by_decoder() {
        let cli = Cli::parse_from([
            "mock-publisher",
            "raw",
            "--kind",
            "99",
            "--topic",
            "messaging.sms",
        ]);

        let envelope = decode_envelope(&cli.command.to_envelope_bytes()).unwrap();
        assert_eq!(envelope.kind, 99);
        assert!(SmsRecord::decode(envelope.kind, &envelope.data).is_err());
    }
}
