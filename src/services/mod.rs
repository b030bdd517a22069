//! 服务模块
//!
//! - [`mailer`] - 邮件发送 (SMTP / 日志模拟)
//! - [`notifications`] - 订单生命周期通知
//! - [`metrics`] - 指标记录

pub mod mailer;
pub mod metrics;
pub mod notifications;

pub use mailer::{LogMailer, Mailer, MailerError, SmtpConfig, SmtpMailer};
