//! 支付模块
//!
//! - [`gateway`] - 托管支付会话客户端 (Stripe REST)
//! - [`webhook`] - 签名验证与异步支付结果处理
//! - [`mock`] - 本地开发/测试用的模拟网关

pub mod gateway;
pub mod mock;
pub mod webhook;

pub use gateway::{
    GatewayError, GatewaySession, PaymentGateway, SessionLineItem, SessionRequest, StripeGateway,
};
pub use mock::MockGateway;
pub use webhook::{SignatureVerifier, StripeEvent, WebhookProcessor};
