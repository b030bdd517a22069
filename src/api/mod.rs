//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口
//! - [`products`] - 商品接口 (店面只读 + 后台维护)
//! - [`categories`] - 分类接口 (店面只读 + 后台维护)
//! - [`checkout`] - 结算会话接口
//! - [`webhooks`] - 支付网关回调
//! - [`orders`] - 后台订单管理接口
//! - [`statistics`] - 后台统计接口

pub mod auth;
pub mod categories;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod products;
pub mod statistics;
pub mod webhooks;
