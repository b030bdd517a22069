//! ModaStyle Server - 电商店面与后台 API
//!
//! # 架构概述
//!
//! 本模块是店铺后端的主入口，提供以下核心功能：
//!
//! - **目录** (`db`): SQLite 存储的商品/分类/变体目录
//! - **结算** (`checkout`): 购物车校验、订单创建、托管支付会话
//! - **支付** (`payments`): 网关客户端与 Webhook 签名验证/状态流转
//! - **认证** (`auth`): JWT + Argon2 管理后台认证
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、密码哈希
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (模型 + 仓储)
//! ├── checkout/      # 结算会话发起
//! ├── payments/      # 支付网关与 Webhook
//! ├── services/      # 邮件、通知、指标
//! └── utils/         # 错误、日志、定价工具
//! ```

pub mod api;
pub mod auth;
pub mod checkout;
pub mod core;
pub mod db;
pub mod payments;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
