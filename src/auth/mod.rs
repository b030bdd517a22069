//! 认证授权模块
//!
//! 提供 JWT 认证与密码哈希：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文
//! - [`require_admin`] - 管理接口认证中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use extractor::CurrentUser;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_admin;
