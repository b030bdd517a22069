use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::{DbService, ensure_admin_user};
use crate::payments::gateway::{PaymentGateway, StripeGateway};
use crate::payments::mock::MockGateway;
use crate::payments::webhook::SignatureVerifier;
use crate::services::mailer::{LogMailer, Mailer, SmtpMailer};
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | jwt_service | JWT 认证服务 |
/// | gateway | 支付网关客户端 |
/// | mailer | 邮件发送服务 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造，测试常用)
    pub fn new(
        config: Config,
        pool: SqlitePool,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            pool,
            jwt_service,
            gateway,
            mailer,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 数据库 (连接池 + 迁移)
    /// 2. 管理员账号引导 (用户表为空时)
    /// 3. 支付网关 (无密钥时启用模拟网关)
    /// 4. 邮件服务 (无 SMTP 配置时仅记录日志)
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        ensure_admin_user(&db.pool, &config.admin_email, &config.admin_password).await?;

        let gateway: Arc<dyn PaymentGateway> = if config.stripe_secret_key.is_empty() {
            tracing::warn!("STRIPE_SECRET_KEY not set, using the mock payment gateway");
            Arc::new(MockGateway)
        } else {
            Arc::new(StripeGateway::new(config.stripe_secret_key.clone()))
        };

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(
                SmtpMailer::new(smtp).map_err(|e| AppError::internal(e.to_string()))?,
            ),
            None => {
                tracing::info!("SMTP not configured, emails will only be logged");
                Arc::new(LogMailer)
            }
        };

        Ok(Self::new(config.clone(), db.pool, gateway, mailer))
    }

    /// Webhook 签名验证器
    pub fn signature_verifier(&self) -> SignatureVerifier {
        SignatureVerifier::new(self.config.stripe_webhook_secret.clone())
    }
}
