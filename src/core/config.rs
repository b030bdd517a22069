use crate::auth::JwtConfig;
use crate::checkout::CheckoutConfig;
use crate::services::mailer::SmtpConfig;

/// 服务器配置 - 店铺后端的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | modastyle.db | SQLite 数据库路径 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | PUBLIC_URL | http://localhost:3000 | 支付跳转用的对外地址 |
/// | STRIPE_SECRET_KEY | (空) | 支付网关密钥，缺省时启用模拟网关 |
/// | STRIPE_WEBHOOK_SECRET | (空) | Webhook 签名密钥 |
/// | COSTO_ENVIO | 10000 | 固定运费 |
/// | ENVIO_GRATIS_DESDE | 50000 | 免运费的订单小计阈值 (不含) |
/// | ADMIN_EMAIL | admin@modastyle.local | 首次启动引导的管理员邮箱 |
/// | ADMIN_PASSWORD | cambiame-ya | 首次启动引导的管理员密码 |
/// | SMTP_HOST/PORT/USER/PASSWORD/FROM | (空) | SMTP 邮件配置，缺省时仅记录日志 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// DATABASE_PATH=/data/tienda.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 对外地址 (支付成功/取消跳转)
    pub public_url: String,
    /// 支付网关密钥 (空 = 模拟网关)
    pub stripe_secret_key: String,
    /// Webhook 签名密钥
    pub stripe_webhook_secret: String,
    /// 固定运费
    pub costo_envio: i64,
    /// 免运费阈值 (小计严格大于该值时免运费)
    pub envio_gratis_desde: i64,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// SMTP 邮件配置 (None = 日志模拟)
    pub smtp: Option<SmtpConfig>,
    /// 首次启动引导的管理员账号
    pub admin_email: String,
    pub admin_password: String,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "modastyle.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            public_url: std::env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            stripe_webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            costo_envio: std::env::var("COSTO_ENVIO")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10000),
            envio_gratis_desde: std::env::var("ENVIO_GRATIS_DESDE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50000),
            jwt: JwtConfig::default(),
            smtp: smtp_from_env(),
            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@modastyle.local".into()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "cambiame-ya".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 测试用配置: 内存数据库、固定密钥
    pub fn for_tests() -> Self {
        Self {
            database_path: ":memory:".into(),
            http_port: 0,
            public_url: "https://tienda.test".into(),
            stripe_secret_key: String::new(),
            stripe_webhook_secret: "whsec_test123secret456".into(),
            costo_envio: 10000,
            envio_gratis_desde: 50000,
            jwt: JwtConfig {
                secret: "test-secret-key-that-is-long-enough-123456".into(),
                expiration_minutes: 60,
                issuer: "modastyle-server".into(),
                audience: "modastyle-admin".into(),
            },
            smtp: None,
            admin_email: "admin@modastyle.test".into(),
            admin_password: "segura123".into(),
            environment: "test".into(),
        }
    }

    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            costo_envio: self.costo_envio,
            envio_gratis_desde: self.envio_gratis_desde,
            public_url: self.public_url.clone(),
        }
    }
}

fn smtp_from_env() -> Option<SmtpConfig> {
    let host = std::env::var("SMTP_HOST").ok()?;
    Some(SmtpConfig {
        host,
        port: std::env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587),
        user: std::env::var("SMTP_USER").unwrap_or_default(),
        password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
        from: std::env::var("SMTP_FROM")
            .unwrap_or_else(|_| "\"ModaStyle\" <pedidos@modastyle.local>".into()),
    })
}
