//! Payment Gateway Client
//!
//! Narrow seam over the hosted-checkout provider: the storefront only ever
//! creates a checkout session and reads back its id and redirect URL.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// One line of a hosted checkout session
#[derive(Debug, Clone)]
pub struct SessionLineItem {
    pub nombre: String,
    /// Amount in gateway minor units (centavos)
    pub unit_amount: i64,
    pub cantidad: i64,
}

/// Request for a hosted checkout session
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// Order id, echoed back by the webhook as opaque metadata
    pub pedido_id: String,
    pub cliente_email: String,
    pub line_items: Vec<SessionLineItem>,
    /// Shipping in gateway minor units (centavos)
    pub envio_amount: i64,
    pub success_url: String,
    pub cancel_url: String,
}

/// Hosted checkout session returned by the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Request(String),

    #[error("gateway rejected the session: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &SessionRequest,
    ) -> Result<GatewaySession, GatewayError>;
}

/// Stripe REST client (form-encoded `/v1/checkout/sessions`)
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_api_base(secret_key, "https://api.stripe.com")
    }

    pub fn with_api_base(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into(),
        }
    }

    fn session_params(request: &SessionRequest) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("payment_method_types[0]".into(), "card".into()),
            ("customer_email".into(), request.cliente_email.clone()),
            ("success_url".into(), request.success_url.clone()),
            ("cancel_url".into(), request.cancel_url.clone()),
            ("metadata[pedido_id]".into(), request.pedido_id.clone()),
        ];

        for (i, item) in request.line_items.iter().enumerate() {
            params.push((
                format!("line_items[{i}][price_data][currency]"),
                "cop".into(),
            ));
            params.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.nombre.clone(),
            ));
            params.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            params.push((format!("line_items[{i}][quantity]"), item.cantidad.to_string()));
        }

        params.push((
            "shipping_options[0][shipping_rate_data][type]".into(),
            "fixed_amount".into(),
        ));
        params.push((
            "shipping_options[0][shipping_rate_data][fixed_amount][amount]".into(),
            request.envio_amount.to_string(),
        ));
        params.push((
            "shipping_options[0][shipping_rate_data][fixed_amount][currency]".into(),
            "cop".into(),
        ));
        params.push((
            "shipping_options[0][shipping_rate_data][display_name]".into(),
            if request.envio_amount == 0 {
                "Envío gratis".into()
            } else {
                "Envío estándar".into()
            },
        ));

        params
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: &SessionRequest,
    ) -> Result<GatewaySession, GatewayError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let params = Self::session_params(request);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected(format!("{status}: {body}")));
        }

        response
            .json::<GatewaySession>()
            .await
            .map_err(|e| GatewayError::Request(format!("invalid session payload: {e}")))
    }
}
