//! Mock payment gateway
//!
//! Deterministic stand-in used by the test suites and by local development
//! when no gateway credentials are configured. Sessions are accepted
//! unconditionally and never leave the process.

use async_trait::async_trait;
use uuid::Uuid;

use super::gateway::{GatewayError, GatewaySession, PaymentGateway, SessionRequest};

pub struct MockGateway;

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_checkout_session(
        &self,
        request: &SessionRequest,
    ) -> Result<GatewaySession, GatewayError> {
        if request.line_items.is_empty() {
            return Err(GatewayError::Rejected(
                "session without line items".to_string(),
            ));
        }

        let id = format!("mock_cs_{}", Uuid::new_v4());
        tracing::info!(
            session_id = %id,
            pedido_id = %request.pedido_id,
            "Simulating checkout session creation"
        );

        Ok(GatewaySession {
            url: format!("https://checkout.mock.local/pay/{id}"),
            id,
        })
    }
}

/// Gateway that fails every request; lets tests exercise the
/// order-stays-pending path.
pub struct FailingGateway;

#[async_trait]
impl PaymentGateway for FailingGateway {
    async fn create_checkout_session(
        &self,
        _request: &SessionRequest,
    ) -> Result<GatewaySession, GatewayError> {
        Err(GatewayError::Request("simulated gateway outage".to_string()))
    }
}
