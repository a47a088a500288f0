pub mod midtrans;

use async_trait::async_trait;

/// External payment gateway. Untrusted and eventually consistent: the token
/// handshake here is paired with the asynchronous notification flow handled
/// by reconciliation.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a transaction for `order_id` charging `gross_amount`, returning
    /// the opaque token the booking UI hands to the gateway's payment popup.
    async fn create_transaction(
        &self,
        order_id: &str,
        gross_amount: i64,
        customer_email: Option<&str>,
    ) -> anyhow::Result<String>;
}
