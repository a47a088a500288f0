pub mod invoice;
pub mod resend;

use async_trait::async_trait;

/// Outbound customer notifications. Sends are fire-and-forget relative to the
/// state transitions that trigger them: a failed send is logged, never rolled
/// back into the booking.
#[async_trait]
pub trait InvoiceNotifier: Send + Sync {
    async fn send_invoice(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}
