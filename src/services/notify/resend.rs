use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::InvoiceNotifier;

pub struct ResendMailer {
    api_key: String,
    from: String,
    client: reqwest::Client,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            api_key,
            from,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl InvoiceNotifier for ResendMailer {
    async fn send_invoice(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        self.client
            .post("https://api.resend.com/emails")
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await
            .context("failed to call Resend API")?
            .error_for_status()
            .context("Resend API returned error")?;

        Ok(())
    }
}
