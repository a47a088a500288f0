use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use serde_json::json;

use super::PaymentGateway;

pub struct MidtransSnapProvider {
    server_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl MidtransSnapProvider {
    pub fn new(server_key: String, is_production: bool) -> Self {
        let base_url = if is_production {
            "https://app.midtrans.com".to_string()
        } else {
            "https://app.sandbox.midtrans.com".to_string()
        };
        Self {
            server_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    // Midtrans Basic auth: base64("<server_key>:")
    fn auth_header(&self) -> String {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{}:", self.server_key));
        format!("Basic {encoded}")
    }
}

#[async_trait]
impl PaymentGateway for MidtransSnapProvider {
    async fn create_transaction(
        &self,
        order_id: &str,
        gross_amount: i64,
        customer_email: Option<&str>,
    ) -> anyhow::Result<String> {
        let mut body = json!({
            "transaction_details": {
                "order_id": order_id,
                "gross_amount": gross_amount,
            },
        });
        if let Some(email) = customer_email {
            body["customer_details"] = json!({ "email": email });
        }

        let resp = self
            .client
            .post(format!("{}/snap/v1/transactions", self.base_url))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .context("failed to call Midtrans Snap API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Midtrans response")?;

        if !status.is_success() {
            anyhow::bail!("Midtrans Snap API error ({}): {}", status, data);
        }

        data["token"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing token in Midtrans response"))
    }
}
