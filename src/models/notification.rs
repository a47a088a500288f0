use serde::Deserialize;

/// Inbound payment notification as the gateway posts it. Amounts and status
/// codes stay strings: they are hashed verbatim for the signature check.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

impl GatewayNotification {
    pub fn transaction_status(&self) -> GatewayTransactionStatus {
        GatewayTransactionStatus::parse(&self.transaction_status)
    }

    pub fn fraud_accepted(&self) -> bool {
        match self.fraud_status.as_deref() {
            None => true,
            Some("accept") => true,
            Some(_) => false,
        }
    }
}

/// The gateway's transaction-status vocabulary as a closed set. Anything the
/// gateway starts sending that we do not know yet lands in `Unrecognized`
/// instead of being matched loosely downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayTransactionStatus {
    Capture,
    Settlement,
    Pending,
    Cancel,
    Deny,
    Expire,
    Refund,
    Unrecognized(String),
}

impl GatewayTransactionStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "capture" => GatewayTransactionStatus::Capture,
            "settlement" => GatewayTransactionStatus::Settlement,
            "pending" => GatewayTransactionStatus::Pending,
            "cancel" => GatewayTransactionStatus::Cancel,
            "deny" => GatewayTransactionStatus::Deny,
            "expire" => GatewayTransactionStatus::Expire,
            "refund" => GatewayTransactionStatus::Refund,
            other => GatewayTransactionStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GatewayTransactionStatus::Capture => "capture",
            GatewayTransactionStatus::Settlement => "settlement",
            GatewayTransactionStatus::Pending => "pending",
            GatewayTransactionStatus::Cancel => "cancel",
            GatewayTransactionStatus::Deny => "deny",
            GatewayTransactionStatus::Expire => "expire",
            GatewayTransactionStatus::Refund => "refund",
            GatewayTransactionStatus::Unrecognized(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_statuses() {
        assert_eq!(
            GatewayTransactionStatus::parse("settlement"),
            GatewayTransactionStatus::Settlement
        );
        assert_eq!(
            GatewayTransactionStatus::parse("expire"),
            GatewayTransactionStatus::Expire
        );
    }

    #[test]
    fn test_parse_unknown_status_is_tagged() {
        assert_eq!(
            GatewayTransactionStatus::parse("chargeback"),
            GatewayTransactionStatus::Unrecognized("chargeback".to_string())
        );
    }

    #[test]
    fn test_fraud_accept_and_absent_both_pass() {
        let mut n = GatewayNotification {
            order_id: "o".into(),
            status_code: "200".into(),
            gross_amount: "75000.00".into(),
            signature_key: String::new(),
            transaction_status: "capture".into(),
            fraud_status: None,
        };
        assert!(n.fraud_accepted());
        n.fraud_status = Some("accept".into());
        assert!(n.fraud_accepted());
        n.fraud_status = Some("challenge".into());
        assert!(!n.fraud_accepted());
    }
}
