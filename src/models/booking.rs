use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub user_email: Option<String>,
    pub car_type_id: String,
    pub time_slot_id: String,
    pub booking_date: NaiveDateTime,
    pub total_price: i64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Join key for payment notifications. Assigned at creation (equal to the
    /// booking id), before the gateway handshake begins.
    pub order_id: String,
    pub payment_token: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Business lifecycle. CANCELLED and COMPLETED are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Paid,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Paid => "PAID",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "PAID" => BookingStatus::Paid,
            "CONFIRMED" => BookingStatus::Confirmed,
            "COMPLETED" => BookingStatus::Completed,
            "CANCELLED" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }
}

/// Payment lifecycle, driven by gateway notifications. The column mirrors the
/// gateway's vocabulary, so statuses with no business mapping yet are carried
/// through verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Other(s) => s,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => PaymentStatus::Pending,
            "success" => PaymentStatus::Success,
            "failed" => PaymentStatus::Failed,
            other => PaymentStatus::Other(other.to_string()),
        }
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(PaymentStatus::from_str(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Paid,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn test_unknown_booking_status_defaults_to_pending() {
        assert_eq!(BookingStatus::from_str("GARBAGE"), BookingStatus::Pending);
    }

    #[test]
    fn test_payment_status_preserves_unmapped_vocabulary() {
        let status = PaymentStatus::from_str("refund");
        assert_eq!(status, PaymentStatus::Other("refund".to_string()));
        assert_eq!(status.as_str(), "refund");
    }
}
