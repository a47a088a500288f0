use rusqlite::Connection;
use sha2::{Digest, Sha512};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, GatewayNotification, GatewayTransactionStatus, PaymentStatus};

/// Signature the gateway computes over its notification:
/// SHA-512 of order_id + status_code + gross_amount + server key, hex encoded.
pub fn expected_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_signature(notification: &GatewayNotification, server_key: &str) -> bool {
    let expected = expected_signature(
        &notification.order_id,
        &notification.status_code,
        &notification.gross_amount,
        server_key,
    );
    constant_time_eq(
        expected.as_bytes(),
        notification.signature_key.to_lowercase().as_bytes(),
    )
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// The reconciliation state machine as a pure function: given the gateway's
/// transaction status and the booking's current state, compute the next
/// (payment_status, status) pair.
///
/// Repeat deliveries are no-ops: success/failed payment states are terminal,
/// and the business status only ever advances from the states listed here.
pub fn apply(
    gateway_status: &GatewayTransactionStatus,
    fraud_accepted: bool,
    current_status: BookingStatus,
    current_payment: &PaymentStatus,
) -> (PaymentStatus, BookingStatus) {
    let (candidate_payment, next_status) = match gateway_status {
        GatewayTransactionStatus::Capture | GatewayTransactionStatus::Settlement
            if fraud_accepted =>
        {
            let next = match current_status {
                BookingStatus::Pending => BookingStatus::Paid,
                other => other,
            };
            (PaymentStatus::Success, next)
        }
        GatewayTransactionStatus::Cancel
        | GatewayTransactionStatus::Deny
        | GatewayTransactionStatus::Expire => {
            let next = match current_status {
                BookingStatus::Pending | BookingStatus::Paid => BookingStatus::Cancelled,
                other => other,
            };
            (PaymentStatus::Failed, next)
        }
        // No defined business meaning (yet): record the gateway's own word,
        // leave the lifecycle alone.
        other => (PaymentStatus::from_str(other.as_str()), current_status),
    };

    let next_payment = match current_payment {
        PaymentStatus::Success | PaymentStatus::Failed => current_payment.clone(),
        _ => candidate_payment,
    };

    (next_payment, next_status)
}

/// Apply one gateway notification: integrity check, booking lookup by order
/// reference, state transition, single-update persistence. Duplicate
/// deliveries land in the same final state and are treated as success.
pub fn reconcile(
    conn: &Connection,
    notification: &GatewayNotification,
    server_key: &str,
) -> Result<Booking, AppError> {
    if !verify_signature(notification, server_key) {
        tracing::warn!(order_id = %notification.order_id, "rejected notification with invalid signature");
        return Err(AppError::Integrity);
    }

    let mut booking = queries::get_booking_by_order_id(conn, &notification.order_id)?
        .ok_or_else(|| AppError::NotFound(format!("order {}", notification.order_id)))?;

    let (payment_status, status) = apply(
        &notification.transaction_status(),
        notification.fraud_accepted(),
        booking.status,
        &booking.payment_status,
    );

    if payment_status != booking.payment_status || status != booking.status {
        queries::update_payment_state(conn, &booking.id, &payment_status, status)?;
        tracing::info!(
            booking_id = %booking.id,
            gateway_status = %notification.transaction_status,
            status = status.as_str(),
            payment_status = payment_status.as_str(),
            "reconciled payment notification"
        );
    } else {
        tracing::info!(booking_id = %booking.id, "duplicate notification, state unchanged");
    }

    booking.payment_status = payment_status;
    booking.status = status;
    Ok(booking)
}
