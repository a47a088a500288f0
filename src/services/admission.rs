use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, PaymentStatus};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub car_type_id: String,
    pub time_slot_id: String,
    pub booking_date: NaiveDateTime,
}

/// What the booking UI needs to open the payment popup.
#[derive(Debug, Serialize)]
pub struct PaymentHandshake {
    pub token: String,
    pub booking: Booking,
}

/// Capacity check and PENDING insert under one transaction. The shared
/// connection mutex plus this transaction serialize concurrent admissions for
/// the same slot/day, so at most `capacity` non-cancelled bookings can ever
/// exist for a (date, slot) pair.
pub fn admit(
    conn: &mut Connection,
    user_id: &str,
    user_email: Option<&str>,
    req: &BookingRequest,
) -> Result<Booking, AppError> {
    let tx = conn.transaction()?;

    let slot = queries::get_time_slot(&tx, &req.time_slot_id)?
        .ok_or_else(|| AppError::NotFound(format!("time slot {}", req.time_slot_id)))?;

    let booked = queries::count_active_bookings_for_slot(&tx, req.booking_date.date(), &slot.id)?;
    if booked >= slot.capacity {
        return Err(AppError::CapacityExceeded);
    }

    let car_type = queries::get_car_type(&tx, &req.car_type_id)?
        .ok_or_else(|| AppError::NotFound(format!("car type {}", req.car_type_id)))?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().naive_utc();
    let booking = Booking {
        order_id: id.clone(),
        id,
        user_id: user_id.to_string(),
        user_email: user_email.map(str::to_string),
        car_type_id: car_type.id,
        time_slot_id: slot.id,
        booking_date: req.booking_date,
        total_price: car_type.price,
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Pending,
        payment_token: None,
        created_at: now,
        updated_at: now,
    };
    queries::create_booking(&tx, &booking)?;

    tx.commit()?;
    Ok(booking)
}

/// Full admission flow: admit the booking, then request a payment token from
/// the gateway using the booking's own id as the order identifier.
///
/// A booking whose token request fails is soft-cancelled so it stops counting
/// against slot capacity; the row stays behind for audit.
pub async fn create_booking(
    state: &Arc<AppState>,
    user_id: &str,
    user_email: Option<&str>,
    req: &BookingRequest,
) -> Result<PaymentHandshake, AppError> {
    let booking = {
        let mut db = state.db.lock().unwrap();
        admit(&mut db, user_id, user_email, req)?
    };

    match state
        .gateway
        .create_transaction(&booking.order_id, booking.total_price, user_email)
        .await
    {
        Ok(token) => {
            {
                let db = state.db.lock().unwrap();
                queries::set_payment_token(&db, &booking.id, &token)?;
            }
            let mut booking = booking;
            booking.payment_token = Some(token.clone());
            Ok(PaymentHandshake { token, booking })
        }
        Err(e) => {
            tracing::error!(booking_id = %booking.id, error = %e, "gateway token request failed, cancelling booking");
            {
                let db = state.db.lock().unwrap();
                if let Err(cancel_err) =
                    queries::update_booking_status(&db, &booking.id, BookingStatus::Cancelled)
                {
                    tracing::error!(booking_id = %booking.id, error = %cancel_err, "failed to cancel booking after gateway failure");
                }
            }
            Err(AppError::Gateway(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn request(slot: &str) -> BookingRequest {
        BookingRequest {
            car_type_id: "sedan".to_string(),
            time_slot_id: slot.to_string(),
            booking_date: NaiveDateTime::parse_from_str("2025-06-16 08:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
        }
    }

    #[test]
    fn test_admit_creates_pending_booking_with_order_id() {
        let mut conn = setup_db();
        let booking = admit(&mut conn, "user-1", Some("a@b.test"), &request("slot-08")).unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert_eq!(booking.order_id, booking.id);
        assert_eq!(booking.total_price, 75000);

        let stored = queries::get_booking_by_id(&conn, &booking.id).unwrap().unwrap();
        assert_eq!(stored.order_id, booking.id);
    }

    #[test]
    fn test_admit_enforces_capacity() {
        let mut conn = setup_db();
        admit(&mut conn, "user-1", None, &request("slot-08")).unwrap();
        admit(&mut conn, "user-2", None, &request("slot-08")).unwrap();

        let result = admit(&mut conn, "user-3", None, &request("slot-08"));
        assert!(matches!(result, Err(AppError::CapacityExceeded)));

        let count =
            queries::count_active_bookings_for_slot(&conn, request("slot-08").booking_date.date(), "slot-08")
                .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_admit_frees_capacity_after_cancellation() {
        let mut conn = setup_db();
        let first = admit(&mut conn, "user-1", None, &request("slot-08")).unwrap();
        admit(&mut conn, "user-2", None, &request("slot-08")).unwrap();

        queries::update_booking_status(&conn, &first.id, BookingStatus::Cancelled).unwrap();

        assert!(admit(&mut conn, "user-3", None, &request("slot-08")).is_ok());
    }

    #[test]
    fn test_admit_other_slot_unaffected() {
        let mut conn = setup_db();
        admit(&mut conn, "user-1", None, &request("slot-08")).unwrap();
        admit(&mut conn, "user-2", None, &request("slot-08")).unwrap();

        assert!(admit(&mut conn, "user-3", None, &request("slot-09")).is_ok());
    }

    #[test]
    fn test_admit_unknown_slot() {
        let mut conn = setup_db();
        let result = admit(&mut conn, "user-1", None, &request("slot-99"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_admit_unknown_car_type() {
        let mut conn = setup_db();
        let mut req = request("slot-08");
        req.car_type_id = "limousine".to_string();
        let result = admit(&mut conn, "user-1", None, &req);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
