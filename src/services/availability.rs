use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::SlotAvailability;

/// Which slots can a customer pick on `date`, and which of them still have
/// room? Read-only; admission re-checks capacity under a transaction.
///
/// A weekday without active operating hours yields an empty list (closed day,
/// not an error). Slots are filtered to the half-open window
/// `[open_time, close_time)` and returned in ascending time order.
pub fn slots_for_date(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<SlotAvailability>> {
    // 0 = Sunday, matching the operating_hours seed convention
    let day_of_week = date.weekday().num_days_from_sunday();

    let Some(hours) = queries::get_operating_hours(conn, day_of_week)? else {
        return Ok(vec![]);
    };

    let slots = queries::list_time_slots(conn)?;
    let booked = queries::count_active_bookings_by_slot(conn, date)?;

    Ok(slots
        .into_iter()
        .filter(|slot| slot.time >= hours.open_time && slot.time < hours.close_time)
        .map(|slot| {
            let count = booked.get(&slot.id).copied().unwrap_or(0);
            SlotAvailability {
                is_available: count < slot.capacity,
                id: slot.id,
                time: slot.time,
                capacity: slot.capacity,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{Booking, BookingStatus, PaymentStatus};
    use chrono::NaiveDateTime;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn insert_booking(conn: &Connection, id: &str, slot_id: &str, dt: &str, status: BookingStatus) {
        let now = chrono::Utc::now().naive_utc();
        let booking = Booking {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            user_email: None,
            car_type_id: "sedan".to_string(),
            time_slot_id: slot_id.to_string(),
            booking_date: NaiveDateTime::parse_from_str(dt, "%Y-%m-%d %H:%M:%S").unwrap(),
            total_price: 75000,
            status,
            payment_status: PaymentStatus::Pending,
            order_id: id.to_string(),
            payment_token: None,
            created_at: now,
            updated_at: now,
        };
        queries::create_booking(conn, &booking).unwrap();
    }

    #[test]
    fn test_closed_day_returns_empty() {
        let conn = setup_db();
        // 2025-06-15 is a Sunday; no operating_hours row exists for it
        let slots = slots_for_date(&conn, date("2025-06-15")).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_inactive_day_returns_empty() {
        let conn = setup_db();
        conn.execute("UPDATE operating_hours SET is_active = 0 WHERE day_of_week = 1", [])
            .unwrap();
        let slots = slots_for_date(&conn, date("2025-06-16")).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_weekday_lists_all_slots_in_order() {
        let conn = setup_db();
        // Monday, 08:00-17:00: the full 08..16 grid
        let slots = slots_for_date(&conn, date("2025-06-16")).unwrap();
        assert_eq!(slots.len(), 9);
        assert_eq!(slots.first().unwrap().time, "08:00");
        assert_eq!(slots.last().unwrap().time, "16:00");
        assert!(slots.iter().all(|s| s.is_available));
        assert!(slots.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_half_open_boundary_excludes_close_time() {
        let conn = setup_db();
        // Saturday closes at 12:00: the 12:00 slot must not appear, 08:00 must
        let slots = slots_for_date(&conn, date("2025-06-21")).unwrap();
        let times: Vec<&str> = slots.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["08:00", "09:00", "10:00", "11:00"]);
    }

    #[test]
    fn test_full_slot_reported_unavailable() {
        let conn = setup_db();
        insert_booking(&conn, "b1", "slot-08", "2025-06-16 08:00:00", BookingStatus::Pending);
        insert_booking(&conn, "b2", "slot-08", "2025-06-16 08:00:00", BookingStatus::Paid);

        let slots = slots_for_date(&conn, date("2025-06-16")).unwrap();
        let slot08 = slots.iter().find(|s| s.id == "slot-08").unwrap();
        assert!(!slot08.is_available);
        let slot09 = slots.iter().find(|s| s.id == "slot-09").unwrap();
        assert!(slot09.is_available);
    }

    #[test]
    fn test_cancelled_bookings_do_not_count() {
        let conn = setup_db();
        insert_booking(&conn, "b1", "slot-08", "2025-06-16 08:00:00", BookingStatus::Paid);
        insert_booking(&conn, "b2", "slot-08", "2025-06-16 08:00:00", BookingStatus::Cancelled);

        let slots = slots_for_date(&conn, date("2025-06-16")).unwrap();
        let slot08 = slots.iter().find(|s| s.id == "slot-08").unwrap();
        assert!(slot08.is_available);
    }

    #[test]
    fn test_other_dates_do_not_count() {
        let conn = setup_db();
        // Same slot, previous day: capacity on the 16th is untouched
        insert_booking(&conn, "b1", "slot-08", "2025-06-13 08:00:00", BookingStatus::Paid);
        insert_booking(&conn, "b2", "slot-08", "2025-06-13 08:00:00", BookingStatus::Paid);

        let slots = slots_for_date(&conn, date("2025-06-16")).unwrap();
        let slot08 = slots.iter().find(|s| s.id == "slot-08").unwrap();
        assert!(slot08.is_available);
    }
}
