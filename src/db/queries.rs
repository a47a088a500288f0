use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::models::{Booking, BookingStatus, CarType, OperatingHour, PaymentStatus, TimeSlot};

const BOOKING_COLUMNS: &str = "id, user_id, user_email, car_type_id, time_slot_id, booking_date, \
     total_price, status, payment_status, order_id, payment_token, created_at, updated_at";

/// Inclusive TEXT range covering one calendar day in the stored
/// `%Y-%m-%d %H:%M:%S` format.
fn day_bounds(date: NaiveDate) -> (String, String) {
    let day = date.format("%Y-%m-%d");
    (format!("{day} 00:00:00"), format!("{day} 23:59:59"))
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc())
}

fn parse_booking_row(row: &Row) -> anyhow::Result<Booking> {
    let status: String = row.get(7)?;
    let payment_status: String = row.get(8)?;
    let booking_date: String = row.get(5)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;

    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        user_email: row.get(2)?,
        car_type_id: row.get(3)?,
        time_slot_id: row.get(4)?,
        booking_date: parse_datetime(&booking_date),
        total_price: row.get(6)?,
        status: BookingStatus::from_str(&status),
        payment_status: PaymentStatus::from_str(&payment_status),
        order_id: row.get(9)?,
        payment_token: row.get(10)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

// ── Catalog ──

pub fn list_car_types(conn: &Connection) -> anyhow::Result<Vec<CarType>> {
    let mut stmt = conn.prepare("SELECT id, name, price FROM car_types ORDER BY price ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(CarType {
            id: row.get(0)?,
            name: row.get(1)?,
            price: row.get(2)?,
        })
    })?;

    let mut car_types = vec![];
    for row in rows {
        car_types.push(row?);
    }
    Ok(car_types)
}

pub fn get_car_type(conn: &Connection, id: &str) -> anyhow::Result<Option<CarType>> {
    let mut stmt = conn.prepare("SELECT id, name, price FROM car_types WHERE id = ?1")?;
    let result = stmt.query_row(params![id], |row| {
        Ok(CarType {
            id: row.get(0)?,
            name: row.get(1)?,
            price: row.get(2)?,
        })
    });

    match result {
        Ok(car_type) => Ok(Some(car_type)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Active operating hours for a weekday (0 = Sunday). `None` means closed.
pub fn get_operating_hours(
    conn: &Connection,
    day_of_week: u32,
) -> anyhow::Result<Option<OperatingHour>> {
    let mut stmt = conn.prepare(
        "SELECT day_of_week, open_time, close_time, is_active
         FROM operating_hours WHERE day_of_week = ?1 AND is_active = 1",
    )?;
    let result = stmt.query_row(params![day_of_week], |row| {
        Ok(OperatingHour {
            day_of_week: row.get(0)?,
            open_time: row.get(1)?,
            close_time: row.get(2)?,
            is_active: row.get(3)?,
        })
    });

    match result {
        Ok(hours) => Ok(Some(hours)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_time_slots(conn: &Connection) -> anyhow::Result<Vec<TimeSlot>> {
    let mut stmt = conn.prepare("SELECT id, time, capacity FROM time_slots ORDER BY time ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(TimeSlot {
            id: row.get(0)?,
            time: row.get(1)?,
            capacity: row.get(2)?,
        })
    })?;

    let mut slots = vec![];
    for row in rows {
        slots.push(row?);
    }
    Ok(slots)
}

pub fn get_time_slot(conn: &Connection, id: &str) -> anyhow::Result<Option<TimeSlot>> {
    let mut stmt = conn.prepare("SELECT id, time, capacity FROM time_slots WHERE id = ?1")?;
    let result = stmt.query_row(params![id], |row| {
        Ok(TimeSlot {
            id: row.get(0)?,
            time: row.get(1)?,
            capacity: row.get(2)?,
        })
    });

    match result {
        Ok(slot) => Ok(Some(slot)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let booking_date = booking.booking_date.format("%Y-%m-%d %H:%M:%S").to_string();
    let created_at = booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated_at = booking.updated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO bookings (id, user_id, user_email, car_type_id, time_slot_id, booking_date, \
         total_price, status, payment_status, order_id, payment_token, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            booking.id,
            booking.user_id,
            booking.user_email,
            booking.car_type_id,
            booking.time_slot_id,
            booking_date,
            booking.total_price,
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.order_id,
            booking.payment_token,
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"))?;
    let result = stmt.query_row(params![id], |row| Ok(parse_booking_row(row)));

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Webhook join: look up the booking a gateway notification belongs to.
pub fn get_booking_by_order_id(conn: &Connection, order_id: &str) -> anyhow::Result<Option<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE order_id = ?1"
    ))?;
    let result = stmt.query_row(params![order_id], |row| Ok(parse_booking_row(row)));

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Number of non-cancelled bookings occupying a slot on a given day. This is
/// the count the capacity invariant is enforced against.
pub fn count_active_bookings_for_slot(
    conn: &Connection,
    date: NaiveDate,
    time_slot_id: &str,
) -> anyhow::Result<i64> {
    let (day_start, day_end) = day_bounds(date);
    let count = conn.query_row(
        "SELECT COUNT(*) FROM bookings
         WHERE booking_date >= ?1 AND booking_date <= ?2
           AND time_slot_id = ?3 AND status != 'CANCELLED'",
        params![day_start, day_end, time_slot_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Non-cancelled booking counts for a whole day, keyed by slot id.
pub fn count_active_bookings_by_slot(
    conn: &Connection,
    date: NaiveDate,
) -> anyhow::Result<HashMap<String, i64>> {
    let (day_start, day_end) = day_bounds(date);
    let mut stmt = conn.prepare(
        "SELECT time_slot_id, COUNT(*) FROM bookings
         WHERE booking_date >= ?1 AND booking_date <= ?2 AND status != 'CANCELLED'
         GROUP BY time_slot_id",
    )?;
    let rows = stmt.query_map(params![day_start, day_end], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut counts = HashMap::new();
    for row in rows {
        let (slot_id, count) = row?;
        counts.insert(slot_id, count);
    }
    Ok(counts)
}

pub fn set_payment_token(conn: &Connection, id: &str, token: &str) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
    let count = conn.execute(
        "UPDATE bookings SET payment_token = ?1, updated_at = ?2 WHERE id = ?3",
        params![token, now, id],
    )?;
    Ok(count > 0)
}

/// Persist a reconciliation outcome: both lifecycle columns move in one
/// statement so a crash between them cannot leave the pair inconsistent.
pub fn update_payment_state(
    conn: &Connection,
    id: &str,
    payment_status: &PaymentStatus,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
    let count = conn.execute(
        "UPDATE bookings SET payment_status = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
        params![payment_status.as_str(), status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

// ── Listings ──

/// A booking joined with its car type and slot, for listing endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    pub id: String,
    pub user_id: String,
    pub car_type_name: String,
    pub slot_time: String,
    pub booking_date: String,
    pub total_price: i64,
    pub status: String,
    pub payment_status: String,
    pub payment_token: Option<String>,
    pub created_at: String,
}

fn parse_details_row(row: &Row) -> rusqlite::Result<BookingDetails> {
    Ok(BookingDetails {
        id: row.get(0)?,
        user_id: row.get(1)?,
        car_type_name: row.get(2)?,
        slot_time: row.get(3)?,
        booking_date: row.get(4)?,
        total_price: row.get(5)?,
        status: row.get(6)?,
        payment_status: row.get(7)?,
        payment_token: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const DETAILS_SELECT: &str = "SELECT b.id, b.user_id, c.name, t.time, b.booking_date, \
     b.total_price, b.status, b.payment_status, b.payment_token, b.created_at
     FROM bookings b
     JOIN car_types c ON c.id = b.car_type_id
     JOIN time_slots t ON t.id = b.time_slot_id";

pub fn get_booking_details(conn: &Connection, id: &str) -> anyhow::Result<Option<BookingDetails>> {
    let mut stmt = conn.prepare(&format!("{DETAILS_SELECT} WHERE b.id = ?1"))?;
    let result = stmt.query_row(params![id], parse_details_row);

    match result {
        Ok(details) => Ok(Some(details)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_bookings_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<BookingDetails>> {
    let mut stmt = conn.prepare(&format!(
        "{DETAILS_SELECT} WHERE b.user_id = ?1 ORDER BY b.booking_date DESC"
    ))?;
    let rows = stmt.query_map(params![user_id], parse_details_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

pub fn get_all_bookings(
    conn: &Connection,
    status_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<BookingDetails>> {
    let mut bookings = vec![];
    match status_filter {
        Some(status) => {
            let mut stmt = conn.prepare(&format!(
                "{DETAILS_SELECT} WHERE b.status = ?1 ORDER BY b.created_at DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![status, limit], parse_details_row)?;
            for row in rows {
                bookings.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "{DETAILS_SELECT} ORDER BY b.created_at DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], parse_details_row)?;
            for row in rows {
                bookings.push(row?);
            }
        }
    }
    Ok(bookings)
}

// ── Dashboard ──

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub completed: i64,
    pub total_revenue: i64,
}

pub fn get_dashboard_stats(conn: &Connection) -> anyhow::Result<DashboardStats> {
    conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(status = 'PENDING'), 0),
                COALESCE(SUM(status = 'CONFIRMED'), 0),
                COALESCE(SUM(status = 'COMPLETED'), 0),
                COALESCE(SUM(CASE WHEN payment_status = 'success' THEN total_price ELSE 0 END), 0)
         FROM bookings",
        [],
        |row| {
            Ok(DashboardStats {
                total: row.get(0)?,
                pending: row.get(1)?,
                confirmed: row.get(2)?,
                completed: row.get(3)?,
                total_revenue: row.get(4)?,
            })
        },
    )
    .map_err(Into::into)
}
