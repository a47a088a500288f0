use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::CarType;
use crate::services::admission::{self, BookingRequest, PaymentHandshake};
use crate::state::AppState;

/// The authenticated principal arrives from the session layer in front of
/// this service as headers; authentication itself is not this service's job.
fn require_user(headers: &HeaderMap) -> Result<(String, Option<String>), AppError> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::Unauthorized)?
        .to_string();
    let email = headers
        .get("x-user-email")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    Ok((user_id, email))
}

fn parse_booking_date(s: &str) -> Result<NaiveDateTime, AppError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("invalid booking date: {s}")))
}

// GET /api/car-types
pub async fn get_car_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CarType>>, AppError> {
    let car_types = {
        let db = state.db.lock().unwrap();
        queries::list_car_types(&db)?
    };
    Ok(Json(car_types))
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub car_type_id: String,
    pub time_slot_id: String,
    pub booking_date: String,
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBookingRequest>,
) -> Result<Json<PaymentHandshake>, AppError> {
    let (user_id, user_email) = require_user(&headers)?;
    let booking_date = parse_booking_date(&body.booking_date)?;

    let req = BookingRequest {
        car_type_id: body.car_type_id,
        time_slot_id: body.time_slot_id,
        booking_date,
    };

    let handshake = admission::create_booking(&state, &user_id, user_email.as_deref(), &req).await?;

    tracing::info!(
        booking_id = %handshake.booking.id,
        user_id = %user_id,
        slot = %handshake.booking.time_slot_id,
        "booking admitted"
    );

    Ok(Json(handshake))
}

// GET /api/my-bookings
pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<queries::BookingDetails>>, AppError> {
    let (user_id, _) = require_user(&headers)?;

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_bookings_for_user(&db, &user_id)?
    };
    Ok(Json(bookings))
}
