use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus};
use crate::services::notify::invoice;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<queries::BookingDetails>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let limit = query.limit.unwrap_or(50);
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_all_bookings(&db, query.status.as_deref(), limit)?
    };
    Ok(Json(bookings))
}

// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<queries::DashboardStats>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let stats = {
        let db = state.db.lock().unwrap();
        queries::get_dashboard_stats(&db)?
    };
    Ok(Json(stats))
}

/// Move one booking along the lifecycle, rejecting anything the state machine
/// does not allow and reporting the current status back to the operator.
fn transition(
    state: &Arc<AppState>,
    id: &str,
    action: &'static str,
    allowed_from: &[BookingStatus],
    to: BookingStatus,
) -> Result<Booking, AppError> {
    let db = state.db.lock().unwrap();

    let mut booking = queries::get_booking_by_id(&db, id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    if !allowed_from.contains(&booking.status) {
        return Err(AppError::InvalidTransition {
            action,
            current: booking.status.as_str().to_string(),
        });
    }

    queries::update_booking_status(&db, id, to)?;
    booking.status = to;
    Ok(booking)
}

// POST /api/admin/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let booking = transition(
        &state,
        &id,
        "confirm",
        &[BookingStatus::Paid],
        BookingStatus::Confirmed,
    )?;

    // Invoice send is fire-and-forget: the booking stays CONFIRMED even when
    // the mail provider is down.
    match &booking.user_email {
        Some(email) => {
            let details = {
                let db = state.db.lock().unwrap();
                queries::get_booking_details(&db, &id)?
            };
            if let Some(details) = details {
                let subject = invoice::invoice_subject(&details);
                let html = invoice::render_invoice_html(&details);
                if let Err(e) = state.mailer.send_invoice(email, &subject, &html).await {
                    tracing::error!(booking_id = %id, error = %e, "failed to send invoice email");
                }
            }
        }
        None => {
            tracing::warn!(booking_id = %id, "no customer email on booking, skipping invoice");
        }
    }

    tracing::info!(booking_id = %id, "booking confirmed");
    Ok(Json(booking))
}

// POST /api/admin/bookings/:id/complete
pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let booking = transition(
        &state,
        &id,
        "complete",
        &[BookingStatus::Confirmed],
        BookingStatus::Completed,
    )?;

    tracing::info!(booking_id = %id, "booking completed");
    Ok(Json(booking))
}

// POST /api/admin/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let booking = transition(
        &state,
        &id,
        "cancel",
        &[BookingStatus::Pending, BookingStatus::Paid],
        BookingStatus::Cancelled,
    )?;

    tracing::info!(booking_id = %id, "booking cancelled");
    Ok(Json(booking))
}
