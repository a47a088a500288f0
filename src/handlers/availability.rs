use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::SlotAvailability;
use crate::services::availability;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
}

// GET /api/availability?date=YYYY-MM-DD
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<SlotAvailability>>, AppError> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date: {}", query.date)))?;

    let slots = {
        let db = state.db.lock().unwrap();
        availability::slots_for_date(&db, date)?
    };

    Ok(Json(slots))
}
