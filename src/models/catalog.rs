use serde::{Deserialize, Serialize};

/// A service type with its fixed price. Seeded reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarType {
    pub id: String,
    pub name: String,
    pub price: i64,
}

/// Opening hours for one weekday (0 = Sunday .. 6 = Saturday). A weekday
/// with no row, or an inactive row, means the business is closed that day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingHour {
    pub day_of_week: u32,
    pub open_time: String,
    pub close_time: String,
    pub is_active: bool,
}

/// A fixed time-of-day bucket ("HH:MM") reused across all calendar dates,
/// with the maximum number of concurrent bookings it can hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub time: String,
    pub capacity: i64,
}
