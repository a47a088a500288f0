use serde::Serialize;

/// One entry in an availability answer: a catalog slot annotated with whether
/// it can still be booked on the queried date. The flag is advisory for the
/// booking UI; admission re-checks capacity atomically at write time.
#[derive(Debug, Clone, Serialize)]
pub struct SlotAvailability {
    pub id: String,
    pub time: String,
    pub capacity: i64,
    pub is_available: bool,
}
