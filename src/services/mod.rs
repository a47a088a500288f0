pub mod admission;
pub mod availability;
pub mod notify;
pub mod payment;
pub mod reconciliation;
