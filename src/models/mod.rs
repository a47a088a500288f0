pub mod availability;
pub mod booking;
pub mod catalog;
pub mod notification;

pub use availability::SlotAvailability;
pub use booking::{Booking, BookingStatus, PaymentStatus};
pub use catalog::{CarType, OperatingHour, TimeSlot};
pub use notification::{GatewayNotification, GatewayTransactionStatus};
