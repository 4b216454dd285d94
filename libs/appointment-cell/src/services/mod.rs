pub mod booking;
pub mod slots;

pub use booking::AppointmentBookingService;
pub use slots::{all_slots, open_slots};
