pub mod doctor;

pub use doctor::{next_rating, DoctorService};
