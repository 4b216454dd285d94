use std::collections::HashSet;

use crate::models::{AppointmentStatus, BookedSlot};

pub const OPENING_HOUR: u32 = 9;
pub const CLOSING_HOUR: u32 = 17;

/// Every half-hour label from opening up to (not including) closing, in order.
pub fn all_slots() -> Vec<String> {
    (OPENING_HOUR..CLOSING_HOUR)
        .flat_map(|hour| [format!("{:02}:00", hour), format!("{:02}:30", hour)])
        .collect()
}

/// The grid minus every label held by a non-cancelled booking.
///
/// Doctor working days and hours are not consulted.
pub fn open_slots(booked: &[BookedSlot]) -> Vec<String> {
    let taken: HashSet<&str> = booked
        .iter()
        .filter(|slot| slot.status != AppointmentStatus::Cancelled)
        .map(|slot| slot.time.as_str())
        .collect();

    all_slots()
        .into_iter()
        .filter(|label| !taken.contains(label.as_str()))
        .collect()
}
