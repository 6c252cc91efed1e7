use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::error::{AvailabilityError, AvailabilityResult};
use crate::models::{Appointment, ClockTime, OpenInterval, SlotConflictPolicy, TimeSlot};

/// Enumerates bookable start times between two `HH:mm` bounds.
///
/// Slots start at `start_time` and advance by `slot_duration` minutes for as
/// long as the slot *start* is before `end_time`; the last slot may run past
/// `end_time`. A slot is taken when an appointment starts at exactly the same
/// wall-clock time.
pub fn generate_time_slots(
    start_time: &str,
    end_time: &str,
    slot_duration: u32,
    existing_appointments: &[Appointment],
) -> AvailabilityResult<Vec<TimeSlot>> {
    generate_time_slots_with_policy(
        start_time,
        end_time,
        slot_duration,
        existing_appointments,
        SlotConflictPolicy::ExactStart,
    )
}

pub fn generate_time_slots_with_policy(
    start_time: &str,
    end_time: &str,
    slot_duration: u32,
    existing_appointments: &[Appointment],
    policy: SlotConflictPolicy,
) -> AvailabilityResult<Vec<TimeSlot>> {
    let interval = OpenInterval {
        start: ClockTime::parse(start_time)?,
        end: ClockTime::parse(end_time)?,
    };
    slots_for_interval(interval, slot_duration, existing_appointments, policy)
}

pub fn slots_for_interval(
    interval: OpenInterval,
    slot_duration: u32,
    existing_appointments: &[Appointment],
    policy: SlotConflictPolicy,
) -> AvailabilityResult<Vec<TimeSlot>> {
    if slot_duration == 0 {
        return Err(AvailabilityError::Validation(
            "Slot duration must be a positive number of minutes".to_string(),
        ));
    }

    // Walk on a fixed reference date so that stepping past midnight ends the
    // loop instead of wrapping back to 00:00.
    let reference = NaiveDate::default();
    let stride = Duration::minutes(i64::from(slot_duration));
    let end = reference.and_time(interval.end.as_naive());
    let mut current = reference.and_time(interval.start.as_naive());

    let mut slots = Vec::new();
    while current < end {
        let time = ClockTime::from_naive(current.time());
        let blocking = find_blocking_appointment(time, slot_duration, existing_appointments, policy);

        slots.push(TimeSlot {
            time,
            available: blocking.is_none(),
            appointment_id: blocking.map(|appointment| appointment.id),
        });

        current += stride;
    }

    debug!(
        "Generated {} slots between {} and {} every {} min ({:?})",
        slots.len(), interval.start, interval.end, slot_duration, policy
    );

    Ok(slots)
}

/// First appointment, in input order, that takes the slot.
fn find_blocking_appointment<'a>(
    slot: ClockTime,
    slot_duration: u32,
    existing_appointments: &'a [Appointment],
    policy: SlotConflictPolicy,
) -> Option<&'a Appointment> {
    match policy {
        SlotConflictPolicy::ExactStart => existing_appointments
            .iter()
            .find(|appointment| appointment.start_clock_time() == slot),
        SlotConflictPolicy::Overlap => {
            let slot_start = i64::from(slot.minutes_since_midnight());
            let slot_end = slot_start + i64::from(slot_duration);

            existing_appointments.iter().find(|appointment| {
                let appointment_start = i64::from(appointment.start_clock_time().minutes_since_midnight());
                // A zero-length booking still occupies its own start minute.
                let appointment_end = appointment_start + i64::from(appointment.duration_minutes.max(1));
                appointment_start < slot_end && slot_start < appointment_end
            })
        }
    }
}
