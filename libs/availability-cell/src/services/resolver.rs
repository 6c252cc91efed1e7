use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::models::{
    AvailabilityException, DayAvailability, ExceptionType, OpenInterval, RecurringAvailability,
};
use crate::services::calendar::{date_key, day_of_week};

/// Decides whether a practitioner can be booked on `date` and which open
/// intervals apply.
///
/// The first exception dated `date` wins over the weekly schedule:
/// `unavailable` closes the day, `custom_hours` with both bounds replaces
/// the recurring blocks. A `custom_hours` row missing a bound is ignored.
pub fn get_availability_for_date(
    date: NaiveDate,
    recurring_availability: &[RecurringAvailability],
    exceptions: &[AvailabilityException],
) -> DayAvailability {
    let weekday = day_of_week(date);

    if let Some(exception) = exceptions.iter().find(|ex| ex.exception_date == date) {
        match exception.exception_type {
            ExceptionType::Unavailable => {
                debug!("Exception {} closes {}", exception.id, date_key(date));
                return DayAvailability::unavailable();
            }
            ExceptionType::CustomHours => match exception.custom_interval() {
                Some(interval) => {
                    debug!(
                        "Exception {} sets custom hours {}-{} on {}",
                        exception.id, interval.start, interval.end, date_key(date)
                    );
                    return DayAvailability::open(vec![interval]);
                }
                None => warn!(
                    "Custom-hours exception {} on {} has no bounds, using weekly schedule",
                    exception.id,
                    date_key(date)
                ),
            },
        }
    }

    let intervals: Vec<OpenInterval> = recurring_availability
        .iter()
        .filter(|av| av.day_of_week == weekday && av.is_active)
        .map(|av| OpenInterval {
            start: av.start_time,
            end: av.end_time,
        })
        .collect();

    if intervals.is_empty() {
        DayAvailability::unavailable()
    } else {
        DayAvailability::open(intervals)
    }
}
