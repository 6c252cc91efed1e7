pub mod availability;
pub mod calendar;
pub mod emergency;
pub mod pricing;
pub mod resolver;
pub mod slots;

pub use availability::AvailabilityService;
pub use calendar::{
    date_key, day_of_week, format_date_for_display, get_day_name, get_week_days, start_of_week,
};
pub use emergency::estimate_emergency_wait_time;
pub use pricing::{quote_booking, EMERGENCY_SURCHARGE_EUROS};
pub use resolver::get_availability_for_date;
pub use slots::{generate_time_slots, generate_time_slots_with_policy, slots_for_interval};
