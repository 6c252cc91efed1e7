use chrono::{Datelike, Days, NaiveDate};

use crate::error::{AvailabilityError, AvailabilityResult};

const DAY_NAMES: [&str; 7] = ["Dimanche", "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi"];

const WEEKDAY_LABELS: [&str; 7] = ["dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi"];

const MONTH_LABELS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin",
    "juillet", "août", "septembre", "octobre", "novembre", "décembre",
];

/// 0 = Sunday through 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

/// `yyyy-MM-dd`, the key exceptions are stored under.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn get_week_days(start_date: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|offset| start_date + Days::new(offset as u64))
}

/// Monday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

pub fn get_day_name(day_of_week: i32) -> AvailabilityResult<&'static str> {
    usize::try_from(day_of_week)
        .ok()
        .and_then(|index| DAY_NAMES.get(index))
        .copied()
        .ok_or_else(|| {
            AvailabilityError::Validation(format!(
                "Day of week must be between 0 (Sunday) and 6 (Saturday), got {}",
                day_of_week
            ))
        })
}

/// Long French form, e.g. `lundi 3 mars`.
pub fn format_date_for_display(date: NaiveDate) -> String {
    let weekday = WEEKDAY_LABELS[date.weekday().num_days_from_sunday() as usize];
    let month = MONTH_LABELS[date.month0() as usize];
    format!("{} {} {}", weekday, date.day(), month)
}
