use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::AvailabilityError;

pub use shared_config::DEFAULT_SLOT_DURATION_MINUTES;

// ==============================================================================
// WALL-CLOCK TIME
// ==============================================================================

/// A minute-precision wall-clock time with no date or timezone attached.
///
/// Displays and serializes as `HH:mm`. Deserialization also accepts the
/// `HH:mm:ss` form PostgREST returns for `time` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Strict `HH:mm`, 24-hour, two digits on each side.
    pub fn parse(value: &str) -> Result<Self, AvailabilityError> {
        let bytes = value.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 2 || b.is_ascii_digit());

        if !well_formed {
            return Err(invalid_time(value));
        }

        NaiveTime::parse_from_str(value, "%H:%M")
            .map(Self)
            .map_err(|_| invalid_time(value))
    }

    /// `HH:mm` or `HH:mm:ss`; seconds are dropped.
    pub fn parse_lenient(value: &str) -> Result<Self, AvailabilityError> {
        if value.len() == 8 && value.is_ascii() && value.as_bytes()[5] == b':' {
            NaiveTime::parse_from_str(value, "%H:%M:%S")
                .map_err(|_| invalid_time(value))?;
            return Self::parse(&value[..5]);
        }
        Self::parse(value)
    }

    pub fn from_naive(time: NaiveTime) -> Self {
        Self(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time))
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }
}

fn invalid_time(value: &str) -> AvailabilityError {
    AvailabilityError::Validation(format!("Invalid time '{}': expected HH:mm", value))
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for ClockTime {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ClockTime::parse_lenient(&raw).map_err(de::Error::custom)
    }
}

// ==============================================================================
// STORED ROWS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringAvailability {
    pub id: Uuid,
    pub practitioner_id: Uuid,
    pub day_of_week: i32, // 0 = Sunday, 1 = Monday, etc.
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionType {
    Unavailable,
    CustomHours,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityException {
    pub id: Uuid,
    pub practitioner_id: Uuid,
    pub exception_date: NaiveDate,
    pub exception_type: ExceptionType,
    #[serde(default)]
    pub start_time: Option<ClockTime>,
    #[serde(default)]
    pub end_time: Option<ClockTime>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AvailabilityException {
    /// Custom hours only take effect when both bounds are set.
    pub fn custom_interval(&self) -> Option<OpenInterval> {
        match (self.exception_type, self.start_time, self.end_time) {
            (ExceptionType::CustomHours, Some(start), Some(end)) => Some(OpenInterval { start, end }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[default]
    Standard,
    Emergency,
    Teleconsultation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub practitioner_id: Option<Uuid>,
    #[serde(default)]
    pub act_id: Option<Uuid>,
    pub appointment_date: DateTime<FixedOffset>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub appointment_type: AppointmentType,
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(default)]
    pub emergency_surcharge: f64,
    #[serde(default)]
    pub total_price: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Appointment {
    /// Wall-clock start in the offset the timestamp was recorded with.
    pub fn start_clock_time(&self) -> ClockTime {
        ClockTime::from_naive(self.appointment_date.time())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentAct {
    pub id: Uuid,
    pub practitioner_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price_euros: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_first_consultation: bool,
    pub is_active: bool,
}

// ==============================================================================
// DERIVED VALUES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub time: ClockTime,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInterval {
    pub start: ClockTime,
    pub end: ClockTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<OpenInterval>>,
}

impl DayAvailability {
    pub fn unavailable() -> Self {
        Self { available: false, slots: None }
    }

    pub fn open(slots: Vec<OpenInterval>) -> Self {
        Self { available: true, slots: Some(slots) }
    }

    pub fn intervals(&self) -> &[OpenInterval] {
        self.slots.as_deref().unwrap_or(&[])
    }
}

/// How existing appointments block generated slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotConflictPolicy {
    /// Only a slot whose time equals an appointment's start is taken.
    #[default]
    ExactStart,
    /// Any slot overlapping `[start, start + duration)` of an appointment is taken.
    Overlap,
}

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecurringAvailabilityRequest {
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRecurringAvailabilityRequest {
    pub day_of_week: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExceptionRequest {
    pub exception_date: NaiveDate,
    pub exception_type: ExceptionType,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlotsQueryRequest {
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub policy: SlotConflictPolicy,
}

// ==============================================================================
// RESPONSES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySlotsResponse {
    pub practitioner_id: Uuid,
    pub date: NaiveDate,
    pub day_name: String,
    pub display_date: String,
    pub available: bool,
    pub slot_duration_minutes: u32,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekDayOverview {
    pub date: NaiveDate,
    pub day_name: String,
    pub display_date: String,
    pub available: bool,
    pub intervals: Vec<OpenInterval>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekOverviewResponse {
    pub practitioner_id: Uuid,
    pub week_start: NaiveDate,
    pub days: Vec<WeekDayOverview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingQuote {
    pub act_id: Uuid,
    pub act_title: String,
    pub duration_minutes: i32,
    pub is_emergency: bool,
    pub act_price: f64,
    pub emergency_surcharge: f64,
    pub total_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyWaitEstimate {
    pub estimated_wait: String,
    pub emergency_surcharge: f64,
}
