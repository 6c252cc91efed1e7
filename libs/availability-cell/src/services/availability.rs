use std::sync::Arc;

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::error::{AvailabilityError, AvailabilityResult};
use crate::models::{
    Appointment, AppointmentAct, AvailabilityException, BookingQuote, ClockTime,
    CreateExceptionRequest, CreateRecurringAvailabilityRequest, DayAvailability, DaySlotsResponse,
    ExceptionType, OpenInterval, RecurringAvailability, SlotsQueryRequest,
    UpdateRecurringAvailabilityRequest, WeekDayOverview, WeekOverviewResponse,
};
use crate::services::calendar::{
    date_key, day_of_week, format_date_for_display, get_day_name, get_week_days, start_of_week,
};
use crate::services::pricing::quote_booking;
use crate::services::resolver::get_availability_for_date;
use crate::services::slots::slots_for_interval;

const RECURRING_TABLE: &str = "/rest/v1/recurring_availability";
const EXCEPTIONS_TABLE: &str = "/rest/v1/availability_exceptions";
const APPOINTMENTS_TABLE: &str = "/rest/v1/appointments";
const ACTS_TABLE: &str = "/rest/v1/appointment_acts";

// DST gaps span at most a few hours and start on 15 minute boundaries.
const MAX_DST_GAP_MINUTES: usize = 180;
const DST_GAP_STEP_MINUTES: usize = 15;

pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
    clinic_timezone: Tz,
}

impl AvailabilityService {
    pub fn new(supabase: Arc<SupabaseClient>, clinic_timezone: Tz) -> Self {
        Self { supabase, clinic_timezone }
    }

    pub fn clinic_timezone(&self) -> Tz {
        self.clinic_timezone
    }

    /// Today's date on the clinic's wall calendar.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.clinic_timezone).date_naive()
    }

    // ==========================================================================
    // RECURRING WEEKLY SCHEDULE
    // ==========================================================================

    pub async fn list_recurring_availability(
        &self,
        practitioner_id: Uuid,
        auth_token: Option<&str>,
    ) -> AvailabilityResult<Vec<RecurringAvailability>> {
        debug!("Fetching recurring availability for practitioner: {}", practitioner_id);

        let path = format!(
            "{}?practitioner_id=eq.{}&order=day_of_week.asc,start_time.asc",
            RECURRING_TABLE, practitioner_id
        );
        self.fetch(&path, auth_token).await
    }

    pub async fn create_recurring_availability(
        &self,
        practitioner_id: Uuid,
        request: CreateRecurringAvailabilityRequest,
        auth_token: &str,
    ) -> AvailabilityResult<RecurringAvailability> {
        debug!("Creating recurring availability for practitioner: {}", practitioner_id);

        validate_day_of_week(request.day_of_week)?;
        let interval = parse_interval(&request.start_time, &request.end_time)?;
        let is_active = request.is_active.unwrap_or(true);

        if is_active {
            let existing = self.list_recurring_availability(practitioner_id, Some(auth_token)).await?;
            ensure_no_overlap(&existing, request.day_of_week, interval, None)?;
        }

        let body = json!({
            "practitioner_id": practitioner_id,
            "day_of_week": request.day_of_week,
            "start_time": interval.start.to_string(),
            "end_time": interval.end.to_string(),
            "is_active": is_active
        });

        let created: RecurringAvailability = self
            .write(Method::POST, RECURRING_TABLE, auth_token, Some(body))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AvailabilityError::Upstream("Failed to create recurring availability".to_string()))?;

        info!(
            "Recurring availability {} created for practitioner {} ({} {}-{})",
            created.id, practitioner_id, created.day_of_week, created.start_time, created.end_time
        );
        Ok(created)
    }

    pub async fn update_recurring_availability(
        &self,
        practitioner_id: Uuid,
        availability_id: Uuid,
        request: UpdateRecurringAvailabilityRequest,
        auth_token: &str,
    ) -> AvailabilityResult<RecurringAvailability> {
        debug!("Updating recurring availability: {}", availability_id);

        let path = format!(
            "{}?id=eq.{}&practitioner_id=eq.{}",
            RECURRING_TABLE, availability_id, practitioner_id
        );
        let current: RecurringAvailability = self
            .fetch(&path, Some(auth_token))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| recurring_not_found(availability_id))?;

        let day_of_week = request.day_of_week.unwrap_or(current.day_of_week);
        validate_day_of_week(day_of_week)?;

        let start = match request.start_time.as_deref() {
            Some(value) => ClockTime::parse(value)?,
            None => current.start_time,
        };
        let end = match request.end_time.as_deref() {
            Some(value) => ClockTime::parse(value)?,
            None => current.end_time,
        };
        let interval = ordered_interval(start, end)?;
        let is_active = request.is_active.unwrap_or(current.is_active);

        if is_active {
            let existing = self.list_recurring_availability(practitioner_id, Some(auth_token)).await?;
            ensure_no_overlap(&existing, day_of_week, interval, Some(availability_id))?;
        }

        let mut update_data = serde_json::Map::new();
        if let Some(day) = request.day_of_week {
            update_data.insert("day_of_week".to_string(), json!(day));
        }
        if request.start_time.is_some() {
            update_data.insert("start_time".to_string(), json!(interval.start.to_string()));
        }
        if request.end_time.is_some() {
            update_data.insert("end_time".to_string(), json!(interval.end.to_string()));
        }
        if let Some(active) = request.is_active {
            update_data.insert("is_active".to_string(), json!(active));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let updated: RecurringAvailability = self
            .write(Method::PATCH, &path, auth_token, Some(Value::Object(update_data)))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| recurring_not_found(availability_id))?;

        info!("Recurring availability {} updated", availability_id);
        Ok(updated)
    }

    pub async fn delete_recurring_availability(
        &self,
        practitioner_id: Uuid,
        availability_id: Uuid,
        auth_token: &str,
    ) -> AvailabilityResult<()> {
        let path = format!(
            "{}?id=eq.{}&practitioner_id=eq.{}",
            RECURRING_TABLE, availability_id, practitioner_id
        );
        let deleted: Vec<Value> = self.write(Method::DELETE, &path, auth_token, None).await?;

        if deleted.is_empty() {
            return Err(recurring_not_found(availability_id));
        }

        info!("Recurring availability {} deleted", availability_id);
        Ok(())
    }

    // ==========================================================================
    // DATED EXCEPTIONS
    // ==========================================================================

    pub async fn list_exceptions(
        &self,
        practitioner_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        auth_token: Option<&str>,
    ) -> AvailabilityResult<Vec<AvailabilityException>> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(AvailabilityError::Validation(format!(
                    "Range start {} is after range end {}",
                    date_key(from),
                    date_key(to)
                )));
            }
        }

        let mut path = format!("{}?practitioner_id=eq.{}", EXCEPTIONS_TABLE, practitioner_id);
        if let Some(from) = from {
            path.push_str(&format!("&exception_date=gte.{}", date_key(from)));
        }
        if let Some(to) = to {
            path.push_str(&format!("&exception_date=lte.{}", date_key(to)));
        }
        path.push_str("&order=exception_date.asc,created_at.asc");

        self.fetch(&path, auth_token).await
    }

    pub async fn create_exception(
        &self,
        practitioner_id: Uuid,
        request: CreateExceptionRequest,
        auth_token: &str,
    ) -> AvailabilityResult<AvailabilityException> {
        let date = request.exception_date;
        debug!("Creating {:?} exception on {} for practitioner {}", request.exception_type, date, practitioner_id);

        let interval = match request.exception_type {
            ExceptionType::Unavailable => None,
            ExceptionType::CustomHours => match (request.start_time.as_deref(), request.end_time.as_deref()) {
                (Some(start), Some(end)) => Some(parse_interval(start, end)?),
                _ => {
                    return Err(AvailabilityError::Validation(
                        "Custom hours need both a start and an end time".to_string(),
                    ))
                }
            },
        };

        let body = json!({
            "practitioner_id": practitioner_id,
            "exception_date": date_key(date),
            "exception_type": request.exception_type,
            "start_time": interval.map(|i| i.start.to_string()),
            "end_time": interval.map(|i| i.end.to_string()),
            "reason": request.reason
        });

        let created: AvailabilityException = self
            .write(Method::POST, EXCEPTIONS_TABLE, auth_token, Some(body))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AvailabilityError::Upstream("Failed to create availability exception".to_string()))?;

        info!("Availability exception {} created on {}", created.id, date_key(date));
        Ok(created)
    }

    pub async fn delete_exception(
        &self,
        practitioner_id: Uuid,
        exception_id: Uuid,
        auth_token: &str,
    ) -> AvailabilityResult<()> {
        let path = format!(
            "{}?id=eq.{}&practitioner_id=eq.{}",
            EXCEPTIONS_TABLE, exception_id, practitioner_id
        );
        let deleted: Vec<Value> = self.write(Method::DELETE, &path, auth_token, None).await?;

        if deleted.is_empty() {
            return Err(AvailabilityError::NotFound(format!(
                "Availability exception {} not found",
                exception_id
            )));
        }

        info!("Availability exception {} deleted", exception_id);
        Ok(())
    }

    // ==========================================================================
    // APPOINTMENTS AND ACTS
    // ==========================================================================

    /// Non-cancelled appointments starting on `date` in the clinic timezone,
    /// with timestamps re-expressed in that timezone.
    pub async fn get_appointments_for_date(
        &self,
        practitioner_id: Uuid,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> AvailabilityResult<Vec<Appointment>> {
        let day_start = self.local_midnight_utc(date);
        let day_end = self.local_midnight_utc(date + Days::new(1));

        let path = format!(
            "{}?practitioner_id=eq.{}&appointment_date=gte.{}&appointment_date=lt.{}&status=neq.cancelled&order=appointment_date.asc",
            APPOINTMENTS_TABLE,
            practitioner_id,
            day_start.format("%Y-%m-%dT%H:%M:%SZ"),
            day_end.format("%Y-%m-%dT%H:%M:%SZ")
        );

        let mut appointments: Vec<Appointment> = self.fetch(&path, auth_token).await?;
        for appointment in &mut appointments {
            appointment.appointment_date = self.to_clinic_time(appointment.appointment_date);
        }

        debug!("Found {} appointments on {} for practitioner {}", appointments.len(), date, practitioner_id);
        Ok(appointments)
    }

    pub async fn get_act(&self, act_id: Uuid, auth_token: Option<&str>) -> AvailabilityResult<AppointmentAct> {
        let path = format!("{}?id=eq.{}", ACTS_TABLE, act_id);
        self.fetch(&path, auth_token)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AvailabilityError::NotFound(format!("Act {} not found", act_id)))
    }

    pub async fn quote_act(
        &self,
        act_id: Uuid,
        is_emergency: bool,
        auth_token: Option<&str>,
    ) -> AvailabilityResult<BookingQuote> {
        let act = self.get_act(act_id, auth_token).await?;
        quote_booking(&act, is_emergency)
    }

    // ==========================================================================
    // DERIVED VIEWS
    // ==========================================================================

    pub async fn get_day_availability(
        &self,
        practitioner_id: Uuid,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> AvailabilityResult<DayAvailability> {
        let recurring = self.list_recurring_availability(practitioner_id, auth_token).await?;
        let exceptions = self
            .list_exceptions(practitioner_id, Some(date), Some(date), auth_token)
            .await?;

        Ok(get_availability_for_date(date, &recurring, &exceptions))
    }

    pub async fn get_day_slots(
        &self,
        practitioner_id: Uuid,
        query: SlotsQueryRequest,
        auth_token: Option<&str>,
    ) -> AvailabilityResult<DaySlotsResponse> {
        if query.duration_minutes == 0 {
            return Err(AvailabilityError::Validation(
                "Slot duration must be a positive number of minutes".to_string(),
            ));
        }

        let day = self.get_day_availability(practitioner_id, query.date, auth_token).await?;

        let mut slots = Vec::new();
        if day.available {
            let appointments = self
                .get_appointments_for_date(practitioner_id, query.date, auth_token)
                .await?;
            for interval in day.intervals() {
                slots.extend(slots_for_interval(*interval, query.duration_minutes, &appointments, query.policy)?);
            }
        }

        Ok(DaySlotsResponse {
            practitioner_id,
            date: query.date,
            day_name: get_day_name(day_of_week(query.date))?.to_string(),
            display_date: format_date_for_display(query.date),
            available: day.available,
            slot_duration_minutes: query.duration_minutes,
            slots,
        })
    }

    pub async fn get_week_overview(
        &self,
        practitioner_id: Uuid,
        start: Option<NaiveDate>,
        auth_token: Option<&str>,
    ) -> AvailabilityResult<WeekOverviewResponse> {
        let week_start = start.unwrap_or_else(|| start_of_week(self.today()));
        let days = get_week_days(week_start);

        let recurring = self.list_recurring_availability(practitioner_id, auth_token).await?;
        let exceptions = self
            .list_exceptions(practitioner_id, Some(days[0]), Some(days[6]), auth_token)
            .await?;

        let mut overview = Vec::with_capacity(days.len());
        for date in days {
            let availability = get_availability_for_date(date, &recurring, &exceptions);
            overview.push(WeekDayOverview {
                date,
                day_name: get_day_name(day_of_week(date))?.to_string(),
                display_date: format_date_for_display(date),
                available: availability.available,
                intervals: availability.intervals().to_vec(),
            });
        }

        Ok(WeekOverviewResponse {
            practitioner_id,
            week_start,
            days: overview,
        })
    }

    // ==========================================================================
    // HELPERS
    // ==========================================================================

    async fn fetch<T: DeserializeOwned>(&self, path: &str, auth_token: Option<&str>) -> AvailabilityResult<Vec<T>> {
        self.supabase
            .request(Method::GET, path, auth_token, None)
            .await
            .map_err(AvailabilityError::from_upstream)
    }

    async fn write<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        auth_token: &str,
        body: Option<Value>,
    ) -> AvailabilityResult<Vec<T>> {
        self.supabase
            .request_with_headers(
                method,
                path,
                Some(auth_token),
                body,
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(AvailabilityError::from_upstream)
    }

    /// First instant of `date` on the clinic clock. Where a DST jump skips
    /// midnight the day starts at the first local time that exists.
    fn local_midnight_utc(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        (0..=MAX_DST_GAP_MINUTES)
            .step_by(DST_GAP_STEP_MINUTES)
            .find_map(|offset| {
                let candidate = midnight + Duration::minutes(offset as i64);
                self.clinic_timezone.from_local_datetime(&candidate).earliest()
            })
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }

    fn to_clinic_time(&self, at: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        let local = at.with_timezone(&self.clinic_timezone);
        local.with_timezone(&local.offset().fix())
    }
}

fn validate_day_of_week(day_of_week: i32) -> AvailabilityResult<()> {
    get_day_name(day_of_week).map(|_| ())
}

fn parse_interval(start: &str, end: &str) -> AvailabilityResult<OpenInterval> {
    ordered_interval(ClockTime::parse(start)?, ClockTime::parse(end)?)
}

fn ordered_interval(start: ClockTime, end: ClockTime) -> AvailabilityResult<OpenInterval> {
    if start >= end {
        return Err(AvailabilityError::Validation(format!(
            "Start time {} must be before end time {}",
            start, end
        )));
    }
    Ok(OpenInterval { start, end })
}

fn ensure_no_overlap(
    existing: &[RecurringAvailability],
    day_of_week: i32,
    interval: OpenInterval,
    ignore_id: Option<Uuid>,
) -> AvailabilityResult<()> {
    let clash = existing.iter().find(|row| {
        row.is_active
            && row.day_of_week == day_of_week
            && Some(row.id) != ignore_id
            && row.start_time < interval.end
            && interval.start < row.end_time
    });

    match clash {
        Some(row) => Err(AvailabilityError::Conflict(format!(
            "Overlaps the existing block {}-{} on the same day",
            row.start_time, row.end_time
        ))),
        None => Ok(()),
    }
}

fn recurring_not_found(availability_id: Uuid) -> AvailabilityError {
    AvailabilityError::NotFound(format!("Recurring availability {} not found", availability_id))
}
