use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    CreateExceptionRequest, CreateRecurringAvailabilityRequest, EmergencyWaitEstimate,
    SlotConflictPolicy, SlotsQueryRequest, UpdateRecurringAvailabilityRequest,
};
use crate::services::{estimate_emergency_wait_time, EMERGENCY_SURCHARGE_EUROS};
use crate::state::AvailabilityState;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
    pub duration_minutes: Option<u32>,
    pub policy: Option<SlotConflictPolicy>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub start: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ExceptionRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub emergency: Option<bool>,
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn get_day_availability(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let availability = state
        .availability
        .get_day_availability(practitioner_id, query.date, None)
        .await?;

    Ok(Json(json!({
        "practitioner_id": practitioner_id,
        "date": query.date,
        "availability": availability
    })))
}

#[axum::debug_handler]
pub async fn get_day_slots(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let request = SlotsQueryRequest {
        date: query.date,
        duration_minutes: query
            .duration_minutes
            .unwrap_or(state.config.default_slot_duration_minutes),
        policy: query.policy.unwrap_or_default(),
    };

    let response = state
        .availability
        .get_day_slots(practitioner_id, request, None)
        .await?;

    Ok(Json(json!(response)))
}

#[axum::debug_handler]
pub async fn get_week_overview(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Value>, AppError> {
    let overview = state
        .availability
        .get_week_overview(practitioner_id, query.start, None)
        .await?;

    Ok(Json(json!(overview)))
}

#[axum::debug_handler]
pub async fn get_booking_quote(
    State(state): State<Arc<AvailabilityState>>,
    Path(act_id): Path<Uuid>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<Value>, AppError> {
    let quote = state
        .availability
        .quote_act(act_id, query.emergency.unwrap_or(false), None)
        .await?;

    Ok(Json(json!(quote)))
}

#[axum::debug_handler]
pub async fn get_emergency_wait_time() -> Json<Value> {
    let estimate = EmergencyWaitEstimate {
        estimated_wait: estimate_emergency_wait_time(),
        emergency_surcharge: EMERGENCY_SURCHARGE_EUROS,
    };

    Json(json!(estimate))
}

// ==============================================================================
// PROTECTED SCHEDULE MANAGEMENT HANDLERS
// ==============================================================================

fn ensure_can_manage(user: &User, practitioner_id: Uuid) -> Result<(), AppError> {
    if user.can_manage_practitioner(&practitioner_id.to_string()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Not authorized to manage this practitioner's schedule".to_string(),
        ))
    }
}

#[axum::debug_handler]
pub async fn list_recurring_availability(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure_can_manage(&user, practitioner_id)?;

    let rows = state
        .availability
        .list_recurring_availability(practitioner_id, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "practitioner_id": practitioner_id,
        "recurring_availability": rows,
        "total": rows.len()
    })))
}

#[axum::debug_handler]
pub async fn create_recurring_availability(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateRecurringAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_can_manage(&user, practitioner_id)?;

    let created = state
        .availability
        .create_recurring_availability(practitioner_id, request, auth.token())
        .await?;

    Ok(Json(json!(created)))
}

#[axum::debug_handler]
pub async fn update_recurring_availability(
    State(state): State<Arc<AvailabilityState>>,
    Path((practitioner_id, availability_id)): Path<(Uuid, Uuid)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateRecurringAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_can_manage(&user, practitioner_id)?;

    let updated = state
        .availability
        .update_recurring_availability(practitioner_id, availability_id, request, auth.token())
        .await?;

    Ok(Json(json!(updated)))
}

#[axum::debug_handler]
pub async fn delete_recurring_availability(
    State(state): State<Arc<AvailabilityState>>,
    Path((practitioner_id, availability_id)): Path<(Uuid, Uuid)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure_can_manage(&user, practitioner_id)?;

    state
        .availability
        .delete_recurring_availability(practitioner_id, availability_id, auth.token())
        .await?;

    Ok(Json(json!({
        "deleted": true,
        "id": availability_id
    })))
}

#[axum::debug_handler]
pub async fn list_exceptions(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
    Query(query): Query<ExceptionRangeQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure_can_manage(&user, practitioner_id)?;

    let exceptions = state
        .availability
        .list_exceptions(practitioner_id, query.from, query.to, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "practitioner_id": practitioner_id,
        "exceptions": exceptions,
        "total": exceptions.len()
    })))
}

#[axum::debug_handler]
pub async fn create_exception(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateExceptionRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_can_manage(&user, practitioner_id)?;

    let created = state
        .availability
        .create_exception(practitioner_id, request, auth.token())
        .await?;

    Ok(Json(json!(created)))
}

#[axum::debug_handler]
pub async fn delete_exception(
    State(state): State<Arc<AvailabilityState>>,
    Path((practitioner_id, exception_id)): Path<(Uuid, Uuid)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure_can_manage(&user, practitioner_id)?;

    state
        .availability
        .delete_exception(practitioner_id, exception_id, auth.token())
        .await?;

    Ok(Json(json!({
        "deleted": true,
        "id": exception_id
    })))
}
