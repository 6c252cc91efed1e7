use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, put},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::AvailabilityState;

pub fn availability_routes(state: Arc<AvailabilityState>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/practitioners/{practitioner_id}/availability", get(handlers::get_day_availability))
        .route("/practitioners/{practitioner_id}/slots", get(handlers::get_day_slots))
        .route("/practitioners/{practitioner_id}/week", get(handlers::get_week_overview))
        .route("/acts/{act_id}/quote", get(handlers::get_booking_quote))
        .route("/emergency/wait-time", get(handlers::get_emergency_wait_time));

    // Schedule management: the practitioner themselves or an admin
    let protected_routes = Router::new()
        .route(
            "/practitioners/{practitioner_id}/recurring",
            get(handlers::list_recurring_availability).post(handlers::create_recurring_availability),
        )
        .route(
            "/practitioners/{practitioner_id}/recurring/{availability_id}",
            put(handlers::update_recurring_availability).delete(handlers::delete_recurring_availability),
        )
        .route(
            "/practitioners/{practitioner_id}/exceptions",
            get(handlers::list_exceptions).post(handlers::create_exception),
        )
        .route(
            "/practitioners/{practitioner_id}/exceptions/{exception_id}",
            delete(handlers::delete_exception),
        )
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
