use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use availability_cell::router::availability_routes;
use availability_cell::AvailabilityState;

pub fn create_router(state: Arc<AvailabilityState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Kinevir availability API is running!" }))
        .nest("/availability", availability_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use shared_database::SupabaseClient;
    use shared_utils::test_utils::TestConfig;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = TestConfig::default().to_arc();
        let supabase = Arc::new(SupabaseClient::new(&config));
        create_router(Arc::new(AvailabilityState::new(config, supabase)))
    }

    #[tokio::test]
    async fn test_liveness() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_availability_routes_are_nested() {
        let response = app()
            .oneshot(Request::builder().uri("/availability/emergency/wait-time").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app()
            .oneshot(Request::builder().uri("/emergency/wait-time").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
