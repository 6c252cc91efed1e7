use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, DEFAULT_API_PORT, DEFAULT_SLOT_DURATION_MINUTES};
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub clinic_timezone: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            clinic_timezone: "UTC".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            default_slot_duration_minutes: DEFAULT_SLOT_DURATION_MINUTES,
            clinic_timezone: self.clinic_timezone.clone(),
            api_port: DEFAULT_API_PORT,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn practitioner(email: &str) -> Self {
        Self::new(email, "practitioner")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    /// Mirrors a Supabase access token: `role` is `authenticated`, the
    /// platform role sits in `user_metadata`.
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": "authenticated",
            "user_metadata": { "role": user.role },
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signing_input.as_bytes());
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Row shapes as PostgREST returns them (time columns carry seconds).
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn recurring_availability_row(
        practitioner_id: &str,
        day_of_week: i32,
        start_time: &str,
        end_time: &str,
    ) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "practitioner_id": practitioner_id,
            "day_of_week": day_of_week,
            "start_time": format!("{}:00", start_time),
            "end_time": format!("{}:00", end_time),
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn unavailable_exception_row(practitioner_id: &str, date: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "practitioner_id": practitioner_id,
            "exception_date": date,
            "exception_type": "unavailable",
            "start_time": null,
            "end_time": null,
            "reason": "Congés",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn custom_hours_exception_row(
        practitioner_id: &str,
        date: &str,
        start_time: &str,
        end_time: &str,
    ) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "practitioner_id": practitioner_id,
            "exception_date": date,
            "exception_type": "custom_hours",
            "start_time": format!("{}:00", start_time),
            "end_time": format!("{}:00", end_time),
            "reason": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_row(id: &str, practitioner_id: &str, appointment_date: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": Uuid::new_v4(),
            "practitioner_id": practitioner_id,
            "act_id": null,
            "appointment_date": appointment_date,
            "duration_minutes": 40,
            "status": "confirmed",
            "appointment_type": "standard",
            "is_emergency": false,
            "emergency_surcharge": 0,
            "total_price": 50,
            "notes": null
        })
    }

    pub fn act_row(id: &str, practitioner_id: &str, title: &str, duration_minutes: i32, price_euros: f64) -> serde_json::Value {
        json!({
            "id": id,
            "practitioner_id": practitioner_id,
            "title": title,
            "description": null,
            "duration_minutes": duration_minutes,
            "price_euros": price_euros,
            "color": "#219ebc",
            "is_first_consultation": false,
            "is_active": true
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.supabase_jwt_secret.is_empty());
        assert_eq!(app_config.default_slot_duration_minutes, 20);
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::practitioner("kine@example.com");
        assert_eq!(user.email, "kine@example.com");
        assert_eq!(user.role, "practitioner");

        let user_model = user.to_user();
        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.role, Some(user.role.clone()));
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(1));

        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_recurring_row_uses_database_time_format() {
        let row = MockSupabaseResponses::recurring_availability_row("p1", 1, "09:00", "12:00");
        assert_eq!(row["start_time"], "09:00:00");
        assert_eq!(row["day_of_week"], 1);
    }
}
