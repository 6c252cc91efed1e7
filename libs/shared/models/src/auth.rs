use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ROLE_PATIENT: &str = "patient";
pub const ROLE_PRACTITIONER: &str = "practitioner";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

impl JwtClaims {
    /// Supabase puts `authenticated` in the top-level `role` claim; the
    /// platform role lives in `user_metadata.role`.
    pub fn platform_role(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|meta| meta.get("role"))
            .and_then(|role| role.as_str())
            .map(str::to_string)
            .or_else(|| self.role.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Admins manage every roster; practitioners only their own.
    pub fn can_manage_practitioner(&self, practitioner_id: &str) -> bool {
        self.is_admin() || (self.has_role(ROLE_PRACTITIONER) && self.id == practitioner_id)
    }
}
