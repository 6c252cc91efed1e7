use std::env;
use tracing::warn;

pub const DEFAULT_SLOT_DURATION_MINUTES: u32 = 20;
pub const DEFAULT_API_PORT: u16 = 3000;
pub const DEFAULT_CLINIC_TIMEZONE: &str = "Europe/Paris";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub default_slot_duration_minutes: u32,
    /// IANA zone the practitioners' wall-clock schedules are written in.
    pub clinic_timezone: String,
    pub api_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            default_slot_duration_minutes: parse_slot_duration(
                env::var("DEFAULT_SLOT_DURATION_MINUTES").ok().as_deref(),
            ),
            clinic_timezone: env::var("CLINIC_TIMEZONE")
                .unwrap_or_else(|_| DEFAULT_CLINIC_TIMEZONE.to_string()),
            api_port: env::var("API_PORT")
                .ok()
                .and_then(|port| {
                    port.parse().map_err(|_| warn!("Invalid API_PORT '{}', using default", port)).ok()
                })
                .unwrap_or(DEFAULT_API_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }
}

/// Zero or unparseable values fall back to the default stride.
fn parse_slot_duration(raw: Option<&str>) -> u32 {
    match raw {
        None => DEFAULT_SLOT_DURATION_MINUTES,
        Some(value) => match value.trim().parse::<u32>() {
            Ok(minutes) if minutes > 0 => minutes,
            _ => {
                warn!("Invalid DEFAULT_SLOT_DURATION_MINUTES '{}', using {}", value, DEFAULT_SLOT_DURATION_MINUTES);
                DEFAULT_SLOT_DURATION_MINUTES
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, key: &str, secret: &str) -> AppConfig {
        AppConfig {
            supabase_url: url.to_string(),
            supabase_anon_key: key.to_string(),
            supabase_jwt_secret: secret.to_string(),
            default_slot_duration_minutes: DEFAULT_SLOT_DURATION_MINUTES,
            clinic_timezone: DEFAULT_CLINIC_TIMEZONE.to_string(),
            api_port: DEFAULT_API_PORT,
        }
    }

    #[test]
    fn test_is_configured() {
        assert!(config("http://localhost:54321", "anon", "secret").is_configured());
        assert!(!config("", "anon", "secret").is_configured());
        assert!(!config("http://localhost:54321", "anon", "").is_configured());
    }

    #[test]
    fn test_parse_slot_duration() {
        assert_eq!(parse_slot_duration(None), 20);
        assert_eq!(parse_slot_duration(Some("30")), 30);
        assert_eq!(parse_slot_duration(Some(" 45 ")), 45);
        assert_eq!(parse_slot_duration(Some("0")), 20);
        assert_eq!(parse_slot_duration(Some("-5")), 20);
        assert_eq!(parse_slot_duration(Some("twenty")), 20);
    }
}
