use std::sync::Arc;

use chrono_tz::Tz;
use tracing::warn;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::services::AvailabilityService;

/// Router state: configuration for the auth layer and the service every
/// handler talks to.
pub struct AvailabilityState {
    pub config: Arc<AppConfig>,
    pub availability: AvailabilityService,
}

impl AvailabilityState {
    pub fn new(config: Arc<AppConfig>, supabase: Arc<SupabaseClient>) -> Self {
        let clinic_timezone = parse_clinic_timezone(&config.clinic_timezone);
        Self {
            availability: AvailabilityService::new(supabase, clinic_timezone),
            config,
        }
    }
}

pub fn parse_clinic_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("Unknown CLINIC_TIMEZONE '{}', using UTC", name);
        Tz::UTC
    })
}
