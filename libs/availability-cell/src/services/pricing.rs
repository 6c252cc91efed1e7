use tracing::debug;

use crate::error::{AvailabilityError, AvailabilityResult};
use crate::models::{AppointmentAct, BookingQuote};

pub const EMERGENCY_SURCHARGE_EUROS: f64 = 10.0;

/// Price shown on the booking confirmation: the act price plus the flat
/// emergency surcharge when the patient books an emergency slot.
pub fn quote_booking(act: &AppointmentAct, is_emergency: bool) -> AvailabilityResult<BookingQuote> {
    if !act.is_active {
        return Err(AvailabilityError::Validation(format!(
            "Act '{}' is not offered for booking",
            act.title
        )));
    }

    let emergency_surcharge = if is_emergency { EMERGENCY_SURCHARGE_EUROS } else { 0.0 };
    let total_price = act.price_euros + emergency_surcharge;

    debug!("Quoted act {} at €{:.2} (emergency: {})", act.id, total_price, is_emergency);

    Ok(BookingQuote {
        act_id: act.id,
        act_title: act.title.clone(),
        duration_minutes: act.duration_minutes,
        is_emergency,
        act_price: act.price_euros,
        emergency_surcharge,
        total_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use uuid::Uuid;

    fn act(price_euros: f64, is_active: bool) -> AppointmentAct {
        AppointmentAct {
            id: Uuid::new_v4(),
            practitioner_id: Uuid::new_v4(),
            title: "Bilan kiné".to_string(),
            description: None,
            duration_minutes: 60,
            price_euros,
            color: None,
            is_first_consultation: true,
            is_active,
        }
    }

    #[test]
    fn test_standard_quote_is_act_price() {
        let quote = quote_booking(&act(70.0, true), false).unwrap();
        assert_eq!(quote.emergency_surcharge, 0.0);
        assert_eq!(quote.total_price, 70.0);
        assert_eq!(quote.duration_minutes, 60);
    }

    #[test]
    fn test_emergency_adds_surcharge() {
        let quote = quote_booking(&act(50.0, true), true).unwrap();
        assert_eq!(quote.emergency_surcharge, 10.0);
        assert_eq!(quote.total_price, 60.0);
    }

    #[test]
    fn test_inactive_act_is_rejected() {
        assert_matches!(quote_booking(&act(50.0, false), false), Err(AvailabilityError::Validation(_)));
    }
}
