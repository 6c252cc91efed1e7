use rand::Rng;

pub const MIN_EMERGENCY_WAIT_MINUTES: u32 = 15;
pub const MAX_EMERGENCY_WAIT_MINUTES: u32 = 44;

/// Display-only placeholder: a uniformly random wait between 15 and 44
/// minutes. There is no queue behind it.
pub fn estimate_emergency_wait_time() -> String {
    estimate_emergency_wait_time_with(&mut rand::thread_rng())
}

pub fn estimate_emergency_wait_time_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let minutes = rng.gen_range(MIN_EMERGENCY_WAIT_MINUTES..=MAX_EMERGENCY_WAIT_MINUTES);
    format!("{} minutes", minutes)
}
