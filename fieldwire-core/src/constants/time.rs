//! Polling Periods

/// Default polling period between scheduler ticks (ms).
///
/// Thirty seconds, awake the whole time; a reading every tick.
pub const DEFAULT_PERIOD_MS: u64 = 30_000;
