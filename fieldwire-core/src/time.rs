//! Time sources for the polling loop
//!
//! The node does not own a clock. [`Node::poll`](crate::Node::poll) asks a
//! [`TimeSource`] for the current time and runs a tick once the configured
//! period has elapsed:
//! - hardware timer or RTOS tick count on the device
//! - a wrapper over `std::time::Instant` on hosts
//! - [`FixedTime`] in tests

/// Timestamp in milliseconds since epoch (or device boot for monotonic)
pub type Timestamp = u64;

/// Source of time for the polling loop
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock stopped at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to `timestamp`, backwards if need be
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms`, saturating
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Milliseconds elapsed from `earlier` to `later`; zero if the clock went back
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}
