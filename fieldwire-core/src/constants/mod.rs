//! Constants for fieldwire
//!
//! Device-specific thresholds, default calibrations and the fixed capacities of
//! the wiring tables live here so that sensors and tests refer to one source.
//!
//! ## Organization
//!
//! - **Sensors**: sentinels, reject thresholds, channel bounds and precision
//!   for the supported device kinds
//! - **Buffers**: identifier lengths and table capacities
//! - **Time**: default polling period

/// Device sentinels, thresholds and default channel layouts.
pub mod sensors;

/// Identifier lengths and fixed table capacities.
pub mod buffers;

/// Polling periods.
pub mod time;

pub use sensors::{
    BATTERY_DIVIDER_RATIO, DS18B20_POWER_ON_RESET_C, DS18B20_REJECT_THRESHOLD_C,
    LIPO_MIN_VOLTAGE_V, LIPO_MAX_VOLTAGE_V, SHT_DEFAULT_ADDRESS,
};

pub use buffers::{
    MAX_ID_LEN, MAX_PATH_LEN, MAX_COMPONENTS, MAX_OUTPUTS,
    MAX_CHANNELS, MAX_INPUTS, MAX_EDGES, MAX_PENDING_CHANGES,
};

pub use time::DEFAULT_PERIOD_MS;
