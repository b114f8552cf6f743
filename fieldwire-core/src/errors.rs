//! Error types for the acquisition pipeline
//!
//! Errors are split by the phase in which they can occur:
//!
//! ### Assembly time
//! - [`ConfigError`]: bad calibration, channel bounds or identifiers. Detected
//!   once when a sensor or channel is constructed.
//! - [`WiringError`]: a connection names an unknown channel or input, or would
//!   close a feedback loop. Fails the assembly step.
//!
//! ### Boot
//! - [`SetupError`]: the device did not answer its probe. The sensor becomes
//!   permanently inert but the rest of the node keeps running.
//!
//! ### Steady state
//! - [`InvalidReading`]: a validator rejected the reading. The cycle is skipped
//!   and the previous channel values stay in place.
//! - [`DeviceError`]: the bus driver failed to produce a value. Handled the
//!   same way as an invalid reading.
//!
//! Only the assembly and boot errors ever leave a sensor; per-reading faults are
//! absorbed where they happen.
//!
//! ```rust
//! use fieldwire_core::{PercentageMap, ConfigError};
//!
//! match PercentageMap::new(4.2, 3.0) {
//!     Ok(_) => unreachable!(),
//!     Err(ConfigError::InvalidCalibration { min, max }) => {
//!         assert_eq!((min, max), (4.2, 3.0));
//!     }
//!     Err(_) => unreachable!(),
//! }
//! ```

use thiserror_no_std::Error;

use crate::ids::{ChannelId, InputId};

/// Construction-time configuration defect
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Percentage mapping needs finite `min < max`
    #[error("Invalid calibration: min {min} must be below max {max}")]
    InvalidCalibration {
        /// Voltage mapped to 0%
        min: f32,
        /// Voltage mapped to 100%
        max: f32,
    },

    /// Channel bounds must be finite with `min <= max`
    #[error("Invalid channel bounds [{min}, {max}]")]
    InvalidBounds {
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },

    /// Linear conversion needs a finite offset and scale
    #[error("Invalid conversion: offset and scale must be finite")]
    InvalidConversion,

    /// Identifier does not fit the inline storage
    #[error("Identifier longer than {max} bytes")]
    IdentifierTooLong {
        /// Maximum identifier length in bytes
        max: usize,
    },

    /// Identifier is empty or malformed
    #[error("Invalid identifier: {reason}")]
    InvalidIdentifier {
        /// What is wrong with it
        reason: &'static str,
    },

    /// The read strategy expects a different number of channels
    #[error("Read strategy expects {expected} channels, sensor has {found}")]
    ChannelLayout {
        /// Channels required by the strategy
        expected: usize,
        /// Channels declared on the sensor
        found: usize,
    },

    /// Two channels of one sensor share an identifier
    #[error("Duplicate channel identifier")]
    DuplicateChannel,

    /// Fixed channel table is full
    #[error("Too many channels, limit is {max}")]
    TooManyChannels {
        /// Channel capacity per component
        max: usize,
    },
}

/// Connection could not be made during assembly
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WiringError {
    /// Source channel is not registered with the graph
    #[error("Unknown channel {0}")]
    UnknownChannel(ChannelId),

    /// Target input is not registered with the graph
    #[error("Unknown input {0}")]
    UnknownInput(InputId),

    /// Source channel was declared as not wireable
    #[error("Channel {0} cannot be wired")]
    NotWireable(ChannelId),

    /// Edge would let a channel feed back into itself
    #[error("Connecting {from} to {to} creates a cycle")]
    Cycle {
        /// Requested source channel
        from: ChannelId,
        /// Requested target input
        to: InputId,
    },

    /// Component identifier already in use
    #[error("Duplicate component")]
    DuplicateComponent,

    /// Path or identifier could not be parsed
    #[error("Invalid identifier: {0}")]
    Config(ConfigError),

    /// Fixed wiring tables are full
    #[error("Wiring capacity exceeded: {what}")]
    CapacityExceeded {
        /// Which table
        what: &'static str,
    },
}

impl From<ConfigError> for WiringError {
    fn from(error: ConfigError) -> Self {
        WiringError::Config(error)
    }
}

/// Device probe failed during setup
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    /// Device did not answer its probe; sensor is permanently inert
    #[error("Device probe failed")]
    DeviceProbeFailure,
}

/// Reading rejected by a validator
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidReading {
    /// Value is NaN
    #[error("Reading is not a number")]
    NotANumber,

    /// Value at or above the device's reject threshold
    #[error("Reading {value} at or above reject threshold {limit}")]
    AboveThreshold {
        /// Rejected value
        value: f32,
        /// Configured threshold
        limit: f32,
    },

    /// Both paired values read exactly zero
    #[error("Both paired readings are zero")]
    SimultaneousZero,
}

/// Bus driver failure while reading
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// Device did not return data
    #[error("Device returned no data")]
    NoData,

    /// Device does not provide this value
    #[error("Value not supported by device")]
    Unsupported,

    /// Bus-level failure reported by the driver
    #[error("Bus error: {reason}")]
    Bus {
        /// Driver-supplied description
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidCalibration { min, max } =>
                defmt::write!(fmt, "Invalid calibration [{}, {}]", min, max),
            Self::InvalidBounds { min, max } =>
                defmt::write!(fmt, "Invalid bounds [{}, {}]", min, max),
            Self::InvalidConversion =>
                defmt::write!(fmt, "Invalid conversion"),
            Self::IdentifierTooLong { max } =>
                defmt::write!(fmt, "Identifier longer than {}", max),
            Self::InvalidIdentifier { reason } =>
                defmt::write!(fmt, "Invalid identifier: {}", reason),
            Self::ChannelLayout { expected, found } =>
                defmt::write!(fmt, "Expected {} channels, found {}", expected, found),
            Self::DuplicateChannel =>
                defmt::write!(fmt, "Duplicate channel"),
            Self::TooManyChannels { max } =>
                defmt::write!(fmt, "Too many channels, max {}", max),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for WiringError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::UnknownChannel(id) => defmt::write!(fmt, "Unknown channel {}", id),
            Self::UnknownInput(id) => defmt::write!(fmt, "Unknown input {}", id),
            Self::NotWireable(id) => defmt::write!(fmt, "Channel {} not wireable", id),
            Self::Cycle { from, to } =>
                defmt::write!(fmt, "Cycle {} -> {}", from, to),
            Self::DuplicateComponent => defmt::write!(fmt, "Duplicate component"),
            Self::Config(error) => defmt::write!(fmt, "Invalid identifier: {}", error),
            Self::CapacityExceeded { what } =>
                defmt::write!(fmt, "Capacity exceeded: {}", what),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SetupError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::DeviceProbeFailure => defmt::write!(fmt, "Device probe failed"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InvalidReading {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotANumber => defmt::write!(fmt, "NaN reading"),
            Self::AboveThreshold { value, limit } =>
                defmt::write!(fmt, "Reading {} >= {}", value, limit),
            Self::SimultaneousZero => defmt::write!(fmt, "Paired readings both zero"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NoData => defmt::write!(fmt, "No data"),
            Self::Unsupported => defmt::write!(fmt, "Unsupported"),
            Self::Bus { reason } => defmt::write!(fmt, "Bus error: {}", reason),
        }
    }
}
