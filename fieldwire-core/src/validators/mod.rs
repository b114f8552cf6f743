//! Reading Validators
//!
//! ## Overview
//!
//! A validator is a pure accept/reject rule for one sensor kind. It carries no
//! mutable state: every rule comes from physical knowledge of the part, not
//! from the reading history.
//!
//! ## Rules
//!
//! ### Threshold
//! The DS18B20 answers `85.0 °C` when its scratchpad still holds the power-on
//! reset value, i.e. no conversion ran. The sensor rejects NaN and anything at
//! or above `80.0 °C`:
//! ```rust
//! use fieldwire_core::validators::{Validator, ThresholdValidator};
//!
//! let v = ThresholdValidator::ds18b20();
//! assert!(v.check(79.999).is_ok());
//! assert!(v.check(80.0).is_err());
//! assert!(v.check(f32::NAN).is_err());
//! ```
//!
//! ### Paired zero
//! SHT sensors occasionally return exactly `0.0 °C` and `0.0 %RH` together
//! after an I2C glitch. Only that combination is rejected; one field at zero
//! is a plausible reading:
//! ```rust
//! use fieldwire_core::validators::{Validator, PairedZeroValidator};
//!
//! let v = PairedZeroValidator;
//! assert!(v.check((0.0, 5.0)).is_ok());
//! assert!(v.check((0.0, 0.0)).is_err());
//! assert!(v.check((-0.0, 0.0)).is_err());
//! ```
//!
//! ## Composition
//!
//! Sensors hold a [`Validation`], chosen at construction, rather than
//! overriding a validate method per device class.

mod paired;
mod threshold;

pub use paired::PairedZeroValidator;
pub use threshold::ThresholdValidator;

use crate::errors::InvalidReading;

/// Raw reading handed to a validator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// One value, e.g. a temperature
    Single(f32),
    /// Two values read together, e.g. temperature and humidity
    Pair(f32, f32),
}

impl Reading {
    /// First (primary) value
    pub fn primary(&self) -> f32 {
        match *self {
            Reading::Single(value) | Reading::Pair(value, _) => value,
        }
    }
}

/// Core validator trait - one implementation per rule
pub trait Validator {
    /// The reading shape this validator understands
    type Input;

    /// Accept or reject a reading
    fn check(&self, input: Self::Input) -> Result<(), InvalidReading>;
}

/// Validation rule selected for a sensor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Validation {
    /// Reject NaN and values at or above a threshold
    Threshold(ThresholdValidator),
    /// Reject pairs where both values are zero
    PairedZero(PairedZeroValidator),
    /// Accept everything
    #[default]
    None,
}

impl Validation {
    /// DS18B20 power-on reset rule
    pub const fn ds18b20() -> Self {
        Validation::Threshold(ThresholdValidator::ds18b20())
    }

    /// SHT simultaneous-zero rule
    pub const fn sht() -> Self {
        Validation::PairedZero(PairedZeroValidator)
    }

    /// Check a reading against the selected rule
    ///
    /// A threshold rule checks the primary value of a pair. A paired rule
    /// accepts single readings.
    pub fn check(&self, reading: Reading) -> Result<(), InvalidReading> {
        match (self, reading) {
            (Validation::Threshold(rule), reading) => rule.check(reading.primary()),
            (Validation::PairedZero(rule), Reading::Pair(a, b)) => rule.check((a, b)),
            (Validation::PairedZero(_), Reading::Single(_)) => Ok(()),
            (Validation::None, _) => Ok(()),
        }
    }
}
