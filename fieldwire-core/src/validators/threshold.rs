//! Upper-threshold validator
//!
//! Rejects readings that are NaN or at/above a fixed limit. Used for parts
//! whose power-on or error value sits above any plausible field reading.

use crate::{
    constants::sensors::DS18B20_REJECT_THRESHOLD_C,
    errors::InvalidReading,
};

use super::Validator;

/// Reject NaN and values `>= reject_at`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdValidator {
    reject_at: f32,
}

impl ThresholdValidator {
    /// Create with a custom limit
    pub const fn new(reject_at: f32) -> Self {
        Self { reject_at }
    }

    /// DS18B20: 80 °C, below the 85 °C power-on reset value
    pub const fn ds18b20() -> Self {
        Self::new(DS18B20_REJECT_THRESHOLD_C)
    }

    /// Readings at or above this are rejected
    pub fn limit(&self) -> f32 {
        self.reject_at
    }
}

impl Validator for ThresholdValidator {
    type Input = f32;

    fn check(&self, value: f32) -> Result<(), InvalidReading> {
        if value.is_nan() {
            return Err(InvalidReading::NotANumber);
        }

        if value >= self.reject_at {
            return Err(InvalidReading::AboveThreshold {
                value,
                limit: self.reject_at,
            });
        }

        Ok(())
    }
}
