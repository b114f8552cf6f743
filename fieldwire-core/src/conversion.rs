//! Derived-value conversions
//!
//! Conversions turn an accepted primary reading into engineering units for a
//! derived channel. Calibration is checked once when the conversion is built;
//! evaluating it afterwards cannot fail for a finite input.
//!
//! ```rust
//! use fieldwire_core::PercentageMap;
//!
//! let lipo = PercentageMap::new(3.0, 4.2)?;
//! assert!((lipo.percentage(3.6) - 50.0).abs() < 1e-3);
//! assert_eq!(lipo.percentage(2.5), 0.0);
//! assert_eq!(lipo.percentage(4.5), 100.0);
//! # Ok::<(), fieldwire_core::ConfigError>(())
//! ```

use crate::{
    constants::sensors::{
        LIPO_MAX_VOLTAGE_V, LIPO_MIN_VOLTAGE_V, PERCENT_MAX, PERCENT_MIN, SOIL_DRY_RAW, SOIL_SCALE,
    },
    errors::ConfigError,
};

/// Linear voltage-to-percentage map, clamped to `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentageMap {
    min_voltage: f32,
    max_voltage: f32,
}

impl PercentageMap {
    /// `min_voltage` maps to 0%, `max_voltage` to 100%
    pub fn new(min_voltage: f32, max_voltage: f32) -> Result<Self, ConfigError> {
        if !min_voltage.is_finite() || !max_voltage.is_finite() || min_voltage >= max_voltage {
            return Err(ConfigError::InvalidCalibration {
                min: min_voltage,
                max: max_voltage,
            });
        }

        Ok(Self { min_voltage, max_voltage })
    }

    /// Single-cell LiPo, 3.0 V empty to 4.2 V full
    pub fn lipo() -> Self {
        Self {
            min_voltage: LIPO_MIN_VOLTAGE_V,
            max_voltage: LIPO_MAX_VOLTAGE_V,
        }
    }

    /// Percentage for a voltage
    pub fn percentage(&self, voltage: f32) -> f32 {
        let span = self.max_voltage - self.min_voltage;
        ((voltage - self.min_voltage) / span * 100.0).clamp(PERCENT_MIN, PERCENT_MAX)
    }

    /// Voltage mapped to 0%
    pub fn min_voltage(&self) -> f32 {
        self.min_voltage
    }

    /// Voltage mapped to 100%
    pub fn max_voltage(&self) -> f32 {
        self.max_voltage
    }
}

/// Affine map `(raw - offset) * scale` for analog probes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMap {
    offset: f32,
    scale: f32,
}

impl LinearMap {
    /// Map `raw` to `(raw - offset) * scale`; both must be finite
    pub fn new(offset: f32, scale: f32) -> Result<Self, ConfigError> {
        if !offset.is_finite() || !scale.is_finite() {
            return Err(ConfigError::InvalidConversion);
        }
        Ok(Self { offset, scale })
    }

    /// Capacitive soil probe on a 12-bit ADC: dry reads 4095, wet reads 0
    pub fn soil() -> Self {
        Self {
            offset: SOIL_DRY_RAW,
            scale: SOIL_SCALE,
        }
    }

    /// Convert a raw reading
    pub fn apply(&self, raw: f32) -> f32 {
        (raw - self.offset) * self.scale
    }
}
