//! Paired-zero validator
//!
//! I2C temperature/humidity parts can hand back an all-zero frame when the
//! transfer glitches. Either field on its own may legitimately be zero (frost,
//! very dry air), so only the combination is treated as bad.

use crate::errors::InvalidReading;

use super::Validator;

/// Reject `(0.0, 0.0)`; signed zero counts as zero
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairedZeroValidator;

impl Validator for PairedZeroValidator {
    type Input = (f32, f32);

    fn check(&self, (first, second): (f32, f32)) -> Result<(), InvalidReading> {
        // -0.0 == 0.0 under IEEE comparison
        if first == 0.0 && second == 0.0 {
            return Err(InvalidReading::SimultaneousZero);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_both_zero_rejected() {
        let v = PairedZeroValidator;
        assert!(v.check((0.0, 0.0)).is_err());
        assert!(v.check((-0.0, 0.0)).is_err());
        assert!(v.check((0.0, -0.0)).is_err());

        assert!(v.check((0.0, 5.0)).is_ok());
        assert!(v.check((21.5, 0.0)).is_ok());
        assert!(v.check((21.5, 44.0)).is_ok());
    }

    #[test]
    fn no_per_field_bounds() {
        let v = PairedZeroValidator;
        assert!(v.check((-300.0, 250.0)).is_ok());
        assert!(v.check((f32::NAN, 0.0)).is_ok());
    }
}
