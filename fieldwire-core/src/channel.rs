//! Output channels
//!
//! An output channel is a named, bounded value slot owned by exactly one
//! component. The owner writes accepted readings with [`OutputChannel::set`];
//! the channel clamps the value into its bounds and reports whether anything
//! changed. A reported change is what the node delivers to the channel's
//! subscribers and observers.
//!
//! ```rust
//! use fieldwire_core::OutputChannel;
//!
//! let mut percentage = OutputChannel::new("percentage", "Battery", 0.0, 100.0)?;
//!
//! assert_eq!(percentage.set(120.0), Some(100.0)); // clamped
//! assert_eq!(percentage.set(100.0), None);        // unchanged, no notification
//! assert_eq!(percentage.get(), 100.0);
//! # Ok::<(), fieldwire_core::ConfigError>(())
//! ```
//!
//! Precision is advisory: it drives [`OutputChannel::rounded`] and
//! [`OutputChannel::display`] but the stored value keeps full resolution.

use core::fmt;

use crate::{
    errors::ConfigError,
    ids::{self, Label},
};

/// When an accepted value is reported as a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NotifyPolicy {
    /// Only when the clamped value differs from the stored one
    #[default]
    OnChange,
    /// On every accepted value
    Always,
}

/// Named, bounded, observable value slot
#[derive(Debug, Clone)]
pub struct OutputChannel {
    id: Label,
    name: Label,
    value: f32,
    precision: u8,
    min: f32,
    max: f32,
    retain: bool,
    wireable: bool,
    notify: NotifyPolicy,
    is_set: bool,
}

impl OutputChannel {
    /// Create a channel with bounds `[min, max]`
    ///
    /// The initial value is `0.0` clamped into the bounds. Channels start
    /// wireable, not retained, with precision 0.
    pub fn new(id: &str, name: &str, min: f32, max: f32) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ConfigError::InvalidBounds { min, max });
        }

        Ok(Self {
            id: ids::identifier(id)?,
            name: ids::label(name)?,
            value: 0.0f32.clamp(min, max),
            precision: 0,
            min,
            max,
            retain: false,
            wireable: true,
            notify: NotifyPolicy::OnChange,
            is_set: false,
        })
    }

    /// Decimal places used for display
    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    /// Value reported before the first accepted reading
    pub fn with_initial(mut self, value: f32) -> Self {
        if value.is_finite() {
            self.value = value.clamp(self.min, self.max);
        }
        self
    }

    /// Ask the transport to keep the last value across restarts
    pub fn retained(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    /// Allow or forbid wiring this channel to other components
    pub fn wireable(mut self, wireable: bool) -> Self {
        self.wireable = wireable;
        self
    }

    /// Notification policy
    pub fn with_notify(mut self, notify: NotifyPolicy) -> Self {
        self.notify = notify;
        self
    }

    /// Store a new value
    ///
    /// Returns the clamped value when it must be published: the value
    /// changed, the channel was never set, or the policy is
    /// [`NotifyPolicy::Always`]. Non-finite values leave the channel untouched.
    pub fn set(&mut self, value: f32) -> Option<f32> {
        if !value.is_finite() {
            log_debug!("channel {}: dropping non-finite value", self.id.as_str());
            return None;
        }

        let clamped = value.clamp(self.min, self.max);
        let changed = !self.is_set || clamped != self.value;

        if changed || self.notify == NotifyPolicy::Always {
            self.value = clamped;
            self.is_set = true;
            Some(clamped)
        } else {
            None
        }
    }

    /// Current value
    pub fn get(&self) -> f32 {
        self.value
    }

    /// Whether a reading has ever been accepted
    pub fn is_set(&self) -> bool {
        self.is_set
    }

    /// Port identifier, unique within the component
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decimals used when the value is rounded or displayed
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// `(min, max)` bounds
    pub fn bounds(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Whether transports should keep the last value
    pub fn is_retained(&self) -> bool {
        self.retain
    }

    /// Whether the channel may drive other components
    pub fn is_wireable(&self) -> bool {
        self.wireable
    }

    /// When an accepted value is published
    pub fn notify_policy(&self) -> NotifyPolicy {
        self.notify
    }

    /// Current value rounded to the channel precision
    pub fn rounded(&self) -> f32 {
        let scale = libm::powf(10.0, self.precision as f32);
        libm::roundf(self.value * scale) / scale
    }

    /// Display adapter printing the value with the channel precision
    pub fn display(&self) -> Formatted<'_> {
        Formatted(self)
    }
}

/// Value of an [`OutputChannel`] formatted with its precision
pub struct Formatted<'a>(&'a OutputChannel);

impl fmt::Display for Formatted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", self.0.precision as usize, self.0.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voltage() -> OutputChannel {
        OutputChannel::new("voltage", "Voltage", 0.0, 32.0)
            .unwrap()
            .with_precision(2)
    }

    #[test]
    fn set_clamps_into_bounds() {
        let mut channel = voltage();
        assert_eq!(channel.set(40.0), Some(32.0));
        assert_eq!(channel.set(-1.0), Some(0.0));
        assert_eq!(channel.get(), 0.0);
    }

    #[test]
    fn first_set_always_reported() {
        let mut channel = voltage();
        assert!(!channel.is_set());

        // Equal to the initial value but still the first reading
        assert_eq!(channel.set(0.0), Some(0.0));
        assert!(channel.is_set());
    }

    #[test]
    fn unchanged_value_not_reported() {
        let mut channel = voltage();
        assert_eq!(channel.set(3.7), Some(3.7));
        assert_eq!(channel.set(3.7), None);
        assert_eq!(channel.set(3.8), Some(3.8));
    }

    #[test]
    fn always_policy_reports_repeats() {
        let mut channel = voltage().with_notify(NotifyPolicy::Always);
        assert_eq!(channel.set(3.7), Some(3.7));
        assert_eq!(channel.set(3.7), Some(3.7));
    }

    #[test]
    fn non_finite_values_leave_channel_untouched() {
        let mut channel = voltage();
        channel.set(3.7);
        let before = channel.get().to_bits();

        assert_eq!(channel.set(f32::NAN), None);
        assert_eq!(channel.set(f32::INFINITY), None);
        assert_eq!(channel.get().to_bits(), before);
    }

    #[test]
    fn invalid_bounds_rejected() {
        assert_eq!(
            OutputChannel::new("x", "X", 10.0, 0.0).unwrap_err(),
            ConfigError::InvalidBounds { min: 10.0, max: 0.0 }
        );
        assert!(OutputChannel::new("x", "X", f32::NAN, 1.0).is_err());
        assert!(OutputChannel::new("x/y", "X", 0.0, 1.0).is_err());
    }

    #[test]
    fn initial_value_clamped() {
        let channel = OutputChannel::new("t", "T", 10.0, 20.0).unwrap();
        assert_eq!(channel.get(), 10.0);

        let channel = channel.with_initial(25.0);
        assert_eq!(channel.get(), 20.0);
        assert!(!channel.is_set());
    }

    #[test]
    fn precision_is_advisory() {
        let mut channel = voltage();
        channel.set(3.14159);

        assert_eq!(channel.get(), 3.14159);
        assert_eq!(channel.rounded(), 3.14);
        assert_eq!(format!("{}", channel.display()), "3.14");
    }
}
