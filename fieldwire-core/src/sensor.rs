//! Sensors: read, validate, convert, set
//!
//! ## Lifecycle
//!
//! ```text
//!                 probe ok
//! Uninitialized ───────────→ Ready ──cycle()──→ read → validate → convert → set
//!       │
//!       │ probe failed
//!       └──────────────────→ Failed (terminal, cycle() is a no-op)
//! ```
//!
//! `setup()` probes the device exactly once. Calling it again returns the
//! current state without touching the device.
//!
//! ## Read strategies
//!
//! A sensor is a composition of a [`Device`], its output channels, a
//! [`Validation`] and a [`ReadStrategy`]:
//!
//! | Strategy  | Channels                             | Behaviour |
//! |-----------|--------------------------------------|-----------|
//! | `Single`  | value                                | read, validate, set |
//! | `Paired`  | first, second                        | read both, validate jointly, set both or neither |
//! | `Derived` | voltage, [current], percentage       | set voltage, derive percentage unconditionally |
//! | `Divider` | voltage, percentage                  | scale the pin voltage, then as `Derived` |
//! | `Linear`  | value                                | read raw, validate, set `(raw - offset) * scale` |
//!
//! ## Bad readings
//!
//! A rejected reading or a failed bus read skips the cycle: no channel is
//! written and no error leaves the sensor. The next tick is the retry.

use heapless::Vec;

use crate::{
    channel::OutputChannel,
    constants::{buffers::MAX_OUTPUTS, sensors::*},
    conversion::{LinearMap, PercentageMap},
    errors::{ConfigError, DeviceError, SetupError},
    ids::{self, ChannelId, Label},
    queue::{Change, ChangeQueue},
    traits::{Component, Device},
    validators::{Reading, Validation},
};

/// Initialisation state of a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SensorState {
    /// `setup()` has not run yet
    Uninitialized,
    /// Device answered its probe
    Ready,
    /// Device probe failed; the sensor stays inert until restart
    Failed,
}

/// How a sensor turns device reads into channel values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadStrategy {
    /// One value into channel 0
    Single,
    /// Primary and secondary into channels 0 and 1, all or nothing
    Paired,
    /// Voltage into channel 0, optional current into channel 1, percentage
    /// into the last channel
    Derived {
        /// Voltage-to-percentage calibration
        map: PercentageMap,
        /// Also read the secondary value as current
        current: bool,
    },
    /// Converted raw value into channel 0
    Linear(LinearMap),
    /// Pin voltage behind a resistor divider: scaled voltage into channel 0,
    /// percentage into channel 1
    Divider {
        /// Voltage-to-percentage calibration, applied after scaling
        map: PercentageMap,
        /// Divider ratio, battery voltage per pin volt
        multiplier: f32,
    },
}

impl ReadStrategy {
    /// Number of channels the strategy writes
    pub fn channel_count(&self) -> usize {
        match self {
            ReadStrategy::Single | ReadStrategy::Linear(_) => 1,
            ReadStrategy::Paired | ReadStrategy::Divider { .. } => 2,
            ReadStrategy::Derived { current: true, .. } => 3,
            ReadStrategy::Derived { current: false, .. } => 2,
        }
    }
}

/// A physical sensor and the channels it publishes
pub struct Sensor<D> {
    id: Label,
    name: Label,
    state: SensorState,
    inert_reported: bool,
    device: D,
    channels: Vec<OutputChannel, MAX_OUTPUTS>,
    paths: Vec<ChannelId, MAX_OUTPUTS>,
    validation: Validation,
    strategy: ReadStrategy,
}

impl<D: Device> Sensor<D> {
    /// Compose a sensor
    ///
    /// Channels are written in the order given, as described by the strategy.
    pub fn new<I>(
        id: &str,
        name: &str,
        device: D,
        validation: Validation,
        strategy: ReadStrategy,
        channels: I,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = OutputChannel>,
    {
        let id = ids::identifier(id)?;
        let name = ids::label(name)?;

        let mut owned: Vec<OutputChannel, MAX_OUTPUTS> = Vec::new();
        let mut paths: Vec<ChannelId, MAX_OUTPUTS> = Vec::new();
        for channel in channels {
            if owned.iter().any(|existing| existing.id() == channel.id()) {
                return Err(ConfigError::DuplicateChannel);
            }
            let path = ChannelId::new(&id, channel.id())?;
            owned
                .push(channel)
                .map_err(|_| ConfigError::TooManyChannels { max: MAX_OUTPUTS })?;
            paths
                .push(path)
                .map_err(|_| ConfigError::TooManyChannels { max: MAX_OUTPUTS })?;
        }

        let expected = strategy.channel_count();
        if owned.len() != expected {
            return Err(ConfigError::ChannelLayout {
                expected,
                found: owned.len(),
            });
        }

        Ok(Self {
            id,
            name,
            state: SensorState::Uninitialized,
            inert_reported: false,
            device,
            channels: owned,
            paths,
            validation,
            strategy,
        })
    }

    /// DS18B20 OneWire temperature probe
    ///
    /// Rejects NaN and readings at or above 80 °C (power-on reset is 85 °C).
    pub fn ds18b20(id: &str, name: &str, device: D, retain: bool) -> Result<Self, ConfigError> {
        let temperature = OutputChannel::new("temperature", name, DS18B20_MIN_C, DS18B20_MAX_C)?
            .with_precision(DS18B20_PRECISION)
            .retained(retain);

        Self::new(id, name, device, Validation::ds18b20(), ReadStrategy::Single, [temperature])
    }

    /// SHT3x/SHT4x temperature and humidity sensor
    ///
    /// Rejects frames where both values read zero.
    pub fn sht(id: &str, name: &str, device: D, retain: bool) -> Result<Self, ConfigError> {
        let temperature = OutputChannel::new(
            "temperature",
            "Temperature",
            SHT_TEMPERATURE_MIN_C,
            SHT_TEMPERATURE_MAX_C,
        )?
        .with_precision(SHT_PRECISION)
        .retained(retain);

        let humidity = OutputChannel::new(
            "humidity",
            "Humidity",
            SHT_HUMIDITY_MIN_PCT,
            SHT_HUMIDITY_MAX_PCT,
        )?
        .with_precision(SHT_PRECISION)
        .retained(retain);

        Self::new(
            id,
            name,
            device,
            Validation::sht(),
            ReadStrategy::Paired,
            [temperature, humidity],
        )
    }

    /// INA219 battery monitor with voltage, current and charge percentage
    ///
    /// Fails with [`ConfigError::InvalidCalibration`] unless
    /// `min_voltage < max_voltage`.
    pub fn ina219(
        id: &str,
        name: &str,
        device: D,
        min_voltage: f32,
        max_voltage: f32,
        retain: bool,
    ) -> Result<Self, ConfigError> {
        let map = PercentageMap::new(min_voltage, max_voltage)?;

        let voltage = OutputChannel::new("voltage", "Voltage", INA219_VOLTAGE_MIN_V, INA219_VOLTAGE_MAX_V)?
            .with_precision(INA219_VOLTAGE_PRECISION)
            .retained(retain);
        let current = OutputChannel::new("current", "Current", INA219_CURRENT_MIN_MA, INA219_CURRENT_MAX_MA)?
            .with_precision(INA219_CURRENT_PRECISION)
            .retained(retain);
        let percentage = OutputChannel::new("percentage", "Battery", PERCENT_MIN, PERCENT_MAX)?
            .retained(retain);

        Self::new(
            id,
            name,
            device,
            Validation::None,
            ReadStrategy::Derived { map, current: true },
            [voltage, current, percentage],
        )
    }

    /// Battery on an ADC pin behind a voltage divider
    ///
    /// The pin voltage is multiplied by `multiplier` before it is validated
    /// and published. Fails with [`ConfigError::InvalidConversion`] unless the
    /// multiplier is finite and positive.
    pub fn battery_divider(
        id: &str,
        name: &str,
        device: D,
        multiplier: f32,
        map: PercentageMap,
        retain: bool,
    ) -> Result<Self, ConfigError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ConfigError::InvalidConversion);
        }

        let voltage = OutputChannel::new("voltage", "Voltage", BATTERY_VOLTAGE_MIN_V, BATTERY_VOLTAGE_MAX_V)?
            .with_precision(BATTERY_VOLTAGE_PRECISION)
            .retained(retain);
        let percentage = OutputChannel::new("percentage", name, PERCENT_MIN, PERCENT_MAX)?
            .retained(retain);

        Self::new(
            id,
            name,
            device,
            Validation::None,
            ReadStrategy::Divider { map, multiplier },
            [voltage, percentage],
        )
    }

    /// Analog capacitive soil moisture probe, 0-100%
    pub fn soil(id: &str, name: &str, device: D, retain: bool) -> Result<Self, ConfigError> {
        Self::analog(id, name, device, LinearMap::soil(), retain)
    }

    /// Analog probe with a custom linear conversion into 0-100%
    pub fn analog(
        id: &str,
        name: &str,
        device: D,
        map: LinearMap,
        retain: bool,
    ) -> Result<Self, ConfigError> {
        let value = OutputChannel::new(id, name, PERCENT_MIN, PERCENT_MAX)?.retained(retain);

        Self::new(id, name, device, Validation::None, ReadStrategy::Linear(map), [value])
    }

    /// Replace the validation rule
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    /// Probe the device once
    ///
    /// Returns the resulting state. Further calls return the current state
    /// without probing again.
    pub fn setup(&mut self) -> SensorState {
        if self.state != SensorState::Uninitialized {
            return self.state;
        }

        if self.device.probe() {
            self.state = SensorState::Ready;
            self.device.request();
            log_info!("{}: device ready", self.id.as_str());
        } else {
            self.state = SensorState::Failed;
            log_warn!("{}: device probe failed, sensor disabled", self.id.as_str());
        }

        self.state
    }

    /// One read-validate-convert-set step
    ///
    /// Does nothing unless the sensor is ready.
    pub fn cycle(&mut self, changes: &mut ChangeQueue) {
        match self.state {
            SensorState::Ready => {}
            SensorState::Failed => {
                if !self.inert_reported {
                    log_warn!("{}: skipping cycle, device failed at setup", self.id.as_str());
                    self.inert_reported = true;
                }
                return;
            }
            SensorState::Uninitialized => return,
        }

        if !self.device.data_ready() {
            log_trace!("{}: data not ready", self.id.as_str());
            return;
        }

        match self.strategy {
            ReadStrategy::Single => self.cycle_single(changes),
            ReadStrategy::Paired => self.cycle_paired(changes),
            ReadStrategy::Derived { map, current } => self.cycle_derived(map, current, changes),
            ReadStrategy::Linear(map) => self.cycle_linear(map, changes),
            ReadStrategy::Divider { map, multiplier } => self.cycle_divider(map, multiplier, changes),
        }
    }

    fn cycle_single(&mut self, changes: &mut ChangeQueue) {
        let Some(value) = absorb(&self.id, self.device.read_primary()) else {
            return;
        };

        if self.accepts(Reading::Single(value)) {
            self.publish(0, value, changes);
        }
    }

    fn cycle_paired(&mut self, changes: &mut ChangeQueue) {
        let Some(first) = absorb(&self.id, self.device.read_primary()) else {
            return;
        };
        let Some(second) = absorb(&self.id, self.device.read_secondary()) else {
            return;
        };

        if self.accepts(Reading::Pair(first, second)) {
            self.publish(0, first, changes);
            self.publish(1, second, changes);
        }

        // Only a completed frame queues the next conversion
        self.device.request();
    }

    fn cycle_derived(&mut self, map: PercentageMap, current: bool, changes: &mut ChangeQueue) {
        let Some(voltage) = absorb(&self.id, self.device.read_primary()) else {
            return;
        };

        if !self.accepts(Reading::Single(voltage)) {
            return;
        }

        self.publish(0, voltage, changes);

        let mut percentage_slot = 1;
        if current {
            if let Some(milliamps) = absorb(&self.id, self.device.read_secondary()) {
                self.publish(1, milliamps, changes);
            }
            percentage_slot = 2;
        }

        self.publish(percentage_slot, map.percentage(voltage), changes);
    }

    fn cycle_linear(&mut self, map: LinearMap, changes: &mut ChangeQueue) {
        let Some(raw) = absorb(&self.id, self.device.read_primary()) else {
            return;
        };

        if self.accepts(Reading::Single(raw)) {
            self.publish(0, map.apply(raw), changes);
        }
    }

    fn cycle_divider(&mut self, map: PercentageMap, multiplier: f32, changes: &mut ChangeQueue) {
        let Some(pin) = absorb(&self.id, self.device.read_primary()) else {
            return;
        };
        let voltage = pin * multiplier;

        if !self.accepts(Reading::Single(voltage)) {
            return;
        }

        self.publish(0, voltage, changes);
        self.publish(1, map.percentage(voltage), changes);
    }

    fn accepts(&self, reading: Reading) -> bool {
        match self.validation.check(reading) {
            Ok(()) => true,
            Err(reason) => {
                log_debug!("{}: reading rejected: {}", self.id.as_str(), reason);
                false
            }
        }
    }

    fn publish(&mut self, slot: usize, value: f32, changes: &mut ChangeQueue) {
        let channel = &mut self.channels[slot];
        if let Some(accepted) = channel.set(value) {
            changes.push(Change {
                channel: self.paths[slot].clone(),
                value: accepted,
                retain: channel.is_retained(),
            });
        }
    }

    /// Component identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current initialisation state
    pub fn state(&self) -> SensorState {
        self.state
    }

    /// Output channel by port identifier
    pub fn channel(&self, port: &str) -> Option<&OutputChannel> {
        self.channels.iter().find(|channel| channel.id() == port)
    }

    /// Output channels in write order
    pub fn channels(&self) -> &[OutputChannel] {
        &self.channels
    }

    /// Rule applied to every reading
    pub fn validation(&self) -> Validation {
        self.validation
    }

    /// How reads map onto channels
    pub fn strategy(&self) -> ReadStrategy {
        self.strategy
    }

    /// Underlying device handle
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable device handle, e.g. for driver settings
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

/// Turn a device read into a value, logging and swallowing failures
fn absorb(id: &str, result: nb::Result<f32, DeviceError>) -> Option<f32> {
    match result {
        Ok(value) => Some(value),
        Err(nb::Error::WouldBlock) => {
            log_trace!("{}: conversion pending", id);
            None
        }
        Err(nb::Error::Other(error)) => {
            log_debug!("{}: read failed: {}", id, error);
            None
        }
    }
}

impl<D: Device> Component for Sensor<D> {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &[OutputChannel] {
        &self.channels
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        match Sensor::setup(self) {
            SensorState::Failed => Err(SetupError::DeviceProbeFailure),
            _ => Ok(()),
        }
    }

    fn cycle(&mut self, changes: &mut ChangeQueue) {
        Sensor::cycle(self, changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Scripted {
        present: bool,
        probes: u32,
        requests: u32,
        primary: VecDeque<f32>,
        secondary: VecDeque<f32>,
    }

    impl Scripted {
        fn present() -> Self {
            Self { present: true, ..Self::default() }
        }

        fn with_primary(mut self, values: &[f32]) -> Self {
            self.primary.extend(values);
            self
        }

        fn with_secondary(mut self, values: &[f32]) -> Self {
            self.secondary.extend(values);
            self
        }
    }

    impl Device for Scripted {
        fn probe(&mut self) -> bool {
            self.probes += 1;
            self.present
        }

        fn read_primary(&mut self) -> nb::Result<f32, DeviceError> {
            self.primary.pop_front().ok_or(nb::Error::Other(DeviceError::NoData))
        }

        fn read_secondary(&mut self) -> nb::Result<f32, DeviceError> {
            self.secondary.pop_front().ok_or(nb::Error::Other(DeviceError::NoData))
        }

        fn request(&mut self) {
            self.requests += 1;
        }
    }

    #[test]
    fn setup_probes_once() {
        let mut sensor = Sensor::ds18b20("ds18b20", "Soil Temperature", Scripted::present(), true).unwrap();
        assert_eq!(sensor.state(), SensorState::Uninitialized);

        assert_eq!(sensor.setup(), SensorState::Ready);
        assert_eq!(sensor.setup(), SensorState::Ready);
        assert_eq!(sensor.device().probes, 1);
        assert_eq!(sensor.channels().len(), 1);
    }

    #[test]
    fn failed_probe_is_terminal() {
        let device = Scripted::default().with_primary(&[21.0]);
        let mut sensor = Sensor::ds18b20("ds18b20", "Soil Temperature", device, true).unwrap();

        assert_eq!(sensor.setup(), SensorState::Failed);
        sensor.device_mut().present = true;
        assert_eq!(sensor.setup(), SensorState::Failed);
        assert_eq!(sensor.device().probes, 1);

        let mut changes = ChangeQueue::new();
        sensor.cycle(&mut changes);
        sensor.cycle(&mut changes);
        assert!(changes.is_empty());
        assert!(!sensor.channel("temperature").unwrap().is_set());
    }

    #[test]
    fn uninitialized_sensor_does_not_read() {
        let device = Scripted::present().with_primary(&[21.0]);
        let mut sensor = Sensor::ds18b20("ds18b20", "T", device, false).unwrap();

        let mut changes = ChangeQueue::new();
        sensor.cycle(&mut changes);
        assert!(changes.is_empty());
        assert_eq!(sensor.device().primary.len(), 1);
    }

    #[test]
    fn sentinel_reading_skipped() {
        let device = Scripted::present().with_primary(&[85.0, 22.25]);
        let mut sensor = Sensor::ds18b20("ds18b20", "T", device, false).unwrap();
        sensor.setup();

        let mut changes = ChangeQueue::new();
        sensor.cycle(&mut changes);
        assert!(changes.is_empty());
        assert_eq!(sensor.channel("temperature").unwrap().get(), 0.0);

        sensor.cycle(&mut changes);
        let change = changes.pop().unwrap();
        assert_eq!(change.channel.as_str(), "ds18b20/temperature");
        assert_eq!(change.value, 22.25);
    }

    #[test]
    fn paired_requests_next_conversion() {
        let device = Scripted::present()
            .with_primary(&[0.0, 21.5])
            .with_secondary(&[0.0, 44.0]);
        let mut sensor = Sensor::sht("sht", "SHT", device, true).unwrap();
        sensor.setup();
        assert_eq!(sensor.device().requests, 1);

        let mut changes = ChangeQueue::new();
        sensor.cycle(&mut changes);
        assert!(changes.is_empty());
        assert_eq!(sensor.device().requests, 2);

        sensor.cycle(&mut changes);
        assert_eq!(changes.len(), 2);
        assert!(changes.pop().unwrap().retain);
    }

    #[test]
    fn paired_read_failure_waits_for_next_frame() {
        // Primary fails outright, then the secondary of the next frame fails
        let device = Scripted::present().with_primary(&[]);
        let mut sensor = Sensor::sht("sht", "SHT", device, true).unwrap();
        sensor.setup();

        let mut changes = ChangeQueue::new();
        sensor.cycle(&mut changes);
        assert_eq!(sensor.device().requests, 1);

        sensor.device_mut().primary.push_back(21.5);
        sensor.cycle(&mut changes);
        assert_eq!(sensor.device().requests, 1);
        assert!(sensor.device().primary.is_empty());
        assert!(changes.is_empty());
        assert!(!sensor.channel("temperature").unwrap().is_set());
    }

    #[test]
    fn divider_scales_pin_voltage() {
        let device = Scripted::present().with_primary(&[1.8, 2.1]);
        let mut sensor = Sensor::battery_divider(
            "battery",
            "Battery",
            device,
            BATTERY_DIVIDER_RATIO,
            PercentageMap::lipo(),
            true,
        )
        .unwrap();
        assert_eq!(sensor.strategy().channel_count(), 2);
        sensor.setup();

        let mut changes = ChangeQueue::new();
        sensor.cycle(&mut changes);
        assert_eq!(changes.len(), 2);

        let voltage = changes.pop().unwrap();
        assert_eq!(voltage.channel.as_str(), "battery/voltage");
        assert_eq!(voltage.value, 3.6);
        let percentage = changes.pop().unwrap();
        assert_eq!(percentage.channel.as_str(), "battery/percentage");
        assert!((percentage.value - 50.0).abs() < 1e-3);

        // 4.2 V is full
        sensor.cycle(&mut changes);
        assert!((sensor.channel("percentage").unwrap().get() - 100.0).abs() < 1e-3);
        assert_eq!(sensor.device().requests, 1);
    }

    #[test]
    fn divider_multiplier_must_be_positive() {
        for multiplier in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            let result = Sensor::battery_divider(
                "battery",
                "Battery",
                Scripted::present(),
                multiplier,
                PercentageMap::lipo(),
                true,
            );
            assert_eq!(result.err(), Some(ConfigError::InvalidConversion));
        }
    }

    #[test]
    fn derived_without_current() {
        let voltage = OutputChannel::new("voltage", "Voltage", 0.0, 32.0).unwrap();
        let percentage = OutputChannel::new("percentage", "Battery", 0.0, 100.0).unwrap();
        let strategy = ReadStrategy::Derived { map: PercentageMap::lipo(), current: false };
        let device = Scripted::present().with_primary(&[4.2]);

        let mut sensor = Sensor::new("battery", "Battery", device, Validation::None, strategy, [voltage, percentage]).unwrap();
        sensor.setup();

        let mut changes = ChangeQueue::new();
        sensor.cycle(&mut changes);
        assert_eq!(sensor.channel("percentage").unwrap().get(), 100.0);
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn layout_must_match_strategy() {
        let channel = OutputChannel::new("value", "Value", 0.0, 1.0).unwrap();
        let result = Sensor::new("x", "X", Scripted::present(), Validation::None, ReadStrategy::Paired, [channel]);
        assert_eq!(result.err(), Some(ConfigError::ChannelLayout { expected: 2, found: 1 }));
    }

    #[test]
    fn duplicate_channel_rejected() {
        let a = OutputChannel::new("value", "A", 0.0, 1.0).unwrap();
        let b = OutputChannel::new("value", "B", 0.0, 1.0).unwrap();
        let result = Sensor::new("x", "X", Scripted::present(), Validation::None, ReadStrategy::Paired, [a, b]);
        assert_eq!(result.err(), Some(ConfigError::DuplicateChannel));
    }

    #[test]
    fn inverted_battery_calibration_rejected() {
        let result = Sensor::ina219("battery", "Battery", Scripted::present(), 4.2, 3.0, true);
        assert_eq!(result.err(), Some(ConfigError::InvalidCalibration { min: 4.2, max: 3.0 }));
    }
}
