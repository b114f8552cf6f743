//! Core traits for devices and components
//!
//! These traits are the seams between the pipeline and everything around it.
//! Keep them simple - embedded devices don't need complex abstractions.
//!
//! - [`Device`]: the bus driver a sensor reads from (consumed)
//! - [`Component`]: anything the node schedules and wires (sensors, controls,
//!   actuators)
//! - [`ChangeObserver`]: the transport layer's view of accepted changes
//!   (exposed)

use crate::{
    channel::OutputChannel,
    errors::{DeviceError, SetupError},
    queue::{Change, ChangeQueue},
};

/// Bus driver for one physical device
///
/// Reads are expected to return in bounded time. Devices with conversion
/// latency report [`nb::Error::WouldBlock`] (or `false` from
/// [`Device::data_ready`]) until the result is available; the sensor then
/// skips the cycle and tries again on the next tick.
pub trait Device {
    /// Probe/handshake the device. Called once by the sensor's setup.
    fn probe(&mut self) -> bool;

    /// Whether a completed conversion is waiting to be read
    fn data_ready(&mut self) -> bool {
        true
    }

    /// Read the primary quantity (temperature, bus voltage, raw ADC count)
    fn read_primary(&mut self) -> nb::Result<f32, DeviceError>;

    /// Read the secondary quantity (humidity, current)
    fn read_secondary(&mut self) -> nb::Result<f32, DeviceError> {
        Err(nb::Error::Other(DeviceError::Unsupported))
    }

    /// Queue the next conversion
    fn request(&mut self) {}
}

impl<D: Device + ?Sized> Device for alloc::boxed::Box<D> {
    fn probe(&mut self) -> bool {
        (**self).probe()
    }

    fn data_ready(&mut self) -> bool {
        (**self).data_ready()
    }

    fn read_primary(&mut self) -> nb::Result<f32, DeviceError> {
        (**self).read_primary()
    }

    fn read_secondary(&mut self) -> nb::Result<f32, DeviceError> {
        (**self).read_secondary()
    }

    fn request(&mut self) {
        (**self).request()
    }
}

/// Schedulable, wireable part of a node
///
/// The node calls [`setup`](Component::setup) once at boot, then
/// [`cycle`](Component::cycle) once per tick in assembly order. Values
/// delivered over the wiring graph arrive through
/// [`set_input`](Component::set_input). Accepted output changes go onto the
/// provided queue; the node delivers them before the next component runs.
pub trait Component {
    /// Component identifier, first segment of its port paths
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Owned output channels
    fn outputs(&self) -> &[OutputChannel];

    /// Names of settable input ports
    fn inputs(&self) -> &[&'static str] {
        &[]
    }

    /// One-time initialisation. Must be idempotent.
    fn setup(&mut self) -> Result<(), SetupError> {
        Ok(())
    }

    /// One acquisition step
    fn cycle(&mut self, _changes: &mut ChangeQueue) {}

    /// Deliver a value to an input port; returns `false` for unknown ports
    fn set_input(&mut self, _port: &str, _value: f32, _changes: &mut ChangeQueue) -> bool {
        false
    }

    /// Look up an output channel by port identifier
    fn output(&self, port: &str) -> Option<&OutputChannel> {
        self.outputs().iter().find(|channel| channel.id() == port)
    }
}

/// Receives every accepted change, e.g. to publish it on a message bus
pub trait ChangeObserver {
    /// Called once per accepted change, before subscribers
    fn on_change(&mut self, change: &Change);
}

impl<F: FnMut(&Change)> ChangeObserver for F {
    fn on_change(&mut self, change: &Change) {
        self(change)
    }
}
