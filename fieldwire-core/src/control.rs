//! Controls and actuators: wiring targets
//!
//! Sensors only publish. The components here also accept values through the
//! wiring graph:
//!
//! - [`HysteresisControl`] turns a measurement into an on/off decision with a
//!   dead band: the output goes to 1 above `limit + hysteresis` and back to 0
//!   below `limit - hysteresis`. Wet soil (probe reading above the limit)
//!   lights the indicator in the field node.
//! - [`Switch`] drives a digital output (LED, relay) from its `on` input.
//!
//! ```text
//! soil/soil ──→ control/now   control/out ──→ ledbuiltin/on
//! ```

use heapless::Vec;

use crate::{
    channel::OutputChannel,
    errors::ConfigError,
    ids::{self, ChannelId, Label},
    queue::{Change, ChangeQueue},
    traits::Component,
};

/// Input ports of [`HysteresisControl`]
pub const HYSTERESIS_INPUTS: [&str; 3] = ["now", "limit", "hysteresis"];

/// Input ports of [`Switch`]
pub const SWITCH_INPUTS: [&str; 1] = ["on"];

/// On/off control with a dead band around a limit
///
/// The output switches to 1 when the measurement rises above
/// `limit + hysteresis`, to 0 when it falls below `limit - hysteresis`, and
/// holds its value inside the band.
pub struct HysteresisControl {
    id: Label,
    name: Label,
    now: Option<f32>,
    limit: f32,
    hysteresis: f32,
    min: f32,
    max: f32,
    outputs: Vec<OutputChannel, 1>,
    out_path: ChannelId,
}

impl HysteresisControl {
    /// `min`/`max` bound the accepted limit values
    pub fn new(
        id: &str,
        name: &str,
        limit: f32,
        hysteresis: f32,
        min: f32,
        max: f32,
    ) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ConfigError::InvalidBounds { min, max });
        }
        if !limit.is_finite() || !hysteresis.is_finite() || hysteresis < 0.0 {
            return Err(ConfigError::InvalidConversion);
        }

        let id = ids::identifier(id)?;
        let out = OutputChannel::new("out", "Out", 0.0, 1.0)?;
        let out_path = ChannelId::new(&id, out.id())?;

        let mut outputs = Vec::new();
        let _ = outputs.push(out);

        Ok(Self {
            id,
            name: ids::label(name)?,
            now: None,
            limit: limit.clamp(min, max),
            hysteresis,
            min,
            max,
            outputs,
            out_path,
        })
    }

    /// Current switching point
    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// Half-width of the dead band
    pub fn hysteresis(&self) -> f32 {
        self.hysteresis
    }

    /// Current output, `None` before the first decision
    pub fn state(&self) -> Option<bool> {
        let out = &self.outputs[0];
        out.is_set().then(|| out.get() > 0.5)
    }

    fn evaluate(&mut self, changes: &mut ChangeQueue) {
        let Some(now) = self.now else {
            return;
        };

        let decision = if now > self.limit + self.hysteresis {
            1.0
        } else if now < self.limit - self.hysteresis {
            0.0
        } else {
            return;
        };

        let out = &mut self.outputs[0];
        if let Some(value) = out.set(decision) {
            log_debug!("{}: output {}", self.id.as_str(), value);
            changes.push(Change {
                channel: self.out_path.clone(),
                value,
                retain: out.is_retained(),
            });
        }
    }
}

impl Component for HysteresisControl {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &[OutputChannel] {
        &self.outputs
    }

    fn inputs(&self) -> &[&'static str] {
        &HYSTERESIS_INPUTS
    }

    fn set_input(&mut self, port: &str, value: f32, changes: &mut ChangeQueue) -> bool {
        if !value.is_finite() {
            return port_known(&HYSTERESIS_INPUTS, port);
        }

        match port {
            "now" => self.now = Some(value),
            "limit" => self.limit = value.clamp(self.min, self.max),
            "hysteresis" => self.hysteresis = if value < 0.0 { -value } else { value },
            _ => return false,
        }

        self.evaluate(changes);
        true
    }
}

/// Digital output driver behind a [`Switch`]
pub trait SwitchDriver {
    /// Set the output level
    fn drive(&mut self, on: bool);
}

impl<S: SwitchDriver + ?Sized> SwitchDriver for alloc::boxed::Box<S> {
    fn drive(&mut self, on: bool) {
        (**self).drive(on)
    }
}

/// Actuator with a single `on` input
///
/// Values of 0.5 and above switch on.
pub struct Switch<S> {
    id: Label,
    name: Label,
    on: bool,
    driver: S,
}

impl<S: SwitchDriver> Switch<S> {
    /// Switch with a single `on` input, initially off
    pub fn new(id: &str, name: &str, driver: S) -> Result<Self, ConfigError> {
        Ok(Self {
            id: ids::identifier(id)?,
            name: ids::label(name)?,
            on: false,
            driver,
        })
    }

    /// Level last driven
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Underlying output driver
    pub fn driver(&self) -> &S {
        &self.driver
    }
}

impl<S: SwitchDriver> Component for Switch<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &[OutputChannel] {
        &[]
    }

    fn inputs(&self) -> &[&'static str] {
        &SWITCH_INPUTS
    }

    fn setup(&mut self) -> Result<(), crate::errors::SetupError> {
        self.driver.drive(self.on);
        Ok(())
    }

    fn set_input(&mut self, port: &str, value: f32, _changes: &mut ChangeQueue) -> bool {
        if port != "on" {
            return false;
        }

        self.on = value >= 0.5;
        log_debug!("{}: switch {}", self.id.as_str(), if self.on { "on" } else { "off" });
        self.driver.drive(self.on);
        true
    }
}

fn port_known(ports: &[&str], port: &str) -> bool {
    ports.iter().any(|known| *known == port)
}
