//! Building a [`Node`] from a [`NodeConfig`]
//!
//! The description names devices by kind and id only; the platform supplies
//! the actual bus drivers through a [`DeviceProvider`]. Components are added
//! in the order sensors, controls, switches, then the wires are connected.

use fieldwire_core::{Device, Node, SwitchDriver};

use crate::{
    schema::{NodeConfig, SensorConfig, SwitchConfig},
    LoadError,
};

/// Source of device handles for a node description
pub trait DeviceProvider {
    /// Driver for a sensor, `None` if the platform has no such device
    fn device(&mut self, sensor: &SensorConfig) -> Option<Box<dyn Device>>;

    /// Driver for a digital output
    fn switch(&mut self, switch: &SwitchConfig) -> Option<Box<dyn SwitchDriver>>;
}

/// Assemble a node; every configuration and wiring error surfaces here
pub fn assemble<P: DeviceProvider>(config: &NodeConfig, provider: &mut P) -> Result<Node, LoadError> {
    let mut builder = Node::builder().period_ms(config.period_ms);

    for sensor in &config.sensors {
        let device = provider
            .device(sensor)
            .ok_or_else(|| LoadError::MissingDevice(sensor.id().to_string()))?;
        builder = builder.add_boxed(sensor.build(device)?)?;
    }

    for control in &config.controls {
        builder = builder.add(control.build()?)?;
    }

    for switch in &config.switches {
        let driver = provider
            .switch(switch)
            .ok_or_else(|| LoadError::MissingDevice(switch.id.clone()))?;
        builder = builder.add(switch.build(driver)?)?;
    }

    for wire in &config.wires {
        builder = builder.wire(&wire.from, &wire.to)?;
    }

    log::info!(
        "assembled node: {} sensors, {} controls, {} switches, {} wires",
        config.sensors.len(),
        config.controls.len(),
        config.switches.len(),
        config.wires.len()
    );

    Ok(builder.build())
}
