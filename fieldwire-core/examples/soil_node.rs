//! Soil Monitoring Node Example
//!
//! Assembles the classic field node: air temperature and humidity, soil
//! moisture driving a watering indicator, soil temperature, and a battery
//! behind a voltage divider. Devices are simulated so the example runs on a
//! desktop.
//!
//! ## Wiring
//!
//! ```text
//! soil/soil ──→ control/now
//! control/out ──→ ledbuiltin/on
//! ```
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example soil_node
//! ```

use fieldwire_core::{
    constants::BATTERY_DIVIDER_RATIO,
    time::FixedTime,
    Change, Device, DeviceError, HysteresisControl, Node, PercentageMap, Sensor, Switch,
    SwitchDriver,
};

/// Simulated device cycling through a fixed list of readings
struct Replay {
    present: bool,
    primary: &'static [f32],
    secondary: &'static [f32],
    index: usize,
}

impl Replay {
    fn new(primary: &'static [f32], secondary: &'static [f32]) -> Self {
        Self { present: true, primary, secondary, index: 0 }
    }

    fn missing() -> Self {
        Self { present: false, primary: &[], secondary: &[], index: 0 }
    }

    fn at(values: &[f32], index: usize) -> nb::Result<f32, DeviceError> {
        if values.is_empty() {
            return Err(nb::Error::Other(DeviceError::NoData));
        }
        Ok(values[index % values.len()])
    }
}

impl Device for Replay {
    fn probe(&mut self) -> bool {
        self.present
    }

    fn read_primary(&mut self) -> nb::Result<f32, DeviceError> {
        let value = Self::at(self.primary, self.index);
        if self.secondary.is_empty() {
            self.index += 1;
        }
        value
    }

    fn read_secondary(&mut self) -> nb::Result<f32, DeviceError> {
        let value = Self::at(self.secondary, self.index);
        self.index += 1;
        value
    }
}

struct Led;

impl SwitchDriver for Led {
    fn drive(&mut self, on: bool) {
        println!("  [led] {}", if on { "ON" } else { "off" });
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("fieldwire Soil Node Example");
    println!("===========================\n");

    // Second frame is the SHT all-zero glitch, third DS18B20 value is its reset value
    let sht = Sensor::sht("sht", "Air", Replay::new(&[21.5, 0.0, 22.0], &[44.0, 0.0, 43.0]), true)?;
    let soil = Sensor::soil("soil", "Soil Moisture", Replay::new(&[1200.0, 2600.0, 2900.0], &[]), true)?;
    let control = HysteresisControl::new("control", "Watering", 49.0, 1.0, 0.0, 100.0)?;
    let led = Switch::new("ledbuiltin", "Built-in LED", Led)?;
    let probe = Sensor::ds18b20("ds18b20", "Soil Temperature", Replay::new(&[14.25, 14.5, 85.0], &[]), true)?;
    // Pin voltages behind a 1:2 divider on the ADC
    let battery = Sensor::battery_divider(
        "battery",
        "Battery",
        Replay::new(&[2.02, 1.99, 1.8], &[]),
        BATTERY_DIVIDER_RATIO,
        PercentageMap::lipo(),
        true,
    )?;
    let missing = Sensor::ds18b20("ds18b20b", "Second Probe", Replay::missing(), true)?;

    let mut node = Node::builder()
        .period_ms(30_000)
        .add(sht)?
        .add(soil)?
        .add(control)?
        .add(led)?
        .add(probe)?
        .add(battery)?
        .add(missing)?
        .wire("soil/soil", "control/now")?
        .wire("control/out", "ledbuiltin/on")?
        .build();

    node.observe(|change: &Change| {
        println!(
            "  {:<20} {:>8.2}{}",
            change.channel.as_str(),
            change.value,
            if change.retain { "  (retained)" } else { "" }
        );
    });

    let report = node.setup();
    println!("Setup: {} ready, {} failed", report.ready().len(), report.failed().len());
    for id in report.failed() {
        println!("  {} did not respond and stays inert", id);
    }

    let mut clock = FixedTime::new(0);
    for cycle in 1..=3 {
        println!("\nCycle {}:", cycle);
        node.poll(&clock);
        clock.advance(node.period_ms());
    }

    println!("\nFinal values:");
    for component in node.components() {
        for channel in component.outputs() {
            println!(
                "  {}/{:<12} {}",
                component.id(),
                channel.id(),
                if channel.is_set() { channel.display().to_string() } else { "-".into() }
            );
        }
    }

    Ok(())
}
