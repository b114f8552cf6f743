//! Loading and assembling node descriptions

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use fieldwire_config::{
    assemble, load, load_from_reader, DeviceProvider, LoadError, NodeConfig, SensorConfig,
    SwitchConfig,
};
use fieldwire_core::{ConfigError, Device, DeviceError, SwitchDriver, WiringError};

const FIELD_NODE: &str = r#"{
    "period_ms": 60000,
    "sensors": [
        { "kind": "sht", "id": "sht", "name": "Air" },
        { "kind": "soil", "id": "soil", "name": "Soil Moisture", "retain": false },
        { "kind": "ds18b20", "id": "ds18b20", "name": "Soil Temperature" },
        { "kind": "ina219", "id": "battery", "name": "Battery" }
    ],
    "controls": [
        { "id": "control", "name": "Watering", "limit": 50.0 }
    ],
    "switches": [
        { "id": "ledbuiltin", "name": "Built-in LED" }
    ],
    "wires": [
        { "from": "soil/soil", "to": "control/now" },
        { "from": "control/out", "to": "ledbuiltin/on" }
    ]
}"#;

/// Device returning the same pair of readings forever
struct Constant(f32, f32);

impl Device for Constant {
    fn probe(&mut self) -> bool {
        true
    }

    fn read_primary(&mut self) -> nb::Result<f32, DeviceError> {
        Ok(self.0)
    }

    fn read_secondary(&mut self) -> nb::Result<f32, DeviceError> {
        Ok(self.1)
    }
}

struct Led(Rc<RefCell<Vec<bool>>>);

impl SwitchDriver for Led {
    fn drive(&mut self, on: bool) {
        self.0.borrow_mut().push(on);
    }
}

#[derive(Default)]
struct Bench {
    readings: HashMap<&'static str, (f32, f32)>,
    led: Rc<RefCell<Vec<bool>>>,
}

impl Bench {
    fn field() -> Self {
        let mut bench = Bench::default();
        bench.readings.insert("sht", (21.5, 44.0));
        bench.readings.insert("soil", (0.0, 0.0));
        bench.readings.insert("ds18b20", (14.25, 0.0));
        bench.readings.insert("battery", (3.6, -85.0));
        bench
    }
}

impl DeviceProvider for Bench {
    fn device(&mut self, sensor: &SensorConfig) -> Option<Box<dyn Device>> {
        let (first, second) = *self.readings.get(sensor.id())?;
        Some(Box::new(Constant(first, second)))
    }

    fn switch(&mut self, _switch: &SwitchConfig) -> Option<Box<dyn SwitchDriver>> {
        Some(Box::new(Led(self.led.clone())))
    }
}

#[test]
fn field_node_assembles_and_runs() {
    let config = load(FIELD_NODE).unwrap();
    assert_eq!(config.period_ms, 60_000);
    assert_eq!(config.sensors.len(), 4);

    let mut bench = Bench::field();
    let mut node = assemble(&config, &mut bench).unwrap();
    assert_eq!(node.period_ms(), 60_000);
    assert_eq!(node.graph().len(), 2);

    assert!(node.setup().all_ready());
    node.tick();

    assert_eq!(node.value(&"sht/humidity".parse().unwrap()), Some(44.0));
    assert_eq!(node.value(&"ds18b20/temperature".parse().unwrap()), Some(14.25));
    let percentage = node.value(&"battery/percentage".parse().unwrap()).unwrap();
    assert!((percentage - 50.0).abs() < 1e-3);

    // Wet soil switches the indicator on
    assert_eq!(*bench.led.borrow(), [false, true]);
}

#[test]
fn retain_defaults_to_true() {
    let config = load(FIELD_NODE).unwrap();
    let retains: Vec<bool> = config
        .sensors
        .iter()
        .map(|sensor| match sensor {
            SensorConfig::Ds18b20 { retain, .. }
            | SensorConfig::Sht { retain, .. }
            | SensorConfig::Ina219 { retain, .. }
            | SensorConfig::Battery { retain, .. }
            | SensorConfig::Soil { retain, .. } => *retain,
        })
        .collect();
    assert_eq!(retains, [true, false, true, true]);
}

#[test]
fn empty_description_uses_defaults() {
    let config = load("{}").unwrap();
    assert_eq!(config, NodeConfig::default());
    assert_eq!(config.period_ms, 30_000);
}

#[test]
fn reader_input_accepted() {
    let config = load_from_reader(FIELD_NODE.as_bytes()).unwrap();
    assert_eq!(config.wires.len(), 2);
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(load("{ \"sensors\": ["), Err(LoadError::Parse(_))));
    assert!(matches!(load(r#"{ "sensor": [] }"#), Err(LoadError::Parse(_))));
}

#[test]
fn missing_device_reported() {
    let config = load(FIELD_NODE).unwrap();
    let mut bench = Bench::field();
    bench.readings.remove("ds18b20");

    match assemble(&config, &mut bench) {
        Err(LoadError::MissingDevice(id)) => assert_eq!(id, "ds18b20"),
        _ => panic!("expected a missing device"),
    }
}

#[test]
fn inverted_calibration_rejected() {
    let config = load(
        r#"{ "sensors": [{ "kind": "ina219", "id": "battery", "name": "Battery",
                           "min_voltage": 4.2, "max_voltage": 3.0 }] }"#,
    )
    .unwrap();

    let result = assemble(&config, &mut Bench::field());
    assert!(matches!(
        result,
        Err(LoadError::Config(ConfigError::InvalidCalibration { .. }))
    ));
}

#[test]
fn divider_battery_scales_pin_voltage() {
    let config = load(
        r#"{ "sensors": [{ "kind": "battery", "id": "battery", "name": "Battery",
                           "multiplier": 3.0 }] }"#,
    )
    .unwrap();

    // Bench pin reads 1.2 V: 3.6 V at the cell
    let mut bench = Bench::field();
    bench.readings.insert("battery", (1.2, 0.0));
    let mut node = assemble(&config, &mut bench).unwrap();
    node.setup();
    node.tick();

    let voltage = node.value(&"battery/voltage".parse().unwrap()).unwrap();
    assert!((voltage - 3.6).abs() < 1e-3);
    let percentage = node.value(&"battery/percentage".parse().unwrap()).unwrap();
    assert!((percentage - 50.0).abs() < 1e-3);
}

#[test]
fn divider_multiplier_must_be_positive() {
    let config = load(
        r#"{ "sensors": [{ "kind": "battery", "id": "battery", "name": "Battery",
                           "multiplier": 0.0 }] }"#,
    )
    .unwrap();

    let result = assemble(&config, &mut Bench::field());
    assert!(matches!(
        result,
        Err(LoadError::Config(ConfigError::InvalidConversion))
    ));
}

#[test]
fn unknown_wire_target_rejected() {
    let config = load(
        r#"{ "sensors": [{ "kind": "soil", "id": "soil", "name": "Soil" }],
             "wires": [{ "from": "soil/soil", "to": "pump/on" }] }"#,
    )
    .unwrap();

    let result = assemble(&config, &mut Bench::field());
    assert!(matches!(
        result,
        Err(LoadError::Wiring(WiringError::UnknownInput(_)))
    ));
}

#[test]
fn custom_reject_threshold_applies() {
    let config = load(
        r#"{ "sensors": [{ "kind": "ds18b20", "id": "ds18b20", "name": "T", "reject_at": 10.0 }] }"#,
    )
    .unwrap();

    let mut node = assemble(&config, &mut Bench::field()).unwrap();
    node.setup();
    node.tick();

    let channel = node.channel(&"ds18b20/temperature".parse().unwrap()).unwrap();
    assert!(!channel.is_set());
}
