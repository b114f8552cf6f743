//! Node description schema
//!
//! A node is described as JSON:
//!
//! ```json
//! {
//!   "period_ms": 30000,
//!   "sensors": [
//!     { "kind": "sht", "id": "sht", "name": "Air" },
//!     { "kind": "soil", "id": "soil", "name": "Soil Moisture" },
//!     { "kind": "ds18b20", "id": "ds18b20", "name": "Soil Temperature" },
//!     { "kind": "ina219", "id": "battery", "name": "Battery" }
//!   ],
//!   "controls": [
//!     { "id": "control", "name": "Watering", "limit": 50.0 }
//!   ],
//!   "switches": [
//!     { "id": "ledbuiltin", "name": "Built-in LED" }
//!   ],
//!   "wires": [
//!     { "from": "soil/soil", "to": "control/now" },
//!     { "from": "control/out", "to": "ledbuiltin/on" }
//!   ]
//! }
//! ```
//!
//! Omitted fields take the defaults of the matching `fieldwire-core` preset.

use serde::{Deserialize, Serialize};

use fieldwire_core::{
    constants::{
        sensors::{SOIL_DRY_RAW, SOIL_SCALE},
        BATTERY_DIVIDER_RATIO, DEFAULT_PERIOD_MS, DS18B20_REJECT_THRESHOLD_C, LIPO_MAX_VOLTAGE_V, LIPO_MIN_VOLTAGE_V,
        SHT_DEFAULT_ADDRESS,
    },
    validators::ThresholdValidator,
    Component, ConfigError, Device, HysteresisControl, LinearMap, PercentageMap, Sensor, Switch,
    SwitchDriver, Validation,
};

/// Complete node description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    /// Interval between acquisition ticks
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Sensors, cycled in this order
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,

    /// Hysteresis controls, cycled after the sensors
    #[serde(default)]
    pub controls: Vec<HysteresisConfig>,

    /// Digital outputs
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,

    /// Output-to-input connections
    #[serde(default)]
    pub wires: Vec<WireConfig>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
            sensors: Vec::new(),
            controls: Vec::new(),
            switches: Vec::new(),
            wires: Vec::new(),
        }
    }
}

/// One sensor, tagged by device kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorConfig {
    /// OneWire temperature probe
    Ds18b20 {
        id: String,
        name: String,
        #[serde(default = "default_retain")]
        retain: bool,
        /// Readings at or above this are rejected
        #[serde(default = "default_reject_at")]
        reject_at: f32,
    },

    /// I2C temperature and humidity sensor
    Sht {
        id: String,
        name: String,
        #[serde(default = "default_retain")]
        retain: bool,
        /// Bus address, used by the device provider
        #[serde(default = "default_sht_address")]
        address: u8,
    },

    /// Battery monitor
    Ina219 {
        id: String,
        name: String,
        #[serde(default = "default_retain")]
        retain: bool,
        #[serde(default = "default_min_voltage")]
        min_voltage: f32,
        #[serde(default = "default_max_voltage")]
        max_voltage: f32,
    },

    /// Battery on an ADC pin behind a voltage divider
    Battery {
        id: String,
        name: String,
        #[serde(default = "default_retain")]
        retain: bool,
        /// Battery volts per pin volt
        #[serde(default = "default_multiplier")]
        multiplier: f32,
        #[serde(default = "default_min_voltage")]
        min_voltage: f32,
        #[serde(default = "default_max_voltage")]
        max_voltage: f32,
    },

    /// Analog soil moisture probe
    Soil {
        id: String,
        name: String,
        #[serde(default = "default_retain")]
        retain: bool,
        /// Raw reading that maps to 0%
        #[serde(default = "default_soil_offset")]
        offset: f32,
        /// Percent per raw count
        #[serde(default = "default_soil_scale")]
        scale: f32,
    },
}

impl SensorConfig {
    /// Component identifier of the sensor
    pub fn id(&self) -> &str {
        match self {
            SensorConfig::Ds18b20 { id, .. }
            | SensorConfig::Sht { id, .. }
            | SensorConfig::Ina219 { id, .. }
            | SensorConfig::Battery { id, .. }
            | SensorConfig::Soil { id, .. } => id,
        }
    }

    /// Build the sensor around a device handle
    pub fn build(&self, device: Box<dyn Device>) -> Result<Box<dyn Component>, ConfigError> {
        let sensor = match self {
            SensorConfig::Ds18b20 { id, name, retain, reject_at } => {
                if !reject_at.is_finite() {
                    return Err(ConfigError::InvalidConversion);
                }
                Sensor::ds18b20(id, name, device, *retain)?
                    .with_validation(Validation::Threshold(ThresholdValidator::new(*reject_at)))
            }
            SensorConfig::Sht { id, name, retain, .. } => Sensor::sht(id, name, device, *retain)?,
            SensorConfig::Ina219 { id, name, retain, min_voltage, max_voltage } => {
                Sensor::ina219(id, name, device, *min_voltage, *max_voltage, *retain)?
            }
            SensorConfig::Battery { id, name, retain, multiplier, min_voltage, max_voltage } => {
                let map = PercentageMap::new(*min_voltage, *max_voltage)?;
                Sensor::battery_divider(id, name, device, *multiplier, map, *retain)?
            }
            SensorConfig::Soil { id, name, retain, offset, scale } => {
                let map = LinearMap::new(*offset, *scale)?;
                Sensor::analog(id, name, device, map, *retain)?
            }
        };

        Ok(Box::new(sensor))
    }
}

/// Hysteresis control description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HysteresisConfig {
    pub id: String,
    pub name: String,
    pub limit: f32,
    #[serde(default = "default_hysteresis")]
    pub hysteresis: f32,
    #[serde(default)]
    pub min: f32,
    #[serde(default = "default_max")]
    pub max: f32,
}

impl HysteresisConfig {
    pub fn build(&self) -> Result<HysteresisControl, ConfigError> {
        HysteresisControl::new(&self.id, &self.name, self.limit, self.hysteresis, self.min, self.max)
    }
}

/// Digital output description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchConfig {
    pub id: String,
    pub name: String,
}

impl SwitchConfig {
    pub fn build(
        &self,
        driver: Box<dyn SwitchDriver>,
    ) -> Result<Switch<Box<dyn SwitchDriver>>, ConfigError> {
        Switch::new(&self.id, &self.name, driver)
    }
}

/// Connection from an output path to an input path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WireConfig {
    pub from: String,
    pub to: String,
}

fn default_period_ms() -> u64 {
    DEFAULT_PERIOD_MS
}

fn default_retain() -> bool {
    true
}

fn default_reject_at() -> f32 {
    DS18B20_REJECT_THRESHOLD_C
}

fn default_sht_address() -> u8 {
    SHT_DEFAULT_ADDRESS
}

fn default_min_voltage() -> f32 {
    LIPO_MIN_VOLTAGE_V
}

fn default_max_voltage() -> f32 {
    LIPO_MAX_VOLTAGE_V
}

fn default_multiplier() -> f32 {
    BATTERY_DIVIDER_RATIO
}

fn default_soil_offset() -> f32 {
    SOIL_DRY_RAW
}

fn default_soil_scale() -> f32 {
    SOIL_SCALE
}

fn default_hysteresis() -> f32 {
    1.0
}

fn default_max() -> f32 {
    100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_defaults_follow_presets() {
        let sensor: SensorConfig =
            serde_json::from_str(r#"{ "kind": "ina219", "id": "battery", "name": "Battery" }"#).unwrap();

        assert_eq!(
            sensor,
            SensorConfig::Ina219 {
                id: "battery".into(),
                name: "Battery".into(),
                retain: true,
                min_voltage: 3.0,
                max_voltage: 4.2,
            }
        );
        assert_eq!(sensor.id(), "battery");
    }

    #[test]
    fn battery_divider_defaults() {
        let sensor: SensorConfig =
            serde_json::from_str(r#"{ "kind": "battery", "id": "battery", "name": "Battery" }"#).unwrap();

        assert_eq!(
            sensor,
            SensorConfig::Battery {
                id: "battery".into(),
                name: "Battery".into(),
                retain: true,
                multiplier: 2.0,
                min_voltage: 3.0,
                max_voltage: 4.2,
            }
        );
    }

    #[test]
    fn unknown_kind_rejected() {
        let result: Result<SensorConfig, _> =
            serde_json::from_str(r#"{ "kind": "bme280", "id": "air", "name": "Air" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn control_defaults() {
        let control: HysteresisConfig =
            serde_json::from_str(r#"{ "id": "control", "name": "Control", "limit": 50 }"#).unwrap();
        assert_eq!(control.hysteresis, 1.0);
        assert_eq!((control.min, control.max), (0.0, 100.0));
        assert!(control.build().is_ok());
    }
}
