//! JSON node descriptions for fieldwire
//!
//! Loads a [`NodeConfig`] with `serde_json` and assembles it into a running
//! [`fieldwire_core::Node`] using device handles from a [`DeviceProvider`].
//!
//! ```rust
//! use fieldwire_config::{assemble, load, DeviceProvider, SensorConfig, SwitchConfig};
//! use fieldwire_core::{Device, DeviceError, SwitchDriver};
//!
//! struct Bench;
//!
//! struct Fixed(f32);
//!
//! impl Device for Fixed {
//!     fn probe(&mut self) -> bool {
//!         true
//!     }
//!
//!     fn read_primary(&mut self) -> nb::Result<f32, DeviceError> {
//!         Ok(self.0)
//!     }
//! }
//!
//! impl DeviceProvider for Bench {
//!     fn device(&mut self, _sensor: &SensorConfig) -> Option<Box<dyn Device>> {
//!         Some(Box::new(Fixed(19.5)))
//!     }
//!
//!     fn switch(&mut self, _switch: &SwitchConfig) -> Option<Box<dyn SwitchDriver>> {
//!         None
//!     }
//! }
//!
//! let config = load(r#"{ "sensors": [{ "kind": "ds18b20", "id": "probe", "name": "Probe" }] }"#)?;
//! let mut node = assemble(&config, &mut Bench)?;
//!
//! node.setup();
//! node.tick();
//! assert_eq!(node.value(&"probe/temperature".parse()?), Some(19.5));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use fieldwire_core::{ConfigError, WiringError};
use thiserror_no_std::Error;

pub mod assembly;
pub mod schema;

pub use assembly::{assemble, DeviceProvider};
pub use schema::{HysteresisConfig, NodeConfig, SensorConfig, SwitchConfig, WireConfig};

/// Errors while loading or assembling a node description
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to parse node description: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Wiring failed: {0}")]
    Wiring(#[from] WiringError),

    #[error("No device available for {0}")]
    MissingDevice(String),
}

/// Parse a node description from JSON text
pub fn load(json: &str) -> Result<NodeConfig, LoadError> {
    serde_json::from_str(json).map_err(|e| LoadError::Parse(e.to_string()))
}

/// Parse a node description from a reader, e.g. a file on flash
pub fn load_from_reader<R: std::io::Read>(reader: R) -> Result<NodeConfig, LoadError> {
    serde_json::from_reader(reader).map_err(|e| LoadError::Parse(e.to_string()))
}
