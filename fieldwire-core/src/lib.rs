//! Core acquisition engine for fieldwire sensor nodes
//!
//! Reads physical sensors, rejects known-bad readings, converts raw values
//! into bounded output channels, and forwards accepted changes to wired
//! consumers and the transport layer.
//!
//! Key constraints:
//! - Runs on small MCUs (ESP8266/ESP32 class)
//! - Fixed-capacity tables, no allocation after assembly
//! - All wiring is validated before the node runs
//!
//! ```no_run
//! use fieldwire_core::{Device, DeviceError, Node, Sensor};
//!
//! struct Probe;
//!
//! impl Device for Probe {
//!     fn probe(&mut self) -> bool {
//!         true
//!     }
//!
//!     fn read_primary(&mut self) -> nb::Result<f32, DeviceError> {
//!         Ok(21.5)
//!     }
//! }
//!
//! let probe = Sensor::ds18b20("probe", "Probe", Probe, false).unwrap();
//! let mut node = Node::builder().add(probe).unwrap().build();
//!
//! node.setup();
//! node.tick();
//! assert_eq!(node.value(&"probe/temperature".parse().unwrap()), Some(21.5));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod logging;

pub mod channel;
pub mod constants;
pub mod control;
pub mod conversion;
pub mod errors;
pub mod ids;
pub mod node;
pub mod queue;
pub mod sensor;
pub mod time;
pub mod traits;
pub mod validators;
pub mod wiring;

// Public API
pub use channel::{NotifyPolicy, OutputChannel};
pub use control::{HysteresisControl, Switch, SwitchDriver};
pub use conversion::{LinearMap, PercentageMap};
pub use errors::{ConfigError, DeviceError, InvalidReading, SetupError, WiringError};
pub use ids::{ChannelId, InputId};
pub use node::{Node, NodeBuilder, SetupReport};
pub use queue::{Change, ChangeQueue};
pub use sensor::{ReadStrategy, Sensor, SensorState};
pub use time::TimeSource;
pub use traits::{ChangeObserver, Component, Device};
pub use validators::{Reading, Validation, Validator};
pub use wiring::WiringGraph;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
