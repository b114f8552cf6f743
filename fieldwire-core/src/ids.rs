//! Identifiers for components and their ports
//!
//! Every component owns a short identifier (`"sht"`, `"battery"`). Its output
//! channels and input slots are addressed by a path `"<component>/<port>"`,
//! the same form the transport layer uses for topics:
//!
//! ```text
//! battery/voltage      output channel of the battery monitor
//! ledbuiltin/on        input slot of the on-board LED
//! ```
//!
//! Identifiers are stored inline in `heapless::String` so the wiring tables
//! have a fixed footprint.

use core::fmt;
use core::str::FromStr;

use heapless::String;

use crate::constants::buffers::{MAX_ID_LEN, MAX_PATH_LEN};
use crate::errors::ConfigError;

/// Inline identifier or display name
pub type Label = String<MAX_ID_LEN>;

/// Copy a string slice into a [`Label`]
pub fn label(text: &str) -> Result<Label, ConfigError> {
    let mut out = Label::new();
    out.push_str(text)
        .map_err(|_| ConfigError::IdentifierTooLong { max: MAX_ID_LEN })?;
    Ok(out)
}

/// Copy a component or port identifier into a [`Label`], rejecting
/// empty identifiers and path separators
pub fn identifier(text: &str) -> Result<Label, ConfigError> {
    check_segment(text)?;
    label(text)
}

fn check_segment(segment: &str) -> Result<(), ConfigError> {
    if segment.is_empty() {
        return Err(ConfigError::InvalidIdentifier { reason: "empty identifier" });
    }
    if segment.contains('/') {
        return Err(ConfigError::InvalidIdentifier { reason: "identifier contains '/'" });
    }
    if segment.len() > MAX_ID_LEN {
        return Err(ConfigError::IdentifierTooLong { max: MAX_ID_LEN });
    }
    Ok(())
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct PortPath {
    path: String<MAX_PATH_LEN>,
    split: usize,
}

impl PortPath {
    fn new(component: &str, port: &str) -> Result<Self, ConfigError> {
        check_segment(component)?;
        check_segment(port)?;

        // Both segments fit, so the joined path fits MAX_PATH_LEN.
        let mut path = String::new();
        let overflow = ConfigError::IdentifierTooLong { max: MAX_ID_LEN };
        path.push_str(component).map_err(|_| overflow)?;
        path.push('/').map_err(|_| overflow)?;
        path.push_str(port).map_err(|_| overflow)?;

        Ok(Self { path, split: component.len() })
    }

    fn parse(path: &str) -> Result<Self, ConfigError> {
        let (component, port) = path.split_once('/').ok_or(ConfigError::InvalidIdentifier {
            reason: "expected <component>/<port>",
        })?;
        Self::new(component, port)
    }

    fn component(&self) -> &str {
        &self.path[..self.split]
    }

    fn port(&self) -> &str {
        &self.path[self.split + 1..]
    }
}

macro_rules! port_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(PortPath);

        impl $name {
            /// Build from a component identifier and a port identifier
            pub fn new(component: &str, port: &str) -> Result<Self, ConfigError> {
                PortPath::new(component, port).map(Self)
            }

            /// Parse a `"<component>/<port>"` path
            pub fn parse(path: &str) -> Result<Self, ConfigError> {
                PortPath::parse(path).map(Self)
            }

            /// Identifier of the owning component
            pub fn component(&self) -> &str {
                self.0.component()
            }

            /// Port identifier within the component
            pub fn port(&self) -> &str {
                self.0.port()
            }

            /// Full `"<component>/<port>"` path
            pub fn as_str(&self) -> &str {
                &self.0.path
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(path: &str) -> Result<Self, Self::Err> {
                Self::parse(path)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.as_str())
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        #[cfg(feature = "defmt")]
        impl defmt::Format for $name {
            fn format(&self, fmt: defmt::Formatter) {
                defmt::write!(fmt, "{=str}", self.as_str())
            }
        }
    };
}

port_id! {
    /// Address of an output channel, e.g. `"battery/voltage"`
    ChannelId
}

port_id! {
    /// Address of a settable input slot, e.g. `"ledbuiltin/on"`
    InputId
}
