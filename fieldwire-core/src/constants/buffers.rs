//! Identifier Lengths and Table Capacities
//!
//! Everything the node keeps at runtime lives in fixed-capacity tables so the
//! memory footprint is known at build time. The defaults cover a node with a
//! handful of sensors, a control and a couple of actuators.

/// Maximum length of a component or port identifier (bytes).
///
/// Also used for display names. `"Soil Temperature"` and similar fit easily.
pub const MAX_ID_LEN: usize = 24;

/// Maximum length of a `"<component>/<port>"` path (bytes).
pub const MAX_PATH_LEN: usize = 2 * MAX_ID_LEN + 1;

/// Maximum number of components (sensors, controls, actuators) on a node.
pub const MAX_COMPONENTS: usize = 16;

/// Maximum number of output channels owned by one component.
///
/// The battery monitor is the widest sensor with voltage, current and
/// percentage.
pub const MAX_OUTPUTS: usize = 4;

/// Maximum number of output channels registered with the wiring graph.
pub const MAX_CHANNELS: usize = MAX_COMPONENTS * MAX_OUTPUTS;

/// Maximum number of input slots registered with the wiring graph.
pub const MAX_INPUTS: usize = 32;

/// Maximum number of wiring edges.
pub const MAX_EDGES: usize = 32;

/// Maximum number of accepted changes waiting for delivery.
///
/// Changes are drained after every component cycle, so this only has to hold
/// one cycle's output plus whatever its subscribers publish in turn.
pub const MAX_PENDING_CHANGES: usize = 32;

/// Maximum number of change observers (transport hooks) on a node.
pub const MAX_OBSERVERS: usize = 4;
