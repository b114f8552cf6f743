//! Wiring Graph
//!
//! ## Overview
//!
//! The wiring graph records which input slots subscribe to which output
//! channels. It only stores identifiers; the components themselves stay owned
//! by the node, so there is no shared or cyclic ownership.
//!
//! ```text
//! soil/soil ─────→ control/now
//! control/out ───→ ledbuiltin/on
//! battery/percentage ─→ (no subscribers, observers only)
//! ```
//!
//! ## Assembly only
//!
//! Every channel and input is registered when its component is added to the
//! [`NodeBuilder`](crate::NodeBuilder); connections are made right after.
//! Once the node is built the graph is read-only, so steady-state delivery
//! needs no locking or revalidation.
//!
//! ## Feedback loops
//!
//! Delivering a value can make the receiving component publish in turn. To
//! keep every delivery finite, `connect` refuses an edge that would let a
//! component's output reach one of its own inputs, directly or through other
//! components. The check is conservative: an input is assumed to influence
//! every output of its component.

use heapless::Vec;

use crate::{
    constants::buffers::{MAX_CHANNELS, MAX_EDGES, MAX_INPUTS},
    errors::WiringError,
    ids::{ChannelId, InputId},
};

/// Directed subscription from an output channel to an input slot
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Publishing output
    pub source: ChannelId,
    /// Receiving input
    pub target: InputId,
}

/// Static subscription map
#[derive(Debug, Default)]
pub struct WiringGraph {
    channels: Vec<(ChannelId, bool), MAX_CHANNELS>,
    inputs: Vec<InputId, MAX_INPUTS>,
    edges: Vec<Edge, MAX_EDGES>,
}

impl WiringGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one component's outputs and inputs, all or nothing
    ///
    /// `outputs` carries each channel with its wireable flag.
    pub fn register(
        &mut self,
        outputs: &[(ChannelId, bool)],
        inputs: &[InputId],
    ) -> Result<(), WiringError> {
        if self.channels.len() + outputs.len() > MAX_CHANNELS {
            return Err(WiringError::CapacityExceeded { what: "channels" });
        }
        if self.inputs.len() + inputs.len() > MAX_INPUTS {
            return Err(WiringError::CapacityExceeded { what: "inputs" });
        }

        for (channel, wireable) in outputs {
            let _ = self.channels.push((channel.clone(), *wireable));
        }
        for input in inputs {
            let _ = self.inputs.push(input.clone());
        }
        Ok(())
    }

    /// Subscribe `target` to every accepted change of `source`
    ///
    /// Connecting the same pair twice is a no-op.
    pub fn connect(&mut self, source: ChannelId, target: InputId) -> Result<(), WiringError> {
        let wireable = self
            .channels
            .iter()
            .find(|(channel, _)| *channel == source)
            .map(|(_, wireable)| *wireable)
            .ok_or_else(|| WiringError::UnknownChannel(source.clone()))?;

        if !self.has_input(&target) {
            return Err(WiringError::UnknownInput(target));
        }

        if !wireable {
            return Err(WiringError::NotWireable(source));
        }

        if self.edges.iter().any(|edge| edge.source == source && edge.target == target) {
            return Ok(());
        }

        if source.component() == target.component()
            || self.reaches(target.component(), source.component())
        {
            return Err(WiringError::Cycle { from: source, to: target });
        }

        log_debug!("wired {} -> {}", source.as_str(), target.as_str());

        self.edges
            .push(Edge { source, target })
            .map_err(|_| WiringError::CapacityExceeded { what: "edges" })
    }

    /// Whether changes on component `from` can reach component `to`
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut stack: Vec<&str, { MAX_EDGES + 1 }> = Vec::new();
        let mut visited: Vec<&str, { MAX_EDGES + 1 }> = Vec::new();
        let _ = stack.push(from);

        while let Some(component) = stack.pop() {
            if component == to {
                return true;
            }
            if visited.contains(&component) {
                continue;
            }
            let _ = visited.push(component);

            for edge in self.edges.iter().filter(|edge| edge.source.component() == component) {
                let _ = stack.push(edge.target.component());
            }
        }

        false
    }

    /// Inputs subscribed to `source`, in connection order
    pub fn subscribers<'a>(&'a self, source: &'a ChannelId) -> impl Iterator<Item = &'a InputId> + 'a {
        self.edges
            .iter()
            .filter(move |edge| edge.source == *source)
            .map(|edge| &edge.target)
    }

    /// Whether the output was registered
    pub fn has_channel(&self, channel: &ChannelId) -> bool {
        self.channels.iter().any(|(known, _)| known == channel)
    }

    /// Whether the input was registered
    pub fn has_input(&self, input: &InputId) -> bool {
        self.inputs.contains(input)
    }

    /// Edges in connection order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether nothing is wired
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
