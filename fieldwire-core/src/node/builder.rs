//! Node assembly
//!
//! All components are added and all wires connected here, before the node
//! runs. Every mistake surfaces as a [`WiringError`] at assembly time; the
//! built [`Node`] has no fallible wiring operations left.

use alloc::boxed::Box;

use heapless::Vec;

use crate::{
    constants::{
        buffers::{MAX_COMPONENTS, MAX_INPUTS, MAX_OUTPUTS},
        DEFAULT_PERIOD_MS,
    },
    errors::WiringError,
    ids::{ChannelId, InputId},
    queue::ChangeQueue,
    traits::Component,
    wiring::WiringGraph,
};

use super::Node;

/// Builder for a [`Node`]
pub struct NodeBuilder {
    components: Vec<Box<dyn Component>, MAX_COMPONENTS>,
    graph: WiringGraph,
    period_ms: u64,
}

impl NodeBuilder {
    /// Create an empty builder with the default acquisition period
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            graph: WiringGraph::new(),
            period_ms: DEFAULT_PERIOD_MS,
        }
    }

    /// Set the interval between ticks driven by [`Node::poll`]
    pub fn period_ms(mut self, period_ms: u64) -> Self {
        self.period_ms = period_ms;
        self
    }

    /// Add a component and register its ports
    ///
    /// Components cycle in the order they were added.
    pub fn add<C: Component + 'static>(self, component: C) -> Result<Self, WiringError> {
        self.add_boxed(Box::new(component))
    }

    /// Add an already boxed component
    pub fn add_boxed(mut self, component: Box<dyn Component>) -> Result<Self, WiringError> {
        let id = component.id();
        if self.components.iter().any(|existing| existing.id() == id) {
            return Err(WiringError::DuplicateComponent);
        }
        if self.components.is_full() {
            return Err(WiringError::CapacityExceeded { what: "components" });
        }

        let mut outputs: Vec<(ChannelId, bool), MAX_OUTPUTS> = Vec::new();
        for channel in component.outputs() {
            outputs
                .push((ChannelId::new(id, channel.id())?, channel.is_wireable()))
                .map_err(|_| WiringError::CapacityExceeded { what: "outputs" })?;
        }

        let mut inputs: Vec<InputId, MAX_INPUTS> = Vec::new();
        for port in component.inputs() {
            inputs
                .push(InputId::new(id, port)?)
                .map_err(|_| WiringError::CapacityExceeded { what: "inputs" })?;
        }

        self.graph.register(&outputs, &inputs)?;
        log_debug!(
            "added {} ({} outputs, {} inputs)",
            id,
            outputs.len(),
            inputs.len()
        );

        self.components
            .push(component)
            .map_err(|_| WiringError::CapacityExceeded { what: "components" })?;
        Ok(self)
    }

    /// Subscribe an input slot to an output channel
    pub fn connect(mut self, source: ChannelId, target: InputId) -> Result<Self, WiringError> {
        self.graph.connect(source, target)?;
        Ok(self)
    }

    /// [`connect`](Self::connect) with `"<component>/<port>"` paths
    pub fn wire(self, source: &str, target: &str) -> Result<Self, WiringError> {
        let source = ChannelId::parse(source)?;
        let target = InputId::parse(target)?;
        self.connect(source, target)
    }

    /// Finish assembly
    pub fn build(self) -> Node {
        log_info!(
            "node assembled: {} components, {} wires",
            self.components.len(),
            self.graph.len()
        );

        Node {
            components: self.components,
            graph: self.graph,
            observers: Vec::new(),
            changes: ChangeQueue::new(),
            period_ms: self.period_ms,
            last_tick: None,
            ticks: 0,
        }
    }
}

impl Default for NodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
