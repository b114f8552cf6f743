//! Sensor Node
//!
//! ## Overview
//!
//! A node owns every component of one device, the wiring graph between them,
//! and the queue of pending changes. It has two phases:
//!
//! 1. **Assembly** through [`NodeBuilder`]: add components, connect wires.
//! 2. **Running**: [`setup`](Node::setup) once, then [`tick`](Node::tick)
//!    (or [`poll`](Node::poll) with a clock) forever.
//!
//! ## Tick
//!
//! Each tick cycles every component in assembly order. After each component
//! returns, the node drains the change queue: every accepted change goes to
//! the observers first and then to each subscribed input, in connection
//! order. Anything those inputs publish is drained in the same pass, so all
//! deliveries triggered by a tick have completed when `tick` returns.
//!
//! ```rust
//! use fieldwire_core::{HysteresisControl, Node};
//!
//! let control = HysteresisControl::new("control", "Control", 50.0, 1.0, 0.0, 100.0).unwrap();
//! let mut node = Node::builder().add(control).unwrap().build();
//!
//! assert!(node.setup().all_ready());
//! node.inject(&"control/now".parse().unwrap(), 80.0).unwrap();
//! assert_eq!(node.value(&"control/out".parse().unwrap()), Some(1.0));
//! ```

mod builder;

pub use builder::NodeBuilder;

use alloc::boxed::Box;

use heapless::Vec;

use crate::{
    channel::OutputChannel,
    constants::buffers::{MAX_COMPONENTS, MAX_OBSERVERS},
    errors::WiringError,
    ids::{self, ChannelId, InputId, Label},
    queue::{ChangeQueue, QueueStats},
    time::{elapsed_ms, TimeSource, Timestamp},
    traits::{ChangeObserver, Component},
    wiring::WiringGraph,
};

/// Outcome of [`Node::setup`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupReport {
    ready: Vec<Label, MAX_COMPONENTS>,
    failed: Vec<Label, MAX_COMPONENTS>,
}

impl SetupReport {
    /// Whether every component initialised
    pub fn all_ready(&self) -> bool {
        self.failed.is_empty()
    }

    /// Identifiers of components that initialised
    pub fn ready(&self) -> &[Label] {
        &self.ready
    }

    /// Identifiers of components whose device did not respond
    pub fn failed(&self) -> &[Label] {
        &self.failed
    }
}

/// Assembled sensor node
pub struct Node {
    components: Vec<Box<dyn Component>, MAX_COMPONENTS>,
    graph: WiringGraph,
    observers: Vec<Box<dyn ChangeObserver>, MAX_OBSERVERS>,
    changes: ChangeQueue,
    period_ms: u64,
    last_tick: Option<Timestamp>,
    ticks: u64,
}

impl Node {
    /// Start assembling a node
    pub fn builder() -> NodeBuilder {
        NodeBuilder::new()
    }

    /// Register an observer for every accepted change
    ///
    /// Returns `false` when the observer table is full.
    pub fn observe<O: ChangeObserver + 'static>(&mut self, observer: O) -> bool {
        self.observers.push(Box::new(observer)).is_ok()
    }

    /// Initialise every component once
    ///
    /// Failures are collected, never fatal: a component whose device did not
    /// respond stays inert while the rest of the node keeps running. Calling
    /// this again does not re-probe components that already initialised.
    pub fn setup(&mut self) -> SetupReport {
        let mut report = SetupReport::default();

        for component in self.components.iter_mut() {
            // Component ids were validated when they were added.
            let Ok(id) = ids::label(component.id()) else {
                continue;
            };

            match component.setup() {
                Ok(()) => {
                    let _ = report.ready.push(id);
                }
                Err(error) => {
                    log_warn!("{}: setup failed: {}", id.as_str(), error);
                    let _ = report.failed.push(id);
                }
            }
        }

        log_info!(
            "setup complete: {} ready, {} failed",
            report.ready.len(),
            report.failed.len()
        );
        report
    }

    /// Run one acquisition step over all components
    pub fn tick(&mut self) {
        for index in 0..self.components.len() {
            self.components[index].cycle(&mut self.changes);
            self.dispatch();
        }
        self.ticks = self.ticks.wrapping_add(1);
        log_trace!("tick {} done", self.ticks);
    }

    /// Tick if at least one period has elapsed since the last tick
    ///
    /// The first poll always ticks. Returns whether a tick ran.
    pub fn poll<T: TimeSource>(&mut self, time: &T) -> bool {
        let now = time.now();
        let due = match self.last_tick {
            None => true,
            Some(last) => elapsed_ms(last, now) >= self.period_ms,
        };

        if due {
            self.last_tick = Some(now);
            self.tick();
        }
        due
    }

    /// Deliver a value to an input slot from outside the graph
    ///
    /// Changes the input causes are delivered before this returns.
    pub fn inject(&mut self, target: &InputId, value: f32) -> Result<(), WiringError> {
        if !self.graph.has_input(target) {
            return Err(WiringError::UnknownInput(target.clone()));
        }

        let accepted = match self
            .components
            .iter_mut()
            .find(|component| component.id() == target.component())
        {
            Some(component) => component.set_input(target.port(), value, &mut self.changes),
            None => false,
        };

        self.dispatch();

        if accepted {
            Ok(())
        } else {
            Err(WiringError::UnknownInput(target.clone()))
        }
    }

    /// Drain pending changes to observers and subscribers
    fn dispatch(&mut self) {
        let Self {
            components,
            graph,
            observers,
            changes,
            ..
        } = self;

        while let Some(change) = changes.pop() {
            for observer in observers.iter_mut() {
                observer.on_change(&change);
            }

            for target in graph.subscribers(&change.channel) {
                let Some(component) = components
                    .iter_mut()
                    .find(|component| component.id() == target.component())
                else {
                    continue;
                };

                log_trace!("deliver {} -> {}", change.channel.as_str(), target.as_str());
                if !component.set_input(target.port(), change.value, changes) {
                    log_warn!("{}: input refused", target.as_str());
                }
            }
        }
    }

    /// Current value of an output channel
    pub fn value(&self, channel: &ChannelId) -> Option<f32> {
        self.channel(channel).map(OutputChannel::get)
    }

    /// Look up an output channel by path
    pub fn channel(&self, channel: &ChannelId) -> Option<&OutputChannel> {
        self.component(channel.component())?.output(channel.port())
    }

    /// Look up a component by identifier
    pub fn component(&self, id: &str) -> Option<&dyn Component> {
        self.components
            .iter()
            .find(|component| component.id() == id)
            .map(|component| &**component)
    }

    /// Components in cycle order
    pub fn components(&self) -> impl ExactSizeIterator<Item = &dyn Component> + '_ {
        self.components.iter().map(|component| &**component)
    }

    /// Wiring between the components
    pub fn graph(&self) -> &WiringGraph {
        &self.graph
    }

    /// Interval between ticks used by `poll`
    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Number of completed ticks
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Delivery counters, including dropped changes
    pub fn queue_stats(&self) -> QueueStats {
        self.changes.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        control::{HysteresisControl, Switch, SwitchDriver},
        queue::Change,
        time::FixedTime,
    };
    use std::{cell::RefCell, rc::Rc};

    struct Led(Rc<RefCell<std::vec::Vec<bool>>>);

    impl SwitchDriver for Led {
        fn drive(&mut self, on: bool) {
            self.0.borrow_mut().push(on);
        }
    }

    fn node() -> (Node, Rc<RefCell<std::vec::Vec<bool>>>) {
        let driven = Rc::new(RefCell::new(std::vec::Vec::new()));
        let control = HysteresisControl::new("control", "Control", 50.0, 1.0, 0.0, 100.0).unwrap();
        let led = Switch::new("ledbuiltin", "LED", Led(driven.clone())).unwrap();

        let node = Node::builder()
            .add(control)
            .unwrap()
            .add(led)
            .unwrap()
            .wire("control/out", "ledbuiltin/on")
            .unwrap()
            .build();
        (node, driven)
    }

    #[test]
    fn inject_cascades_through_wires() {
        let (mut node, driven) = node();
        node.setup();

        node.inject(&"control/now".parse().unwrap(), 60.0).unwrap();
        assert_eq!(*driven.borrow(), [false, true]);

        node.inject(&"control/now".parse().unwrap(), 40.0).unwrap();
        assert_eq!(*driven.borrow(), [false, true, false]);
    }

    #[test]
    fn inject_unknown_input() {
        let (mut node, _) = node();
        let result = node.inject(&"pump/on".parse().unwrap(), 1.0);
        assert_eq!(result, Err(WiringError::UnknownInput("pump/on".parse().unwrap())));
    }

    #[test]
    fn observers_see_every_change() {
        let (mut node, _) = node();
        let seen: Rc<RefCell<std::vec::Vec<Change>>> = Rc::default();
        let sink = seen.clone();
        assert!(node.observe(move |change: &Change| sink.borrow_mut().push(change.clone())));

        node.inject(&"control/now".parse().unwrap(), 60.0).unwrap();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].channel.as_str(), "control/out");
        assert_eq!(seen[0].value, 1.0);
    }

    #[test]
    fn poll_respects_period() {
        let (node, _) = node();
        let mut node = Node { period_ms: 1_000, ..node };
        let mut clock = FixedTime::new(5_000);

        assert!(node.poll(&clock));
        clock.advance(999);
        assert!(!node.poll(&clock));
        clock.advance(1);
        assert!(node.poll(&clock));
        assert_eq!(node.ticks(), 2);
    }

    #[test]
    fn setup_report_lists_components() {
        let (mut node, _) = node();
        let report = node.setup();
        assert!(report.all_ready());
        assert_eq!(report.ready().len(), 2);
        assert!(report.failed().is_empty());
    }
}
