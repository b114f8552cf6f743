//! Shared fixtures for integration tests
//!
//! Mock devices keep their script behind `Rc<RefCell<_>>` so a test can feed
//! new readings after the sensor has been moved into a node.

#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use fieldwire_core::{Device, DeviceError, SwitchDriver};

/// Scripted reading for one device read
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Value(f32),
    Pending,
    Fault,
}

#[derive(Debug, Default)]
pub struct Script {
    pub present: bool,
    pub ready: bool,
    pub probes: u32,
    pub requests: u32,
    pub primary: VecDeque<Step>,
    pub secondary: VecDeque<Step>,
}

/// Device whose probe result and readings are scripted by the test
#[derive(Debug, Clone)]
pub struct MockDevice(Rc<RefCell<Script>>);

impl MockDevice {
    pub fn present() -> Self {
        Self(Rc::new(RefCell::new(Script {
            present: true,
            ready: true,
            ..Script::default()
        })))
    }

    pub fn absent() -> Self {
        Self(Rc::new(RefCell::new(Script::default())))
    }

    pub fn push(&self, value: f32) -> &Self {
        self.0.borrow_mut().primary.push_back(Step::Value(value));
        self
    }

    pub fn push_pair(&self, first: f32, second: f32) -> &Self {
        let mut script = self.0.borrow_mut();
        script.primary.push_back(Step::Value(first));
        script.secondary.push_back(Step::Value(second));
        drop(script);
        self
    }

    pub fn push_step(&self, step: Step) -> &Self {
        self.0.borrow_mut().primary.push_back(step);
        self
    }

    pub fn set_ready(&self, ready: bool) {
        self.0.borrow_mut().ready = ready;
    }

    pub fn probes(&self) -> u32 {
        self.0.borrow().probes
    }

    pub fn requests(&self) -> u32 {
        self.0.borrow().requests
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().primary.len()
    }
}

fn step(queue: &mut VecDeque<Step>) -> nb::Result<f32, DeviceError> {
    match queue.pop_front() {
        Some(Step::Value(value)) => Ok(value),
        Some(Step::Pending) => Err(nb::Error::WouldBlock),
        Some(Step::Fault) => Err(nb::Error::Other(DeviceError::Bus { reason: "nack" })),
        None => Err(nb::Error::Other(DeviceError::NoData)),
    }
}

impl Device for MockDevice {
    fn probe(&mut self) -> bool {
        let mut script = self.0.borrow_mut();
        script.probes += 1;
        script.present
    }

    fn data_ready(&mut self) -> bool {
        self.0.borrow().ready
    }

    fn read_primary(&mut self) -> nb::Result<f32, DeviceError> {
        step(&mut self.0.borrow_mut().primary)
    }

    fn read_secondary(&mut self) -> nb::Result<f32, DeviceError> {
        step(&mut self.0.borrow_mut().secondary)
    }

    fn request(&mut self) {
        self.0.borrow_mut().requests += 1;
    }
}

/// Switch driver recording every level it was driven to
#[derive(Debug, Clone, Default)]
pub struct RecordingSwitch(Rc<RefCell<Vec<bool>>>);

impl RecordingSwitch {
    pub fn levels(&self) -> Vec<bool> {
        self.0.borrow().clone()
    }

    pub fn last(&self) -> Option<bool> {
        self.0.borrow().last().copied()
    }
}

impl SwitchDriver for RecordingSwitch {
    fn drive(&mut self, on: bool) {
        self.0.borrow_mut().push(on);
    }
}

/// Assert two floats agree to within `1e-3`
pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}
