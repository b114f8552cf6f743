//! Pending Change Queue
//!
//! ## Overview
//!
//! Components never call their subscribers directly. When an output channel
//! accepts a value, the owning component pushes a [`Change`] onto the node's
//! [`ChangeQueue`]; the node drains the queue in FIFO order right after the
//! component returns, handing each change to its observers and to every
//! subscribed input. Subscribers that publish in turn push onto the same
//! queue, so nested writes are delivered within the same drain.
//!
//! ```text
//! Sensor.cycle() ──push──→ ChangeQueue ──pop──→ observers
//!                               ↑            └──→ subscriber.set_input()
//!                               └──────push──────────────┘
//! ```
//!
//! ## Ordering
//!
//! A multi-channel sensor pushes all of its changes before the drain starts,
//! so subscribers of one field already see the other fields updated.
//!
//! ## Capacity
//!
//! The queue is a fixed-size `heapless::Deque`. The node drains it after every
//! component, so it only ever holds one cycle's output plus its cascade. If it
//! does fill, the newest change is dropped and counted; the channel itself
//! still holds the new value.

use heapless::Deque;

use crate::{constants::buffers::MAX_PENDING_CHANGES, ids::ChannelId};

/// Accepted value change on an output channel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Change {
    /// Channel that changed
    pub channel: ChannelId,
    /// New (clamped) value
    pub value: f32,
    /// Whether the transport should retain this value
    pub retain: bool,
}

/// Queue statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Total changes pushed
    pub pushed: u32,
    /// Total changes popped for delivery
    pub popped: u32,
    /// Changes dropped because the queue was full
    pub dropped: u32,
    /// Maximum queue depth seen
    pub max_depth: u32,
}

/// FIFO of changes waiting for delivery
pub struct ChangeQueue<const N: usize = MAX_PENDING_CHANGES> {
    pending: Deque<Change, N>,
    stats: QueueStats,
}

impl<const N: usize> ChangeQueue<N> {
    /// Empty queue with zeroed statistics
    pub const fn new() -> Self {
        Self {
            pending: Deque::new(),
            stats: QueueStats {
                pushed: 0,
                popped: 0,
                dropped: 0,
                max_depth: 0,
            },
        }
    }

    /// Queue a change; returns `false` if it was dropped
    pub fn push(&mut self, change: Change) -> bool {
        match self.pending.push_back(change) {
            Ok(()) => {
                self.stats.pushed = self.stats.pushed.saturating_add(1);
                let depth = self.pending.len() as u32;
                if depth > self.stats.max_depth {
                    self.stats.max_depth = depth;
                }
                true
            }
            Err(change) => {
                self.stats.dropped = self.stats.dropped.saturating_add(1);
                log_warn!("change queue full, dropping update of {}", change.channel.as_str());
                false
            }
        }
    }

    /// Next change in FIFO order
    pub fn pop(&mut self) -> Option<Change> {
        let change = self.pending.pop_front()?;
        self.stats.popped = self.stats.popped.saturating_add(1);
        Some(change)
    }

    /// Number of pending changes
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no change is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Counters since construction
    pub fn stats(&self) -> QueueStats {
        self.stats
    }
}

impl<const N: usize> Default for ChangeQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
