//! Delayed one-shot callbacks keyed off the scene clock

use crate::error::EngineResult;
use crate::scene::Scene;

/// Callback fired by the scene at the start of an update
pub type Invocation = Box<dyn FnOnce(&mut Scene) -> EngineResult<()>>;

struct PendingInvocation {
    fire_at: f32,
    order: u64,
    callback: Invocation,
}

/// Queue of pending invocations
///
/// Due invocations are removed from the queue before any of them fires, so
/// callbacks scheduled while firing wait for a later update.
#[derive(Default)]
pub struct InvocationQueue {
    pending: Vec<PendingInvocation>,
    next_order: u64,
}

impl InvocationQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `callback` to fire `delay` seconds after `now`
    ///
    /// A non-positive delay fires on the next update, never synchronously.
    pub fn schedule(&mut self, now: f32, delay: f32, callback: Invocation) {
        self.pending.push(PendingInvocation {
            fire_at: now + delay.max(0.0),
            order: self.next_order,
            callback,
        });
        self.next_order += 1;
    }

    /// Remove and return every invocation due at `now`, earliest first
    pub fn take_due(&mut self, now: f32) -> Vec<Invocation> {
        let (mut due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|invocation| invocation.fire_at <= now);
        self.pending = waiting;
        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at).then(a.order.cmp(&b.order)));
        due.into_iter().map(|invocation| invocation.callback).collect()
    }

    /// Number of waiting invocations
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check whether nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every waiting invocation
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
