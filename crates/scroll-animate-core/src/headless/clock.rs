//! Virtual clock driving headless timers

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::host::TimerId;

type Callback = Box<dyn FnOnce()>;

/// Deterministic `setTimeout` queue
///
/// Time only moves when [`VirtualClock::advance`] is called. Timers fire in
/// deadline order, ties broken by scheduling order.
#[derive(Default)]
pub struct VirtualClock {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    queue: RefCell<BTreeMap<(Duration, u64), Callback>>,
    deadlines: RefCell<HashMap<u64, Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn schedule(&self, delay: Duration, callback: Callback) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let deadline = self.now.get() + delay;
        self.queue.borrow_mut().insert((deadline, id), callback);
        self.deadlines.borrow_mut().insert(id, deadline);
        TimerId(id)
    }

    pub fn cancel(&self, id: TimerId) {
        if let Some(deadline) = self.deadlines.borrow_mut().remove(&id.0) {
            self.queue.borrow_mut().remove(&(deadline, id.0));
        }
    }

    /// Number of timers still waiting to fire
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Move time forward, firing every timer that falls due on the way
    ///
    /// Timers scheduled by callbacks fire in the same call if their deadline
    /// is reached.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;

        loop {
            let due = {
                let mut queue = self.queue.borrow_mut();
                match queue.keys().next().copied() {
                    Some(key) if key.0 <= target => queue.remove(&key).map(|cb| (key, cb)),
                    _ => None,
                }
            };
            let Some(((deadline, id), callback)) = due else {
                break;
            };

            self.deadlines.borrow_mut().remove(&id);
            self.now.set(deadline);
            callback();
        }

        self.now.set(target);
    }
}
