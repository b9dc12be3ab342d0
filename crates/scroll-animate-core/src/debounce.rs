//! Debounced function wrapper
//!
//! Collapses a burst of calls into one invocation, fired on the leading edge,
//! the trailing edge (after `wait` of quiet), or both.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::host::{TimerId, Timers};

/// Which edge of a burst invokes the wrapped function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Leading,
    #[default]
    Trailing,
    Both,
}

impl Edge {
    #[inline]
    fn leading(self) -> bool {
        matches!(self, Self::Leading | Self::Both)
    }

    #[inline]
    fn trailing(self) -> bool {
        matches!(self, Self::Trailing | Self::Both)
    }
}

struct DebounceState {
    timers: Rc<dyn Timers>,
    wait: Duration,
    edge: Edge,
    func: Box<dyn Fn()>,
    pending: Cell<Option<TimerId>>,
    /// A call arrived that the trailing edge still owes an invocation
    owed: Cell<bool>,
}

/// Handle to a debounced function; clones share the same timer
#[derive(Clone)]
pub struct Debounced {
    state: Rc<DebounceState>,
}

impl Debounced {
    pub fn new<F>(timers: Rc<dyn Timers>, wait: Duration, edge: Edge, func: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            state: Rc::new(DebounceState {
                timers,
                wait,
                edge,
                func: Box::new(func),
                pending: Cell::new(None),
                owed: Cell::new(false),
            }),
        }
    }

    /// Trailing-edge debounce, the common case
    pub fn trailing<F>(timers: Rc<dyn Timers>, wait: Duration, func: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self::new(timers, wait, Edge::Trailing, func)
    }

    pub fn call(&self) {
        let state = &self.state;
        let idle = match state.pending.take() {
            Some(id) => {
                state.timers.clear_timeout(id);
                false
            }
            None => true,
        };

        if idle && state.edge.leading() {
            state.owed.set(false);
            (state.func)();
        } else {
            state.owed.set(true);
        }

        self.schedule();
    }

    fn schedule(&self) {
        let weak: Weak<DebounceState> = Rc::downgrade(&self.state);
        let id = self.state.timers.set_timeout(
            self.state.wait,
            Box::new(move || {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                state.pending.set(None);
                if state.edge.trailing() && state.owed.replace(false) {
                    (state.func)();
                }
            }),
        );
        self.state.pending.set(Some(id));
    }

    /// Drop any pending trailing invocation
    pub fn cancel(&self) {
        if let Some(id) = self.state.pending.take() {
            self.state.timers.clear_timeout(id);
        }
        self.state.owed.set(false);
    }

    /// Run a pending trailing invocation now instead of waiting
    pub fn flush(&self) {
        if let Some(id) = self.state.pending.take() {
            self.state.timers.clear_timeout(id);
            if self.state.edge.trailing() && self.state.owed.replace(false) {
                (self.state.func)();
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending.get().is_some()
    }

    pub fn wait(&self) -> Duration {
        self.state.wait
    }
}

impl fmt::Debug for Debounced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("wait", &self.state.wait)
            .field("edge", &self.state.edge)
            .field("pending", &self.state.pending.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, move || inner.set(inner.get() + 1))
    }

    #[test]
    fn test_trailing_collapses_burst() {
        let host = Rc::new(HeadlessHost::new());
        let (count, func) = counter();
        let debounced = Debounced::trailing(host.clone(), Duration::from_millis(15), func);

        for _ in 0..5 {
            debounced.call();
            host.advance(Duration::from_millis(5));
        }
        assert_eq!(count.get(), 0);
        assert!(debounced.is_pending());

        host.advance(Duration::from_millis(15));
        assert_eq!(count.get(), 1);
        assert!(!debounced.is_pending());
    }

    #[test]
    fn test_trailing_waits_full_quiet_period() {
        let host = Rc::new(HeadlessHost::new());
        let (count, func) = counter();
        let debounced = Debounced::trailing(host.clone(), Duration::from_millis(15), func);

        debounced.call();
        host.advance(Duration::from_millis(14));
        assert_eq!(count.get(), 0);
        host.advance(Duration::from_millis(1));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_leading_fires_immediately_once_per_burst() {
        let host = Rc::new(HeadlessHost::new());
        let (count, func) = counter();
        let debounced = Debounced::new(host.clone(), Duration::from_millis(10), Edge::Leading, func);

        debounced.call();
        debounced.call();
        debounced.call();
        assert_eq!(count.get(), 1);

        host.advance(Duration::from_millis(10));
        assert_eq!(count.get(), 1);

        debounced.call();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_both_edges() {
        let host = Rc::new(HeadlessHost::new());
        let (count, func) = counter();
        let debounced = Debounced::new(host.clone(), Duration::from_millis(10), Edge::Both, func);

        // A lone call only fires on the leading edge
        debounced.call();
        host.advance(Duration::from_millis(10));
        assert_eq!(count.get(), 1);

        // A burst fires on both edges
        debounced.call();
        debounced.call();
        assert_eq!(count.get(), 2);
        host.advance(Duration::from_millis(10));
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_cancel_and_flush() {
        let host = Rc::new(HeadlessHost::new());
        let (count, func) = counter();
        let debounced = Debounced::trailing(host.clone(), Duration::from_millis(15), func);

        debounced.call();
        debounced.cancel();
        host.advance(Duration::from_millis(50));
        assert_eq!(count.get(), 0);

        debounced.call();
        debounced.flush();
        assert_eq!(count.get(), 1);
        host.advance(Duration::from_millis(50));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_dropped_handle_never_fires() {
        let host = Rc::new(HeadlessHost::new());
        let (count, func) = counter();
        let debounced = Debounced::trailing(host.clone(), Duration::from_millis(15), func);

        debounced.call();
        drop(debounced);
        host.advance(Duration::from_millis(50));
        assert_eq!(count.get(), 0);
    }
}
