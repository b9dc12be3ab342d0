//! The environment the animator runs in
//!
//! A `Host` is the window + document pair: it answers geometry queries,
//! dispatches scroll/resize/load events and runs timers. Everything runs on
//! one thread, so handlers are `Rc` and need not be `Send`.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::dom::Element;
use crate::geometry::{ScrollPosition, Viewport};

/// Environment events the animator can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// Document finished loading (`DOMContentLoaded`)
    Load,
    /// Window scrolled
    Scroll,
    /// Window resized
    Resize,
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "DOMContentLoaded",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Event handler registered with a host
pub type Handler = Rc<dyn Fn()>;

/// One-shot timer source (`setTimeout` / `clearTimeout`)
pub trait Timers {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancelling an already fired or unknown timer is a no-op
    fn clear_timeout(&self, id: TimerId);
}

pub trait Host: Timers + 'static {
    type Element: Element;

    /// Elements matching `selector`, in document order
    fn query_all(&self, selector: &str) -> crate::Result<Vec<Self::Element>>;

    fn viewport(&self) -> Viewport;

    fn scroll_position(&self) -> ScrollPosition;

    /// Whether the document has already finished loading
    fn is_ready(&self) -> bool;

    /// Name of the native animation-end event, `None` when animations are
    /// unsupported
    fn animation_end_event(&self) -> Option<&'static str>;

    fn listen(&self, event: HostEvent, handler: Handler) -> ListenerId;

    /// Removing an unknown listener is a no-op
    fn unlisten(&self, id: ListenerId);

    /// Run `handler` the next time `el` finishes a CSS animation, then forget it
    fn once_animation_end(&self, el: &Self::Element, handler: Box<dyn FnOnce()>);
}
