//! In-memory host for tests and simulation
//!
//! A `HeadlessHost` is a document, a window and a virtual clock in one. Time
//! only advances through [`HeadlessHost::advance`], and the native
//! animation-end signal only fires through [`HeadlessHost::end_animation`],
//! so every run is deterministic.

mod clock;
mod element;
mod selector;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

use crate::geometry::{ScrollPosition, Viewport};
use crate::host::{Handler, Host, HostEvent, ListenerId, TimerId, Timers};

pub use clock::VirtualClock;
pub use element::HeadlessElement;
pub use selector::Selector;

use element::WindowState;

/// Event name reported when animation support is on
pub const ANIMATION_END: &str = "animationend";

pub struct HeadlessHost {
    window: Rc<WindowState>,
    viewport: Cell<Viewport>,
    elements: RefCell<Vec<HeadlessElement>>,
    clock: VirtualClock,
    listeners: RefCell<BTreeMap<ListenerId, (HostEvent, Handler)>>,
    next_listener: Cell<u64>,
    animation_end: RefCell<Vec<(HeadlessElement, Box<dyn FnOnce()>)>>,
    animations_supported: Cell<bool>,
    ready: Cell<bool>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self {
            window: Rc::new(WindowState::default()),
            viewport: Cell::new(Viewport::default()),
            elements: RefCell::new(Vec::new()),
            clock: VirtualClock::new(),
            listeners: RefCell::new(BTreeMap::new()),
            next_listener: Cell::new(0),
            animation_end: RefCell::new(Vec::new()),
            animations_supported: Cell::new(true),
            ready: Cell::new(true),
        }
    }
}

impl HeadlessHost {
    /// Loaded document, 1280x800 viewport, scrolled to the top
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(self, width: f64, height: f64) -> Self {
        self.viewport.set(Viewport::new(width, height));
        self
    }

    /// Document that has not fired its load event yet
    pub fn loading(self) -> Self {
        self.ready.set(false);
        self
    }

    pub fn without_animation_support(self) -> Self {
        self.animations_supported.set(false);
        self
    }

    /// Add an element to the document and return a handle to it
    pub fn append(&self, el: HeadlessElement) -> HeadlessElement {
        el.attach(&self.window);
        self.elements.borrow_mut().push(el.clone());
        el
    }

    /// Document-order snapshot of all elements
    pub fn all_elements(&self) -> Vec<HeadlessElement> {
        self.elements.borrow().clone()
    }

    pub fn element_by_id(&self, id: &str) -> Option<HeadlessElement> {
        self.elements
            .borrow()
            .iter()
            .find(|el| el.id().as_deref() == Some(id))
            .cloned()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    pub fn set_animation_support(&self, supported: bool) {
        self.animations_supported.set(supported);
    }

    /// Move the window and fire `scroll`
    pub fn scroll_to(&self, x: f64, y: f64) {
        self.window.scroll.set(ScrollPosition { x, y });
        self.dispatch(HostEvent::Scroll);
    }

    /// Move the window without firing any event
    pub fn set_scroll(&self, x: f64, y: f64) {
        self.window.scroll.set(ScrollPosition { x, y });
    }

    /// Change the viewport and fire `resize`
    pub fn resize(&self, width: f64, height: f64) {
        self.viewport.set(Viewport::new(width, height));
        self.dispatch(HostEvent::Resize);
    }

    /// Mark the document loaded and fire the load event
    pub fn load(&self) {
        self.ready.set(true);
        self.dispatch(HostEvent::Load);
    }

    /// Invoke every listener registered for `event`
    pub fn dispatch(&self, event: HostEvent) {
        let handlers: Vec<Handler> = self
            .listeners
            .borrow()
            .values()
            .filter(|(e, _)| *e == event)
            .map(|(_, h)| h.clone())
            .collect();

        trace!(%event, handlers = handlers.len(), "Dispatching event");
        for handler in handlers {
            handler();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn listener_count_for(&self, event: HostEvent) -> usize {
        self.listeners
            .borrow()
            .values()
            .filter(|(e, _)| *e == event)
            .count()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.clock.pending()
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Fire the native animation-end signal on `el`
    ///
    /// Returns the number of handlers that ran.
    pub fn end_animation(&self, el: &HeadlessElement) -> usize {
        let due: Vec<Box<dyn FnOnce()>> = {
            let mut waiting = self.animation_end.borrow_mut();
            let (due, keep): (Vec<_>, Vec<_>) = waiting.drain(..).partition(|(e, _)| e.same_node(el));
            *waiting = keep;
            due.into_iter().map(|(_, handler)| handler).collect()
        };

        let count = due.len();
        for handler in due {
            handler();
        }
        count
    }

    /// Fire animation-end on every element that is waiting for it
    pub fn end_all_animations(&self) -> usize {
        let waiting: Vec<Box<dyn FnOnce()>> = self
            .animation_end
            .borrow_mut()
            .drain(..)
            .map(|(_, handler)| handler)
            .collect();

        let count = waiting.len();
        for handler in waiting {
            handler();
        }
        count
    }

    /// Elements with an armed animation-end handler
    pub fn awaiting_animation_end(&self) -> usize {
        self.animation_end.borrow().len()
    }
}

impl Timers for HeadlessHost {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        self.clock.schedule(delay, callback)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.clock.cancel(id);
    }
}

impl Host for HeadlessHost {
    type Element = HeadlessElement;

    fn query_all(&self, selector: &str) -> crate::Result<Vec<HeadlessElement>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .elements
            .borrow()
            .iter()
            .filter(|el| selector.matches(el))
            .cloned()
            .collect())
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn scroll_position(&self) -> ScrollPosition {
        self.window.scroll.get()
    }

    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn animation_end_event(&self) -> Option<&'static str> {
        self.animations_supported.get().then_some(ANIMATION_END)
    }

    fn listen(&self, event: HostEvent, handler: Handler) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, (event, handler));
        id
    }

    fn unlisten(&self, id: ListenerId) {
        self.listeners.borrow_mut().remove(&id);
    }

    fn once_animation_end(&self, el: &HeadlessElement, handler: Box<dyn FnOnce()>) {
        self.animation_end.borrow_mut().push((el.clone(), handler));
    }
}

impl fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("viewport", &self.viewport.get())
            .field("scroll", &self.window.scroll.get())
            .field("elements", &self.elements.borrow().len())
            .field("listeners", &self.listeners.borrow().len())
            .field("now", &self.clock.now())
            .field("ready", &self.ready.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;
    use crate::geometry::Rect;

    #[test]
    fn test_bounding_rect_follows_scroll() {
        let host = HeadlessHost::new();
        let el = host.append(HeadlessElement::new("div").with_rect(Rect::new(0.0, 1000.0, 100.0, 50.0)));

        host.set_scroll(0.0, 600.0);
        assert_eq!(el.bounding_rect(), Rect::new(0.0, 400.0, 100.0, 50.0));
    }

    #[test]
    fn test_query_all_keeps_document_order() {
        let host = HeadlessHost::new();
        host.append(HeadlessElement::new("div").with_id("a").with_attribute("data-animate", ""));
        host.append(HeadlessElement::new("div").with_id("b"));
        host.append(HeadlessElement::new("div").with_id("c").with_attribute("data-animate", ""));

        let ids: Vec<String> = host
            .query_all("[data-animate]")
            .unwrap()
            .iter()
            .filter_map(|el| el.id())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_listeners_dispatch_and_unlisten() {
        let host = HeadlessHost::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = host.listen(HostEvent::Scroll, Rc::new(move || counter.set(counter.get() + 1)));

        host.scroll_to(0.0, 10.0);
        host.resize(800.0, 600.0);
        assert_eq!(hits.get(), 1);

        host.unlisten(id);
        host.scroll_to(0.0, 20.0);
        assert_eq!(hits.get(), 1);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_animation_end_is_one_shot_per_registration() {
        let host = HeadlessHost::new();
        let el = host.append(HeadlessElement::new("div"));
        let other = host.append(HeadlessElement::new("div"));
        host.once_animation_end(&el, Box::new(|| {}));
        host.once_animation_end(&other, Box::new(|| {}));

        assert_eq!(host.end_animation(&el), 1);
        assert_eq!(host.end_animation(&el), 0);
        assert_eq!(host.awaiting_animation_end(), 1);
        assert_eq!(host.end_all_animations(), 1);
    }

    #[test]
    fn test_feature_detection() {
        assert_eq!(HeadlessHost::new().animation_end_event(), Some(ANIMATION_END));
        assert_eq!(HeadlessHost::new().without_animation_support().animation_end_event(), None);
    }
}
