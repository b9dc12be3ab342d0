//! Window and document as an animator host

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use scroll_animate_core::host::{Handler, Host, HostEvent, ListenerId, TimerId, Timers};
use scroll_animate_core::{Error, ScrollPosition, Viewport};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::dom::DomElement;

/// Style property probed for each vendor, and the end event it implies
const ANIMATION_EVENTS: [(&str, &str); 4] = [
    ("animation", "animationend"),
    ("OAnimation", "oAnimationEnd"),
    ("MozAnimation", "animationend"),
    ("WebkitAnimation", "webkitAnimationEnd"),
];

/// Find the animation-end event name by probing a detached element's style
pub fn detect_animation_end(document: &web_sys::Document) -> Option<&'static str> {
    let probe = document.create_element("fakeelement").ok()?;
    let style = probe.dyn_into::<web_sys::HtmlElement>().ok()?.style();

    ANIMATION_EVENTS
        .iter()
        .find(|(property, _)| {
            js_sys::Reflect::get(&style, &JsValue::from_str(property))
                .map(|value| !value.is_undefined())
                .unwrap_or(false)
        })
        .map(|(_, event)| *event)
}

struct Listener {
    target: web_sys::EventTarget,
    event: String,
    closure: Closure<dyn FnMut()>,
}

type Waiters = Rc<RefCell<Vec<(DomElement, Box<dyn FnOnce()>)>>>;

/// Timeouts keyed by id; the browser hands the id back to one shared closure
#[derive(Default)]
struct TimerTable {
    next: Cell<u64>,
    pending: RefCell<HashMap<u64, (i32, Box<dyn FnOnce()>)>>,
}

pub struct BrowserHost {
    window: web_sys::Window,
    document: web_sys::Document,
    animation_end: Option<&'static str>,
    next_listener: Cell<u64>,
    listeners: RefCell<HashMap<ListenerId, Listener>>,
    timers: Rc<TimerTable>,
    timer_dispatch: Closure<dyn FnMut(f64)>,
    waiters: Waiters,
    animation_dispatch: Closure<dyn FnMut(web_sys::Event)>,
}

impl BrowserHost {
    pub fn new() -> scroll_animate_core::Result<Self> {
        let window = web_sys::window().ok_or_else(|| Error::Other("no global window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| Error::Other("window has no document".to_string()))?;
        let animation_end = detect_animation_end(&document);
        debug!(animation_end = ?animation_end, "Detected animation support");

        let timers = Rc::new(TimerTable::default());
        let table = timers.clone();
        let timer_dispatch = Closure::wrap(Box::new(move |token: f64| {
            let due = table.pending.borrow_mut().remove(&(token as u64));
            if let Some((_, callback)) = due {
                callback();
            }
        }) as Box<dyn FnMut(f64)>);

        let waiters: Waiters = Rc::new(RefCell::new(Vec::new()));
        let queue = waiters.clone();
        let animation_dispatch = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let Some(target) = event.current_target() else {
                return;
            };
            let target: JsValue = target.into();
            let due: Vec<Box<dyn FnOnce()>> = {
                let mut queue = queue.borrow_mut();
                let (due, keep): (Vec<_>, Vec<_>) =
                    queue.drain(..).partition(|(el, _)| el.is(&target));
                *queue = keep;
                due.into_iter().map(|(_, handler)| handler).collect()
            };
            for handler in due {
                handler();
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        Ok(Self {
            window,
            document,
            animation_end,
            next_listener: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
            timers,
            timer_dispatch,
            waiters,
            animation_dispatch,
        })
    }

    pub fn window(&self) -> &web_sys::Window {
        &self.window
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }

    fn event_target(&self, event: HostEvent) -> web_sys::EventTarget {
        match event {
            HostEvent::Load => self.document.clone().into(),
            HostEvent::Scroll | HostEvent::Resize => self.window.clone().into(),
        }
    }
}

impl Timers for BrowserHost {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = self.timers.next.get();
        self.timers.next.set(id + 1);

        let millis = delay.as_millis().min(i32::MAX as u128) as i32;
        match self.window.set_timeout_with_callback_and_timeout_and_arguments_1(
            self.timer_dispatch.as_ref().unchecked_ref(),
            millis,
            &JsValue::from_f64(id as f64),
        ) {
            Ok(handle) => {
                self.timers.pending.borrow_mut().insert(id, (handle, callback));
            }
            Err(err) => warn!(error = ?err, "setTimeout failed"),
        }
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Some((handle, _)) = self.timers.pending.borrow_mut().remove(&id.0) {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl Host for BrowserHost {
    type Element = DomElement;

    fn query_all(&self, selector: &str) -> scroll_animate_core::Result<Vec<DomElement>> {
        let nodes = self
            .document
            .query_selector_all(selector)
            .map_err(|err| Error::Selector(format!("'{}': {:?}", selector, err)))?;

        Ok((0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .map(DomElement::new)
            .collect())
    }

    fn viewport(&self) -> Viewport {
        let width = self.window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = self.window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport::new(width, height)
    }

    fn scroll_position(&self) -> ScrollPosition {
        ScrollPosition {
            x: self.window.scroll_x().unwrap_or(0.0),
            y: self.window.scroll_y().unwrap_or(0.0),
        }
    }

    fn is_ready(&self) -> bool {
        self.document.ready_state() != "loading"
    }

    fn animation_end_event(&self) -> Option<&'static str> {
        self.animation_end
    }

    fn listen(&self, event: HostEvent, handler: Handler) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);

        let target = self.event_target(event);
        let name = event.to_string();
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        if let Err(err) = target.add_event_listener_with_callback(&name, closure.as_ref().unchecked_ref()) {
            warn!(event = %name, error = ?err, "addEventListener failed");
        }

        self.listeners.borrow_mut().insert(
            id,
            Listener {
                target,
                event: name,
                closure,
            },
        );
        id
    }

    fn unlisten(&self, id: ListenerId) {
        let Some(listener) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };
        if let Err(err) = listener
            .target
            .remove_event_listener_with_callback(&listener.event, listener.closure.as_ref().unchecked_ref())
        {
            warn!(event = %listener.event, error = ?err, "removeEventListener failed");
        }
    }

    fn once_animation_end(&self, el: &DomElement, handler: Box<dyn FnOnce()>) {
        let Some(event) = self.animation_end else {
            return;
        };

        let options = web_sys::AddEventListenerOptions::new();
        options.set_once(true);
        let result = el
            .as_element()
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                self.animation_dispatch.as_ref().unchecked_ref(),
                &options,
            );

        match result {
            Ok(()) => self.waiters.borrow_mut().push((el.clone(), handler)),
            Err(err) => warn!(event, error = ?err, "addEventListener failed"),
        }
    }
}

impl Drop for BrowserHost {
    fn drop(&mut self) {
        let ids: Vec<ListenerId> = self.listeners.borrow().keys().copied().collect();
        for id in ids {
            self.unlisten(id);
        }

        for (_, (handle, _)) in self.timers.pending.borrow_mut().drain() {
            self.window.clear_timeout_with_handle(handle);
        }

        if let Some(event) = self.animation_end {
            for (el, _) in self.waiters.borrow_mut().drain(..) {
                let _ = el.as_element().remove_event_listener_with_callback(
                    event,
                    self.animation_dispatch.as_ref().unchecked_ref(),
                );
            }
        }
    }
}

impl fmt::Debug for BrowserHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserHost")
            .field("animation_end", &self.animation_end)
            .field("listeners", &self.listeners.borrow().len())
            .field("pending_timers", &self.timers.pending.borrow().len())
            .field("awaiting_animation_end", &self.waiters.borrow().len())
            .finish()
    }
}
