//! Scroll animator
//!
//! Tracks a fixed snapshot of target elements and toggles their animation
//! classes as they move in and out of the viewport.
//!
//! # Usage
//!
//! ```ignore
//! use scroll_animate_core::{AnimatorConfig, Hooks, ScrollAnimator};
//!
//! let config = AnimatorConfig {
//!     reverse: true,
//!     ..Default::default()
//! };
//! let hooks = Hooks::default().on_animate(|el| tracing::info!(element = %el.describe(), "done"));
//!
//! let animator = ScrollAnimator::new(host, config, hooks)?;
//! animator.init();
//! // ...
//! animator.kill();
//! ```

mod transitions;

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};

use crate::config::{AnimatorConfig, Hooks};
use crate::debounce::Debounced;
use crate::dom::{flag_not_disabled, offset_override, Element, ATTR_REVERSE, ATTR_SCROLLED};
use crate::error::Error;
use crate::geometry::{is_above_scroll_position, is_in_view, Offset};
use crate::host::{Host, HostEvent, ListenerId};
use crate::state::has_animated;

/// Resolved, immutable options shared with pending completion handlers
pub(crate) struct Settings<E> {
    pub config: AnimatorConfig,
    pub offset: Offset,
    pub hooks: Hooks<E>,
}

impl<E> Settings<E> {
    /// Log a configuration error and hand it to the `on_error` hook
    pub fn report(&self, err: Error) {
        tracing::error!(error = %err, "Animation configuration error");
        if let Some(ref on_error) = self.hooks.on_error {
            on_error(&err);
        }
    }
}

struct Inner<H: Host> {
    host: Rc<H>,
    elements: Vec<H::Element>,
    offset: Offset,
    /// `None` once killed
    settings: RefCell<Option<Rc<Settings<H::Element>>>>,
    initialised: Cell<bool>,
    listeners: RefCell<Vec<ListenerId>>,
    throttled: Debounced,
    /// Indices of elements whose offset override has been reported
    bad_offsets: RefCell<HashSet<usize>>,
}

/// Attribute-driven scroll animation controller
///
/// Call `init()` to attach listeners, `kill()` to detach them. Per-element
/// state lives on the elements themselves (see [`crate::state`]).
pub struct ScrollAnimator<H: Host> {
    inner: Rc<Inner<H>>,
}

impl<H: Host> ScrollAnimator<H> {
    /// Validate options and snapshot the elements matching `config.target`
    pub fn new(host: Rc<H>, config: AnimatorConfig, hooks: Hooks<H::Element>) -> crate::Result<Self> {
        config.validate()?;
        let offset = config.offset()?;
        let elements = host.query_all(&config.target)?;

        debug!(
            target_selector = %config.target,
            elements = elements.len(),
            offset = %offset,
            "Tracking animation targets"
        );

        let throttle = config.throttle();
        let settings = Rc::new(Settings {
            config,
            offset,
            hooks,
        });

        let inner = Rc::new_cyclic(|weak: &Weak<Inner<H>>| {
            let weak = weak.clone();
            let throttled = Debounced::trailing(host.clone(), throttle, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.render(false);
                }
            });

            Inner {
                host,
                elements,
                offset,
                settings: RefCell::new(Some(settings)),
                initialised: Cell::new(false),
                listeners: RefCell::new(Vec::new()),
                throttled,
                bad_offsets: RefCell::new(HashSet::new()),
            }
        });

        Ok(Self { inner })
    }

    /// Default options, no hooks
    pub fn with_defaults(host: Rc<H>) -> crate::Result<Self> {
        Self::new(host, AnimatorConfig::default(), Hooks::default())
    }

    /// Attach listeners and run `on_init`
    ///
    /// No-op when already initialised, after `kill()`, or when the host has
    /// no animation-end event.
    pub fn init(&self) {
        let inner = &self.inner;
        if inner.initialised.get() {
            debug!("Animator already initialised");
            return;
        }
        let Some(settings) = inner.settings() else {
            warn!("init() called on a killed animator");
            return;
        };
        let Some(event) = inner.host.animation_end_event() else {
            warn!("CSS animations are not supported, animator stays inert");
            return;
        };

        inner.initialised.set(true);
        self.add_event_listeners();

        if let Some(ref on_init) = settings.hooks.on_init {
            on_init();
        }

        info!(
            elements = inner.elements.len(),
            animation_end = event,
            "Scroll animator initialised"
        );
    }

    /// Detach listeners and drop the configuration
    pub fn kill(&self) {
        let inner = &self.inner;
        if !inner.initialised.get() {
            return;
        }

        self.remove_event_listeners();
        inner.settings.replace(None);
        inner.initialised.set(false);

        info!("Scroll animator killed");
    }

    /// Evaluate every tracked element once
    ///
    /// `initial` enables the "already scrolled past" check.
    pub fn render(&self, initial: bool) {
        self.inner.render(initial);
    }

    /// Subscribe to the events enabled in the configuration
    ///
    /// With `on_load` set and the document already loaded, the initial pass
    /// runs on every call, even when the listeners are already attached.
    pub fn add_event_listeners(&self) {
        let inner = &self.inner;
        let Some(settings) = inner.settings() else {
            return;
        };

        let config = &settings.config;
        let ready = inner.host.is_ready();
        if config.on_load && ready {
            inner.render(true);
        }

        if !inner.listeners.borrow().is_empty() {
            debug!("Event listeners already attached");
            return;
        }

        let mut attached = Vec::new();

        if config.on_load && !ready {
            let weak = Rc::downgrade(inner);
            attached.push(inner.host.listen(
                HostEvent::Load,
                Rc::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.render(true);
                    }
                }),
            ));
        }

        for (enabled, event) in [
            (config.on_resize, HostEvent::Resize),
            (config.on_scroll, HostEvent::Scroll),
        ] {
            if enabled {
                let throttled = inner.throttled.clone();
                attached.push(inner.host.listen(event, Rc::new(move || throttled.call())));
            }
        }

        debug!(listeners = attached.len(), "Event listeners attached");
        inner.listeners.borrow_mut().extend(attached);
    }

    /// Unsubscribe everything `add_event_listeners` attached
    pub fn remove_event_listeners(&self) {
        let inner = &self.inner;
        let listeners: Vec<ListenerId> = inner.listeners.borrow_mut().drain(..).collect();
        for id in &listeners {
            inner.host.unlisten(*id);
        }
        inner.throttled.cancel();
        debug!(listeners = listeners.len(), "Event listeners removed");
    }

    pub fn is_initialised(&self) -> bool {
        self.inner.initialised.get()
    }

    /// The element snapshot taken at construction
    pub fn elements(&self) -> &[H::Element] {
        &self.inner.elements
    }

    /// Tracked elements whose animation has completed
    pub fn animated_elements(&self) -> Vec<H::Element> {
        self.inner
            .elements
            .iter()
            .filter(|el| has_animated(*el))
            .cloned()
            .collect()
    }

    /// Instance-level offset resolved at construction
    pub fn offset(&self) -> Offset {
        self.inner.offset
    }

    /// Current configuration, `None` once killed
    pub fn config(&self) -> Option<AnimatorConfig> {
        self.inner.settings().map(|s| s.config.clone())
    }

    pub fn host(&self) -> &Rc<H> {
        &self.inner.host
    }
}

impl<H: Host> Drop for ScrollAnimator<H> {
    fn drop(&mut self) {
        self.kill();
    }
}

impl<H: Host> Inner<H> {
    fn settings(&self) -> Option<Rc<Settings<H::Element>>> {
        self.settings.borrow().clone()
    }

    fn render(&self, initial: bool) {
        if !self.initialised.get() {
            return;
        }
        let Some(settings) = self.settings() else {
            return;
        };

        if let Some(ref disabled) = settings.hooks.disable_filter {
            if disabled() {
                debug!("Render pass skipped by disable filter");
                return;
            }
        }

        let viewport = self.host.viewport();
        let scroll = self.host.scroll_position();

        for (index, el) in self.elements.iter().enumerate() {
            let offset = self.element_offset(index, el, &settings);
            let rect = el.bounding_rect();

            if is_in_view(&rect, &viewport, offset) {
                self.add_animation(el, &settings);
            } else if has_animated(el) {
                if flag_not_disabled(el, ATTR_REVERSE) && settings.config.reverse {
                    self.remove_animation(el, &settings);
                }
            } else if initial
                && (settings.config.scrolled || el.has_attribute(ATTR_SCROLLED))
                && is_above_scroll_position(&rect, &scroll, offset.vertical)
            {
                self.add_animation(el, &settings);
            }
        }
    }

    /// Per-element override, falling back to the instance offset
    ///
    /// A broken override is reported the first time a pass meets it.
    fn element_offset(&self, index: usize, el: &H::Element, settings: &Settings<H::Element>) -> Offset {
        match offset_override(el) {
            Ok(Some(offset)) => offset,
            Ok(None) => self.offset,
            Err(err) => {
                if self.bad_offsets.borrow_mut().insert(index) {
                    settings.report(err);
                } else {
                    debug!(element = %el.describe(), error = %err, "Ignoring offset override");
                }
                self.offset
            }
        }
    }
}
