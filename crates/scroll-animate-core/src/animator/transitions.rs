//! Entry, completion and exit transitions for a single element

use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, trace};

use super::{Inner, Settings};
use crate::dom::{animation_classes, delay_override, flag_not_disabled, Element, ATTR_REMOVE};
use crate::error::Error;
use crate::host::Host;
use crate::state::{is_visible, mark_animated, mark_entering, mark_idle};

impl<H: Host> Inner<H> {
    /// Idle -> Entering: apply the animation classes
    pub(super) fn add_animation(&self, el: &H::Element, settings: &Rc<Settings<H::Element>>) {
        if is_visible(el) {
            return;
        }

        if let Some(ref on_in_view) = settings.hooks.on_in_view {
            on_in_view(el);
        }

        let Some(classes) = animation_classes(el) else {
            settings.report(Error::MissingAnimationClasses(el.describe()));
            return;
        };

        mark_entering(el);
        // A pending delayed exit may have left the marker behind
        el.remove_class(&settings.config.animated_class);

        let delay = self.effective_delay(el, settings);
        match delay {
            Some(delay) => {
                let target = el.clone();
                let pending = classes.clone();
                self.host.set_timeout(
                    delay,
                    Box::new(move || {
                        for class in &pending {
                            target.add_class(class);
                        }
                    }),
                );
            }
            None => {
                for class in &classes {
                    el.add_class(class);
                }
            }
        }

        self.complete_animation(el, settings);

        debug!(
            element = %el.describe(),
            classes = ?classes,
            delay_ms = delay.map(|d| d.as_millis() as u64).unwrap_or(0),
            "Animation entered"
        );
    }

    /// Animated -> Idle: strip animation and marker classes
    pub(super) fn remove_animation(&self, el: &H::Element, settings: &Rc<Settings<H::Element>>) {
        let Some(mut classes) = animation_classes(el) else {
            settings.report(Error::MissingAnimationClasses(el.describe()));
            return;
        };

        mark_idle(el);
        classes.push(settings.config.animated_class.clone());

        match self.effective_delay(el, settings) {
            Some(delay) => {
                let target = el.clone();
                self.host.set_timeout(
                    delay,
                    Box::new(move || {
                        // Re-entered while the removal was pending
                        if is_visible(&target) {
                            return;
                        }
                        for class in &classes {
                            target.remove_class(class);
                        }
                    }),
                );
            }
            None => {
                for class in &classes {
                    el.remove_class(class);
                }
            }
        }

        debug!(element = %el.describe(), "Animation reversed");
    }

    /// Arm the one-shot animation-end handler for an entry
    fn complete_animation(&self, el: &H::Element, settings: &Rc<Settings<H::Element>>) {
        let Some(event) = self.host.animation_end_event() else {
            return;
        };
        trace!(element = %el.describe(), event, "Waiting for animation end");

        let target = el.clone();
        let settings = Rc::clone(settings);
        self.host
            .once_animation_end(el, Box::new(move || finish_animation(&target, &settings)));
    }

    fn effective_delay(&self, el: &H::Element, settings: &Settings<H::Element>) -> Option<Duration> {
        match delay_override(el) {
            Ok(Some(delay)) => Some(delay),
            Ok(None) => settings.config.delay(),
            Err(err) => {
                settings.report(err);
                settings.config.delay()
            }
        }
    }
}

/// Entering -> Animated
///
/// Runs from the host's animation-end event and owns its settings, so it
/// still completes after the animator has been killed.
fn finish_animation<E: Element>(el: &E, settings: &Settings<E>) {
    if flag_not_disabled(el, ATTR_REMOVE) && settings.config.remove {
        if let Some(classes) = animation_classes(el) {
            for class in &classes {
                el.remove_class(class);
            }
        }
    }

    el.add_class(&settings.config.animated_class);
    mark_animated(el);

    if let Some(ref on_animate) = settings.hooks.on_animate {
        on_animate(el);
    }

    debug!(element = %el.describe(), "Animation completed");
}
