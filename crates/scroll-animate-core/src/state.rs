//! Per-element lifecycle stored in data attributes
//!
//! ```text
//! Idle --enter--> Entering --animation end--> Animated --exit--> Idle
//! ```
//!
//! Reads and writes of `data-visibility` / `data-animated` go through this
//! module only.

use std::fmt;

use serde::Serialize;

use crate::dom::{Element, ATTR_ANIMATED, ATTR_VISIBILITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementState {
    /// Never triggered, or reversed back out
    Idle,
    /// Entry triggered, waiting for the animation-end signal
    Entering,
    /// Animation-end received
    Animated,
}

impl ElementState {
    pub fn of<E: Element>(el: &E) -> Self {
        match (is_visible(el), has_animated(el)) {
            (_, true) => Self::Animated,
            (true, false) => Self::Entering,
            (false, false) => Self::Idle,
        }
    }
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Entering => "entering",
            Self::Animated => "animated",
        };
        f.write_str(label)
    }
}

/// `data-visibility="true"`
pub fn is_visible<E: Element>(el: &E) -> bool {
    el.attribute(ATTR_VISIBILITY).as_deref() == Some("true")
}

/// `data-animated="true"`
pub fn has_animated<E: Element>(el: &E) -> bool {
    el.attribute(ATTR_ANIMATED).as_deref() == Some("true")
}

/// Idle -> Entering
pub fn mark_entering<E: Element>(el: &E) {
    el.set_attribute(ATTR_VISIBILITY, "true");
}

/// Entering -> Animated
pub fn mark_animated<E: Element>(el: &E) {
    el.set_attribute(ATTR_ANIMATED, "true");
}

/// Animated -> Idle
pub fn mark_idle<E: Element>(el: &E) {
    el.set_attribute(ATTR_VISIBILITY, "false");
    el.remove_attribute(ATTR_ANIMATED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessElement;

    #[test]
    fn test_full_cycle() {
        let el = HeadlessElement::new("div");
        assert_eq!(ElementState::of(&el), ElementState::Idle);

        mark_entering(&el);
        assert_eq!(ElementState::of(&el), ElementState::Entering);
        assert_eq!(el.attribute(ATTR_VISIBILITY).as_deref(), Some("true"));

        mark_animated(&el);
        assert_eq!(ElementState::of(&el), ElementState::Animated);

        mark_idle(&el);
        assert_eq!(ElementState::of(&el), ElementState::Idle);
        assert_eq!(el.attribute(ATTR_VISIBILITY).as_deref(), Some("false"));
        assert!(!el.has_attribute(ATTR_ANIMATED));
    }

    #[test]
    fn test_only_literal_true_counts() {
        let el = HeadlessElement::new("div");
        el.set_attribute(ATTR_VISIBILITY, "yes");
        assert!(!is_visible(&el));
        el.set_attribute(ATTR_ANIMATED, "1");
        assert!(!has_animated(&el));
    }
}
