//! Element abstraction and the data attribute protocol
//!
//! Everything the animator knows about an element is read from or written to
//! its attributes, so the same markup drives the browser and headless hosts.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::geometry::{Offset, Rect};

/// Marks an element as a target (default selector `[data-animate]`)
pub const ATTR_ANIMATE: &str = "data-animate";
/// Space-delimited animation classes
pub const ATTR_CLASSES: &str = "data-animation-classes";
/// Delay override in milliseconds
pub const ATTR_DELAY: &str = "data-animation-delay";
/// Offset override: `"v"` or `"v,h"`
pub const ATTR_OFFSET: &str = "data-animation-offset";
/// `"false"` keeps the animation classes after completion
pub const ATTR_REMOVE: &str = "data-animation-remove";
/// `"false"` disables reversing for this element
pub const ATTR_REVERSE: &str = "data-animation-reverse";
/// Presence enables the initial-pass scrolled check
pub const ATTR_SCROLLED: &str = "data-animation-scrolled";
/// Internal: entry has been triggered
pub const ATTR_VISIBILITY: &str = "data-visibility";
/// Internal: animation-end has fired
pub const ATTR_ANIMATED: &str = "data-animated";

/// A DOM node as seen by the animator
///
/// Handles are cheap clones of a shared node; mutation goes through `&self`
/// the way it does on a `web_sys::Element`.
pub trait Element: Clone + 'static {
    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str);

    fn remove_attribute(&self, name: &str);

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    fn add_class(&self, class: &str);

    fn remove_class(&self, class: &str);

    fn has_class(&self, class: &str) -> bool;

    /// Bounding box in viewport coordinates
    fn bounding_rect(&self) -> Rect;

    /// Short human readable label for diagnostics (e.g. `div#hero`)
    fn describe(&self) -> String;
}

/// Animation classes from `data-animation-classes`, `None` when absent or blank
pub fn animation_classes<E: Element>(el: &E) -> Option<Vec<String>> {
    let classes: Vec<String> = el
        .attribute(ATTR_CLASSES)?
        .split_whitespace()
        .map(str::to_string)
        .collect();

    if classes.is_empty() {
        None
    } else {
        Some(classes)
    }
}

/// Per-element delay override
///
/// Leading digits are honoured (`"200ms"` is 200), a value without any is an
/// error. Zero or negative values mean "no override".
pub fn delay_override<E: Element>(el: &E) -> Result<Option<Duration>> {
    let Some(raw) = el.attribute(ATTR_DELAY) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    let millis: i64 = trimmed[..end]
        .parse()
        .map_err(|_| Error::InvalidDelay(raw.clone()))?;

    if millis > 0 {
        Ok(Some(Duration::from_millis(millis as u64)))
    } else {
        Ok(None)
    }
}

/// Per-element offset override from `data-animation-offset`
pub fn offset_override<E: Element>(el: &E) -> Result<Option<Offset>> {
    match el.attribute(ATTR_OFFSET) {
        Some(raw) if !raw.trim().is_empty() => Offset::parse(&raw).map(Some),
        _ => Ok(None),
    }
}

/// `true` unless the attribute is literally `"false"`
pub fn flag_not_disabled<E: Element>(el: &E, name: &str) -> bool {
    el.attribute(name).as_deref() != Some("false")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessElement;

    fn element_with(name: &str, value: &str) -> HeadlessElement {
        let el = HeadlessElement::new("div");
        el.set_attribute(name, value);
        el
    }

    #[test]
    fn test_animation_classes_split_on_whitespace() {
        let el = element_with(ATTR_CLASSES, " fade-in  slide-up ");
        assert_eq!(
            animation_classes(&el),
            Some(vec!["fade-in".to_string(), "slide-up".to_string()])
        );
    }

    #[test]
    fn test_animation_classes_blank_is_missing() {
        assert_eq!(animation_classes(&element_with(ATTR_CLASSES, "   ")), None);
        assert_eq!(animation_classes(&HeadlessElement::new("div")), None);
    }

    #[test]
    fn test_delay_override() {
        assert_eq!(
            delay_override(&element_with(ATTR_DELAY, "250")).unwrap(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(
            delay_override(&element_with(ATTR_DELAY, "120ms")).unwrap(),
            Some(Duration::from_millis(120))
        );
        assert_eq!(delay_override(&element_with(ATTR_DELAY, "0")).unwrap(), None);
        assert_eq!(delay_override(&element_with(ATTR_DELAY, "-5")).unwrap(), None);
        assert_eq!(delay_override(&HeadlessElement::new("div")).unwrap(), None);
        assert!(delay_override(&element_with(ATTR_DELAY, "soon")).is_err());
    }

    #[test]
    fn test_offset_override() {
        assert_eq!(
            offset_override(&element_with(ATTR_OFFSET, "0.1")).unwrap(),
            Some(Offset::uniform(0.1))
        );
        assert_eq!(
            offset_override(&element_with(ATTR_OFFSET, "0.1,0.3")).unwrap(),
            Some(Offset::new(0.1, 0.3))
        );
        assert!(offset_override(&element_with(ATTR_OFFSET, "a,b")).is_err());
    }

    #[test]
    fn test_flag_not_disabled() {
        assert!(flag_not_disabled(&HeadlessElement::new("div"), ATTR_REVERSE));
        assert!(flag_not_disabled(&element_with(ATTR_REVERSE, "true"), ATTR_REVERSE));
        assert!(!flag_not_disabled(&element_with(ATTR_REVERSE, "false"), ATTR_REVERSE));
    }
}
