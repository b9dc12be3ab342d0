//! Viewport intersection math
//!
//! Pure functions over rectangles in viewport (client) coordinates. The
//! offset acts as a fractional margin: an element is shrunk inward by
//! `height * vertical` at top and bottom and by `width * horizontal` at left
//! and right before being tested against the viewport.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Axis-aligned rectangle, as returned by `getBoundingClientRect()`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Same rectangle moved by `(-dx, -dy)`
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x - dx, self.y - dy, self.width, self.height)
    }
}

/// Visible area of the window (`innerWidth` x `innerHeight`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Window scroll offsets (`scrollX`, `scrollY`)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

/// Fractional margin per axis, nominally in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub vertical: f64,
    pub horizontal: f64,
}

impl Offset {
    pub const fn new(vertical: f64, horizontal: f64) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value)
    }

    /// Parse `"v"` (both axes) or `"v,h"`
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        let number = |s: &str| -> Result<f64> {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::InvalidOffset(input.to_string()))
        };

        match parts.as_slice() {
            [single] => Ok(Self::uniform(number(single)?)),
            [vertical, horizontal] => Ok(Self::new(number(vertical)?, number(horizontal)?)),
            _ => Err(Error::InvalidOffset(input.to_string())),
        }
    }
}

impl Default for Offset {
    fn default() -> Self {
        Self::uniform(0.5)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.vertical, self.horizontal)
    }
}

/// Whether the offset-shrunk rectangle overlaps the viewport on both axes
pub fn is_in_view(rect: &Rect, viewport: &Viewport, offset: Offset) -> bool {
    let inset_y = rect.height * offset.vertical;
    let inset_x = rect.width * offset.horizontal;

    let from_top = rect.bottom() - inset_y > 0.0;
    let from_bottom = rect.top() + inset_y < viewport.height;
    let from_left = rect.right() - inset_x > 0.0;
    let from_right = rect.left() + inset_x < viewport.width;

    from_top && from_bottom && from_left && from_right
}

/// Whether the element's offset line already sits above the scroll position
///
/// `rect` is in viewport coordinates and is moved into document space before
/// comparing, so only elements the page was loaded past qualify.
pub fn is_above_scroll_position(rect: &Rect, scroll: &ScrollPosition, vertical_offset: f64) -> bool {
    let document_top = rect.top() + scroll.y;
    document_top + rect.height * vertical_offset < scroll.y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 800.0)
    }

    #[test]
    fn test_parse_offset_single_value() {
        assert_eq!(Offset::parse("0.25").unwrap(), Offset::uniform(0.25));
    }

    #[test]
    fn test_parse_offset_pair() {
        assert_eq!(Offset::parse("0.2, 0.8").unwrap(), Offset::new(0.2, 0.8));
    }

    #[test]
    fn test_parse_offset_rejects_garbage() {
        assert!(Offset::parse("").is_err());
        assert!(Offset::parse("half").is_err());
        assert!(Offset::parse("0.1,0.2,0.3").is_err());
        assert!(Offset::parse("inf").is_err());
    }

    #[test]
    fn test_zero_offset_is_plain_intersection() {
        let offset = Offset::uniform(0.0);
        // Touching the top edge from above is not an intersection
        assert!(!is_in_view(&Rect::new(0.0, -100.0, 100.0, 100.0), &viewport(), offset));
        assert!(is_in_view(&Rect::new(0.0, -99.0, 100.0, 100.0), &viewport(), offset));
        // Touching the bottom edge
        assert!(!is_in_view(&Rect::new(0.0, 800.0, 100.0, 100.0), &viewport(), offset));
        assert!(is_in_view(&Rect::new(0.0, 799.0, 100.0, 100.0), &viewport(), offset));
        // Horizontal
        assert!(!is_in_view(&Rect::new(1000.0, 10.0, 100.0, 100.0), &viewport(), offset));
        assert!(!is_in_view(&Rect::new(-100.0, 10.0, 100.0, 100.0), &viewport(), offset));
        assert!(is_in_view(&Rect::new(-99.0, 10.0, 100.0, 100.0), &viewport(), offset));
    }

    #[test]
    fn test_half_offset_boundary_at_fifty_percent() {
        let offset = Offset::uniform(0.5);
        // Exactly half of the element is above the bottom edge
        assert!(!is_in_view(&Rect::new(0.0, 700.0, 100.0, 200.0), &viewport(), offset));
        assert!(is_in_view(&Rect::new(0.0, 699.0, 100.0, 200.0), &viewport(), offset));
        // Exactly half scrolled off the top
        assert!(!is_in_view(&Rect::new(0.0, -100.0, 100.0, 200.0), &viewport(), offset));
        assert!(is_in_view(&Rect::new(0.0, -99.0, 100.0, 200.0), &viewport(), offset));
    }

    #[test]
    fn test_full_offset_requires_containment() {
        let offset = Offset::uniform(1.0);
        assert!(is_in_view(&Rect::new(10.0, 10.0, 100.0, 100.0), &viewport(), offset));
        assert!(!is_in_view(&Rect::new(10.0, 0.0, 100.0, 100.0), &viewport(), offset));
        assert!(!is_in_view(&Rect::new(10.0, 701.0, 100.0, 100.0), &viewport(), offset));
        assert!(!is_in_view(&Rect::new(901.0, 10.0, 100.0, 100.0), &viewport(), offset));
    }

    #[test]
    fn test_axes_are_independent() {
        // Vertically inside, horizontally off-screen
        let rect = Rect::new(2000.0, 100.0, 100.0, 100.0);
        assert!(!is_in_view(&rect, &viewport(), Offset::new(0.0, 0.0)));
        // Horizontal offset only
        let rect = Rect::new(950.0, 100.0, 100.0, 100.0);
        assert!(is_in_view(&rect, &viewport(), Offset::new(0.5, 0.4)));
        assert!(!is_in_view(&rect, &viewport(), Offset::new(0.5, 0.5)));
    }

    #[test]
    fn test_above_scroll_position() {
        let scroll = ScrollPosition { x: 0.0, y: 500.0 };
        // Document top 100: scrolled well past
        assert!(is_above_scroll_position(&Rect::new(0.0, -400.0, 100.0, 100.0), &scroll, 0.5));
        // Document top 460: offset line at 510 is still below the scroll position
        assert!(!is_above_scroll_position(&Rect::new(0.0, -40.0, 100.0, 100.0), &scroll, 0.5));
        // Below the fold never qualifies
        assert!(!is_above_scroll_position(&Rect::new(0.0, 900.0, 100.0, 100.0), &scroll, 0.5));
    }
}
