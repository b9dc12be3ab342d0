use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::Offset;

/// Animator options, merged over defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatorConfig {
    /// Selector for the elements to track
    #[serde(default = "default_target")]
    pub target: String,
    /// Marker class added once an element's animation has finished
    #[serde(default = "default_animated_class")]
    pub animated_class: String,
    /// Fractional margin applied before the in-view test
    #[serde(default)]
    pub offset: OffsetSpec,
    /// Default delay before toggling classes, in milliseconds (0 = none)
    #[serde(default, alias = "delay")]
    pub delay_ms: u64,
    /// Strip animation classes once the animation has finished
    #[serde(default = "default_true")]
    pub remove: bool,
    /// On the initial pass, animate elements the page was loaded past
    #[serde(default)]
    pub scrolled: bool,
    /// Reverse animated elements when they leave the viewport
    #[serde(default)]
    pub reverse: bool,
    /// Run an initial pass once the document is ready
    #[serde(default = "default_true")]
    pub on_load: bool,
    /// Re-evaluate on window scroll
    #[serde(default = "default_true")]
    pub on_scroll: bool,
    /// Re-evaluate on window resize
    #[serde(default)]
    pub on_resize: bool,
    /// Quiet period before a scroll/resize burst triggers a pass
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            animated_class: default_animated_class(),
            offset: OffsetSpec::default(),
            delay_ms: 0,
            remove: default_true(),
            scrolled: false,
            reverse: false,
            on_load: default_true(),
            on_scroll: default_true(),
            on_resize: false,
            throttle_ms: default_throttle_ms(),
        }
    }
}

/// The three accepted shapes of `offset`
///
/// ```toml
/// offset = [0.5, 0.25]   # vertical, horizontal
/// offset = 0.3           # both axes
/// offset = "0.5,0.25"    # per-axis string
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OffsetSpec {
    Pair([f64; 2]),
    Uniform(f64),
    Axes(String),
}

impl Default for OffsetSpec {
    fn default() -> Self {
        Self::Pair([0.5, 0.5])
    }
}

impl OffsetSpec {
    pub fn resolve(&self) -> crate::Result<Offset> {
        let offset = match self {
            Self::Pair([vertical, horizontal]) => Offset::new(*vertical, *horizontal),
            Self::Uniform(value) => Offset::uniform(*value),
            Self::Axes(raw) => return Offset::parse(raw),
        };

        if offset.vertical.is_finite() && offset.horizontal.is_finite() {
            Ok(offset)
        } else {
            Err(Error::InvalidOffset(offset.to_string()))
        }
    }
}

impl From<Offset> for OffsetSpec {
    fn from(offset: Offset) -> Self {
        Self::Pair([offset.vertical, offset.horizontal])
    }
}

fn default_target() -> String {
    "[data-animate]".to_string()
}

fn default_animated_class() -> String {
    "js-animated".to_string()
}

fn default_true() -> bool {
    true
}

fn default_throttle_ms() -> u64 {
    15
}

impl AnimatorConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that would make every pass meaningless
    pub fn validate(&self) -> crate::Result<()> {
        if self.target.trim().is_empty() {
            return Err(Error::Config("target selector is empty".to_string()));
        }
        if self.animated_class.split_whitespace().count() != 1 {
            return Err(Error::Config(format!(
                "animated_class must be a single class name, got '{}'",
                self.animated_class
            )));
        }
        self.offset.resolve()?;
        Ok(())
    }

    pub fn offset(&self) -> crate::Result<Offset> {
        self.offset.resolve()
    }

    /// Instance-level delay, `None` when zero
    pub fn delay(&self) -> Option<Duration> {
        (self.delay_ms > 0).then(|| Duration::from_millis(self.delay_ms))
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

pub type ElementCallback<E> = Rc<dyn Fn(&E)>;

/// Function-valued options
///
/// Every hook is optional; an unset hook behaves like a no-op.
pub struct Hooks<E> {
    /// Returning `true` skips the whole pass (e.g. narrow viewports)
    pub disable_filter: Option<Rc<dyn Fn() -> bool>>,
    /// Runs once at the end of `init()`
    pub on_init: Option<Rc<dyn Fn()>>,
    /// Runs when an element enters view, before classes are applied
    pub on_in_view: Option<ElementCallback<E>>,
    /// Runs when an element's animation has finished
    pub on_animate: Option<ElementCallback<E>>,
    /// Receives reported configuration errors
    pub on_error: Option<Rc<dyn Fn(&Error)>>,
}

impl<E> Default for Hooks<E> {
    fn default() -> Self {
        Self {
            disable_filter: None,
            on_init: None,
            on_in_view: None,
            on_animate: None,
            on_error: None,
        }
    }
}

impl<E> Clone for Hooks<E> {
    fn clone(&self) -> Self {
        Self {
            disable_filter: self.disable_filter.clone(),
            on_init: self.on_init.clone(),
            on_in_view: self.on_in_view.clone(),
            on_animate: self.on_animate.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<E> Hooks<E> {
    pub fn disable_filter(mut self, f: impl Fn() -> bool + 'static) -> Self {
        self.disable_filter = Some(Rc::new(f));
        self
    }

    pub fn on_init(mut self, f: impl Fn() + 'static) -> Self {
        self.on_init = Some(Rc::new(f));
        self
    }

    pub fn on_in_view(mut self, f: impl Fn(&E) + 'static) -> Self {
        self.on_in_view = Some(Rc::new(f));
        self
    }

    pub fn on_animate(mut self, f: impl Fn(&E) + 'static) -> Self {
        self.on_animate = Some(Rc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&Error) + 'static) -> Self {
        self.on_error = Some(Rc::new(f));
        self
    }
}

impl<E> fmt::Debug for Hooks<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("disable_filter", &self.disable_filter.is_some())
            .field("on_init", &self.on_init.is_some())
            .field("on_in_view", &self.on_in_view.is_some())
            .field("on_animate", &self.on_animate.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnimatorConfig::default();
        assert_eq!(config.target, "[data-animate]");
        assert_eq!(config.animated_class, "js-animated");
        assert_eq!(config.offset().unwrap(), Offset::new(0.5, 0.5));
        assert_eq!(config.delay(), None);
        assert!(config.remove);
        assert!(!config.scrolled);
        assert!(!config.reverse);
        assert!(config.on_load);
        assert!(config.on_scroll);
        assert!(!config.on_resize);
        assert_eq!(config.throttle(), Duration::from_millis(15));
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = AnimatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnimatorConfig::default());
    }

    #[test]
    fn test_offset_shapes() {
        let pair = AnimatorConfig::from_toml_str("offset = [0.2, 0.4]").unwrap();
        assert_eq!(pair.offset().unwrap(), Offset::new(0.2, 0.4));

        let uniform = AnimatorConfig::from_toml_str("offset = 0.3").unwrap();
        assert_eq!(uniform.offset().unwrap(), Offset::uniform(0.3));

        let axes = AnimatorConfig::from_toml_str("offset = \"0.1,0.9\"").unwrap();
        assert_eq!(axes.offset().unwrap(), Offset::new(0.1, 0.9));

        let single = AnimatorConfig::from_toml_str("offset = \"0.7\"").unwrap();
        assert_eq!(single.offset().unwrap(), Offset::uniform(0.7));
    }

    #[test]
    fn test_invalid_offset_rejected() {
        assert!(matches!(
            AnimatorConfig::from_toml_str("offset = \"top\""),
            Err(Error::InvalidOffset(_))
        ));
    }

    #[test]
    fn test_non_finite_offset_rejected() {
        assert!(matches!(
            OffsetSpec::Pair([f64::NAN, 0.5]).resolve(),
            Err(Error::InvalidOffset(_))
        ));
        assert!(matches!(
            OffsetSpec::Uniform(f64::INFINITY).resolve(),
            Err(Error::InvalidOffset(_))
        ));

        let config = AnimatorConfig {
            offset: OffsetSpec::Pair([0.5, f64::NEG_INFINITY]),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidOffset(_))));
    }

    #[test]
    fn test_overrides_merge_over_defaults() {
        let config = AnimatorConfig::from_toml_str(
            r#"
            target = ".reveal"
            delay = 200
            reverse = true
            on_resize = true
            "#,
        )
        .unwrap();
        assert_eq!(config.target, ".reveal");
        assert_eq!(config.delay(), Some(Duration::from_millis(200)));
        assert!(config.reverse);
        assert!(config.on_resize);
        // Untouched keys keep their defaults
        assert_eq!(config.animated_class, "js-animated");
        assert!(config.remove);
    }

    #[test]
    fn test_validate_rejects_empty_target() {
        let config = AnimatorConfig {
            target: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let text = AnimatorConfig::default().to_toml_string().unwrap();
        assert_eq!(AnimatorConfig::from_toml_str(&text).unwrap(), AnimatorConfig::default());
    }
}
