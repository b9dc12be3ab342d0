//! Scripted scroll scenes replayed against the headless host
//!
//! A scene describes a page (viewport, elements with layout boxes and data
//! attributes), the animator options, and a list of steps to replay.
//!
//! ```toml
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [animator]
//! reverse = true
//!
//! [[elements]]
//! id = "hero"
//! rect = { x = 0, y = 1200, width = 600, height = 300 }
//! attributes = { "data-animate" = "", "data-animation-classes" = "fade-in" }
//!
//! [[steps]]
//! action = "scroll_to"
//! y = 900
//!
//! [[steps]]
//! action = "finish_animations"
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::animator::ScrollAnimator;
use crate::config::{AnimatorConfig, Hooks};
use crate::dom::{
    animation_classes, delay_override, offset_override, Element, ATTR_ANIMATED, ATTR_CLASSES,
    ATTR_DELAY, ATTR_OFFSET, ATTR_VISIBILITY,
};
use crate::error::Error;
use crate::geometry::{Rect, ScrollPosition, Viewport};
use crate::headless::{HeadlessElement, HeadlessHost, Selector};
use crate::host::Host;
use crate::state::ElementState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub viewport: Viewport,
    /// Scroll position when the page is opened
    #[serde(default)]
    pub scroll: ScrollPosition,
    /// Whether the document has already loaded when the animator starts
    #[serde(default = "default_true")]
    pub ready: bool,
    #[serde(default = "default_true")]
    pub animations_supported: bool,
    /// Call `init()` before the first step
    #[serde(default = "default_true")]
    pub auto_init: bool,
    #[serde(default)]
    pub animator: AnimatorConfig,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Layout box in document coordinates
    pub rect: Rect,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Init,
    Kill,
    /// Fire the document load event
    Load,
    ScrollTo {
        #[serde(default)]
        x: f64,
        y: f64,
    },
    Resize {
        width: f64,
        height: f64,
    },
    Wait {
        ms: u64,
    },
    /// Deliver animation-end to every element waiting for it
    FinishAnimations,
    Render {
        #[serde(default)]
        initial: bool,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Kill => write!(f, "kill"),
            Self::Load => write!(f, "load"),
            Self::ScrollTo { x, y } => write!(f, "scroll to ({}, {})", x, y),
            Self::Resize { width, height } => write!(f, "resize to {}x{}", width, height),
            Self::Wait { ms } => write!(f, "wait {}ms", ms),
            Self::FinishAnimations => write!(f, "finish animations"),
            Self::Render { initial } => write!(f, "render (initial: {})", initial),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tag() -> String {
    "div".to_string()
}

/// Element state captured after a step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSnapshot {
    pub id: String,
    pub state: ElementState,
    pub classes: Vec<String>,
    pub visibility: Option<String>,
    pub animated: Option<String>,
}

impl ElementSnapshot {
    fn capture(el: &HeadlessElement) -> Self {
        Self {
            id: el.id().unwrap_or_else(|| el.describe()),
            state: ElementState::of(el),
            classes: el.classes(),
            visibility: el.attribute(ATTR_VISIBILITY),
            animated: el.attribute(ATTR_ANIMATED),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub step: String,
    pub time_ms: u64,
    pub scroll_y: f64,
    pub elements: Vec<ElementSnapshot>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationReport {
    pub frames: Vec<Frame>,
    /// Configuration errors reported while replaying
    pub errors: Vec<String>,
    pub in_view_events: usize,
    pub animate_events: usize,
}

impl SimulationReport {
    pub fn final_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// State of an element after the last step
    pub fn final_state(&self, id: &str) -> Option<&ElementSnapshot> {
        self.final_frame()?.elements.iter().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Markup problem found by [`Scene::check`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lint {
    pub severity: Severity,
    pub element: Option<String>,
    pub message: String,
}

impl Scene {
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let scene: Self = toml::from_str(content)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> crate::Result<()> {
        let mut seen = std::collections::HashSet::new();
        for spec in &self.elements {
            if spec.id.trim().is_empty() {
                return Err(Error::Scene("element with empty id".to_string()));
            }
            if !seen.insert(spec.id.as_str()) {
                return Err(Error::Scene(format!("duplicate element id '{}'", spec.id)));
            }
        }
        Ok(())
    }

    /// Build the page described by the scene
    pub fn build_host(&self) -> HeadlessHost {
        let host = HeadlessHost::new().with_viewport(self.viewport.width, self.viewport.height);
        if !self.ready {
            host.set_ready(false);
        }
        host.set_animation_support(self.animations_supported);
        host.set_scroll(self.scroll.x, self.scroll.y);

        for spec in &self.elements {
            let mut el = HeadlessElement::new(spec.tag.as_str())
                .with_id(&spec.id)
                .with_rect(spec.rect);
            for class in &spec.classes {
                el = el.with_class(class);
            }
            for (name, value) in &spec.attributes {
                el = el.with_attribute(name, value);
            }
            host.append(el);
        }
        host
    }

    /// Replay every step, capturing element states after each one
    pub fn run(&self) -> crate::Result<SimulationReport> {
        let host = Rc::new(self.build_host());

        let errors = Rc::new(RefCell::new(Vec::new()));
        let in_view = Rc::new(Cell::new(0usize));
        let animated = Rc::new(Cell::new(0usize));

        let hooks = {
            let errors = errors.clone();
            let in_view = in_view.clone();
            let animated = animated.clone();
            Hooks::default()
                .on_error(move |err| errors.borrow_mut().push(err.to_string()))
                .on_in_view(move |_| in_view.set(in_view.get() + 1))
                .on_animate(move |_| animated.set(animated.get() + 1))
        };

        let animator = ScrollAnimator::new(host.clone(), self.animator.clone(), hooks)?;
        info!(
            elements = animator.elements().len(),
            steps = self.steps.len(),
            "Replaying scene"
        );

        let mut frames = Vec::with_capacity(self.steps.len() + 1);
        if self.auto_init {
            animator.init();
            frames.push(capture(&host, "init".to_string()));
        }

        for step in &self.steps {
            debug!(%step, "Scene step");
            match step {
                Step::Init => animator.init(),
                Step::Kill => animator.kill(),
                Step::Load => host.load(),
                Step::ScrollTo { x, y } => host.scroll_to(*x, *y),
                Step::Resize { width, height } => host.resize(*width, *height),
                Step::Wait { ms } => host.advance(Duration::from_millis(*ms)),
                Step::FinishAnimations => {
                    host.end_all_animations();
                }
                Step::Render { initial } => animator.render(*initial),
            }
            frames.push(capture(&host, step.to_string()));
        }

        drop(animator);

        let errors = errors.borrow().clone();
        Ok(SimulationReport {
            frames,
            errors,
            in_view_events: in_view.get(),
            animate_events: animated.get(),
        })
    }

    /// Lint the scene's markup without running it
    pub fn check(&self) -> Vec<Lint> {
        let mut lints = Vec::new();
        let host = self.build_host();

        if let Err(err) = self.animator.validate() {
            lints.push(Lint {
                severity: Severity::Error,
                element: None,
                message: err.to_string(),
            });
            return lints;
        }

        let targets = match host.query_all(&self.animator.target) {
            Ok(targets) => targets,
            Err(err) => {
                lints.push(Lint {
                    severity: Severity::Error,
                    element: None,
                    message: err.to_string(),
                });
                return lints;
            }
        };

        if targets.is_empty() {
            lints.push(Lint {
                severity: Severity::Warning,
                element: None,
                message: format!("selector '{}' matches no elements", self.animator.target),
            });
        }

        for el in &targets {
            let label = Some(el.describe());
            if animation_classes(el).is_none() {
                lints.push(Lint {
                    severity: Severity::Error,
                    element: label.clone(),
                    message: format!("missing or empty {}", ATTR_CLASSES),
                });
            }
            if let Err(err) = offset_override(el) {
                lints.push(Lint {
                    severity: Severity::Error,
                    element: label.clone(),
                    message: format!("{}: {}", ATTR_OFFSET, err),
                });
            }
            if let Err(err) = delay_override(el) {
                lints.push(Lint {
                    severity: Severity::Error,
                    element: label.clone(),
                    message: format!("{}: {}", ATTR_DELAY, err),
                });
            }
        }

        // Animation markup on elements the selector will never pick up
        if let Ok(selector) = Selector::parse(&self.animator.target) {
            for el in host.all_elements() {
                if el.has_attribute(ATTR_CLASSES) && !selector.matches(&el) {
                    lints.push(Lint {
                        severity: Severity::Warning,
                        element: Some(el.describe()),
                        message: format!(
                            "has {} but is not matched by '{}'",
                            ATTR_CLASSES, self.animator.target
                        ),
                    });
                }
            }
        }

        lints
    }
}

fn capture(host: &HeadlessHost, step: String) -> Frame {
    Frame {
        step,
        time_ms: host.now().as_millis() as u64,
        scroll_y: host.scroll_position().y,
        elements: host.all_elements().iter().map(ElementSnapshot::capture).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
        [viewport]
        width = 1000
        height = 800

        [animator]
        reverse = true

        [[elements]]
        id = "top"
        rect = { x = 0, y = 100, width = 400, height = 200 }
        attributes = { "data-animate" = "", "data-animation-classes" = "fade-in" }

        [[elements]]
        id = "below"
        rect = { x = 0, y = 2000, width = 400, height = 200 }
        attributes = { "data-animate" = "", "data-animation-classes" = "slide-up" }

        [[steps]]
        action = "finish_animations"

        [[steps]]
        action = "scroll_to"
        y = 1600

        [[steps]]
        action = "wait"
        ms = 20

        [[steps]]
        action = "finish_animations"
    "#;

    #[test]
    fn test_parse_scene() {
        let scene = Scene::from_toml_str(SCENE).unwrap();
        assert_eq!(scene.elements.len(), 2);
        assert_eq!(scene.steps[1], Step::ScrollTo { x: 0.0, y: 1600.0 });
        assert!(scene.animator.reverse);
        assert!(scene.ready);
    }

    #[test]
    fn test_run_scene() {
        let report = Scene::from_toml_str(SCENE).unwrap().run().unwrap();

        // init + four steps
        assert_eq!(report.frames.len(), 5);

        let init = &report.frames[0];
        assert_eq!(init.elements[0].state, ElementState::Entering);
        assert_eq!(init.elements[0].classes, vec!["fade-in"]);
        assert_eq!(init.elements[1].state, ElementState::Idle);

        let below = report.final_state("below").unwrap();
        assert_eq!(below.state, ElementState::Animated);
        assert_eq!(below.classes, vec!["js-animated"]);

        // Scrolled away with reverse on
        let top = report.final_state("top").unwrap();
        assert_eq!(top.state, ElementState::Idle);
        assert!(top.classes.is_empty());

        assert_eq!(report.in_view_events, 2);
        assert_eq!(report.animate_events, 2);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_landing_demo() {
        let scene = Scene::from_toml_str(include_str!("../../../demos/landing.toml")).unwrap();
        let report = scene.run().unwrap();
        assert!(report.errors.is_empty());

        let banner = report.final_state("banner").unwrap();
        assert_eq!(banner.state, ElementState::Animated);
        assert_eq!(banner.classes, vec!["zoom-in", "bounce", "js-animated"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let scene = r#"
            [[elements]]
            id = "a"
            rect = { x = 0, y = 0, width = 1, height = 1 }

            [[elements]]
            id = "a"
            rect = { x = 0, y = 0, width = 1, height = 1 }
        "#;
        assert!(matches!(Scene::from_toml_str(scene), Err(Error::Scene(_))));
    }

    #[test]
    fn test_check_reports_markup_problems() {
        let scene = Scene::from_toml_str(
            r#"
            [[elements]]
            id = "no-classes"
            rect = { x = 0, y = 0, width = 10, height = 10 }
            attributes = { "data-animate" = "" }

            [[elements]]
            id = "bad-offset"
            rect = { x = 0, y = 0, width = 10, height = 10 }
            attributes = { "data-animate" = "", "data-animation-classes" = "a", "data-animation-offset" = "x" }

            [[elements]]
            id = "untracked"
            rect = { x = 0, y = 0, width = 10, height = 10 }
            attributes = { "data-animation-classes" = "a" }
            "#,
        )
        .unwrap();

        let lints = scene.check();
        assert_eq!(lints.len(), 3);
        assert!(lints.iter().any(|l| l.element.as_deref() == Some("div#no-classes")
            && l.severity == Severity::Error));
        assert!(lints.iter().any(|l| l.element.as_deref() == Some("div#bad-offset")));
        assert!(lints.iter().any(|l| l.element.as_deref() == Some("div#untracked")
            && l.severity == Severity::Warning));
    }

    #[test]
    fn test_check_warns_on_empty_match() {
        let scene = Scene::from_toml_str("[animator]\ntarget = \".nothing\"").unwrap();
        let lints = scene.check();
        assert_eq!(lints.len(), 1);
        assert_eq!(lints[0].severity, Severity::Warning);
    }
}
