use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::dom::Element;
use crate::geometry::{Rect, ScrollPosition};

/// Window state shared by a headless host and its elements
#[derive(Debug, Default)]
pub(crate) struct WindowState {
    pub scroll: Cell<ScrollPosition>,
}

#[derive(Debug)]
struct Node {
    tag: String,
    attributes: RefCell<BTreeMap<String, String>>,
    classes: RefCell<Vec<String>>,
    /// Layout box in document coordinates
    rect: Cell<Rect>,
    window: RefCell<Weak<WindowState>>,
}

/// In-memory element with attributes, a class list and a layout box
///
/// Clones share the same node, like two references to one DOM element.
#[derive(Clone)]
pub struct HeadlessElement {
    node: Rc<Node>,
}

impl HeadlessElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            node: Rc::new(Node {
                tag: tag.into().to_ascii_lowercase(),
                attributes: RefCell::new(BTreeMap::new()),
                classes: RefCell::new(Vec::new()),
                rect: Cell::new(Rect::default()),
                window: RefCell::new(Weak::new()),
            }),
        }
    }

    pub fn with_id(self, id: &str) -> Self {
        self.set_attribute("id", id);
        self
    }

    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Layout box in document coordinates
    pub fn with_rect(self, rect: Rect) -> Self {
        self.set_rect(rect);
        self
    }

    pub fn set_rect(&self, rect: Rect) {
        self.node.rect.set(rect);
    }

    pub fn document_rect(&self) -> Rect {
        self.node.rect.get()
    }

    pub fn tag(&self) -> &str {
        &self.node.tag
    }

    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    pub fn classes(&self) -> Vec<String> {
        self.node.classes.borrow().clone()
    }

    pub fn attributes(&self) -> BTreeMap<String, String> {
        self.node.attributes.borrow().clone()
    }

    pub(crate) fn attach(&self, window: &Rc<WindowState>) {
        *self.node.window.borrow_mut() = Rc::downgrade(window);
    }

    pub(crate) fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl Element for HeadlessElement {
    fn attribute(&self, name: &str) -> Option<String> {
        if name == "class" {
            let classes = self.node.classes.borrow();
            return (!classes.is_empty()).then(|| classes.join(" "));
        }
        self.node.attributes.borrow().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if name == "class" {
            *self.node.classes.borrow_mut() = Vec::new();
            for class in value.split_whitespace() {
                self.add_class(class);
            }
            return;
        }
        self.node
            .attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) {
        if name == "class" {
            self.node.classes.borrow_mut().clear();
            return;
        }
        self.node.attributes.borrow_mut().remove(name);
    }

    fn add_class(&self, class: &str) {
        let mut classes = self.node.classes.borrow_mut();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.node.classes.borrow_mut().retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.node.classes.borrow().iter().any(|c| c == class)
    }

    fn bounding_rect(&self) -> Rect {
        let scroll = self
            .node
            .window
            .borrow()
            .upgrade()
            .map(|w| w.scroll.get())
            .unwrap_or_default();
        self.node.rect.get().translated(scroll.x, scroll.y)
    }

    fn describe(&self) -> String {
        match self.id() {
            Some(id) => format!("{}#{}", self.node.tag, id),
            None => self.node.tag.clone(),
        }
    }
}

impl PartialEq for HeadlessElement {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl fmt::Debug for HeadlessElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessElement")
            .field("tag", &self.node.tag)
            .field("attributes", &self.node.attributes.borrow())
            .field("classes", &self.node.classes.borrow())
            .field("rect", &self.node.rect.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_list_is_a_set() {
        let el = HeadlessElement::new("div");
        el.add_class("a");
        el.add_class("a");
        el.add_class("b");
        assert_eq!(el.classes(), vec!["a", "b"]);
        el.remove_class("a");
        assert_eq!(el.classes(), vec!["b"]);
        assert_eq!(el.attribute("class").as_deref(), Some("b"));
    }

    #[test]
    fn test_class_attribute_replaces_list() {
        let el = HeadlessElement::new("div").with_class("old");
        el.set_attribute("class", "x  y");
        assert_eq!(el.classes(), vec!["x", "y"]);
    }

    #[test]
    fn test_clones_share_the_node() {
        let el = HeadlessElement::new("section").with_id("hero");
        let other = el.clone();
        other.set_attribute("data-visibility", "true");
        assert_eq!(el.attribute("data-visibility").as_deref(), Some("true"));
        assert_eq!(el, other);
        assert_ne!(el, HeadlessElement::new("section"));
        assert_eq!(el.describe(), "section#hero");
    }

    #[test]
    fn test_detached_rect_is_document_rect() {
        let el = HeadlessElement::new("div").with_rect(Rect::new(5.0, 500.0, 10.0, 10.0));
        assert_eq!(el.bounding_rect(), Rect::new(5.0, 500.0, 10.0, 10.0));
    }
}
