//! `web_sys::Element` behind the core element trait

use scroll_animate_core::{Element, Rect};
use wasm_bindgen::JsValue;

/// Live DOM element handle
#[derive(Debug, Clone, PartialEq)]
pub struct DomElement(web_sys::Element);

impl DomElement {
    pub fn new(el: web_sys::Element) -> Self {
        Self(el)
    }

    pub fn as_element(&self) -> &web_sys::Element {
        &self.0
    }

    pub fn into_inner(self) -> web_sys::Element {
        self.0
    }

    pub(crate) fn is(&self, other: &JsValue) -> bool {
        let this: &JsValue = self.0.as_ref();
        this == other
    }
}

impl From<web_sys::Element> for DomElement {
    fn from(el: web_sys::Element) -> Self {
        Self(el)
    }
}

impl Element for DomElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Err(err) = self.0.set_attribute(name, value) {
            tracing::warn!(attribute = name, error = ?err, "setAttribute failed");
        }
    }

    fn remove_attribute(&self, name: &str) {
        if let Err(err) = self.0.remove_attribute(name) {
            tracing::warn!(attribute = name, error = ?err, "removeAttribute failed");
        }
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.0.has_attribute(name)
    }

    fn add_class(&self, class: &str) {
        if let Err(err) = self.0.class_list().add_1(class) {
            tracing::warn!(class, error = ?err, "classList.add failed");
        }
    }

    fn remove_class(&self, class: &str) {
        if let Err(err) = self.0.class_list().remove_1(class) {
            tracing::warn!(class, error = ?err, "classList.remove failed");
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn bounding_rect(&self) -> Rect {
        let rect = self.0.get_bounding_client_rect();
        Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
    }

    fn describe(&self) -> String {
        let tag = self.0.tag_name().to_ascii_lowercase();
        let id = self.0.id();
        if id.is_empty() {
            tag
        } else {
            format!("{}#{}", tag, id)
        }
    }
}
