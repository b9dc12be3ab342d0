//! The `Animate` class exported to JavaScript
//!
//! ```js
//! import init, { Animate } from "./scroll_animate_web.js";
//!
//! await init();
//! const animate = new Animate({ reverse: true, callbackOnAnimate: (el) => console.log(el) });
//! animate.init();
//! ```

use std::rc::Rc;
use std::sync::Once;

use scroll_animate_core::{Element, ScrollAnimator};
use tracing::error;
use wasm_bindgen::prelude::*;

use crate::host::BrowserHost;
use crate::options::Options;

static LOGGING: Once = Once::new();

/// Route panics and `tracing` output to the browser console
pub fn init_logging() {
    LOGGING.call_once(|| {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&JsValue::from_str(&err.to_string()));
        }
    });
}

fn to_js(err: scroll_animate_core::Error) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

#[wasm_bindgen]
pub struct Animate {
    animator: ScrollAnimator<BrowserHost>,
}

#[wasm_bindgen]
impl Animate {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<Animate, JsValue> {
        init_logging();

        let Options {
            config,
            hooks,
            problems,
        } = Options::from_js(&options);
        for problem in &problems {
            error!(error = %problem, "Ignoring option");
        }

        let host = Rc::new(BrowserHost::new().map_err(to_js)?);
        let animator = ScrollAnimator::new(host, config, hooks).map_err(to_js)?;
        Ok(Self { animator })
    }

    pub fn init(&self) {
        self.animator.init();
    }

    pub fn kill(&self) {
        self.animator.kill();
    }

    pub fn render(&self, initial: Option<bool>) {
        self.animator.render(initial.unwrap_or(false));
    }

    #[wasm_bindgen(js_name = addEventListeners)]
    pub fn add_event_listeners(&self) {
        self.animator.add_event_listeners();
    }

    #[wasm_bindgen(js_name = removeEventListeners)]
    pub fn remove_event_listeners(&self) {
        self.animator.remove_event_listeners();
    }

    /// Tracked elements whose animation has completed
    #[wasm_bindgen(js_name = getAnimatedElements)]
    pub fn get_animated_elements(&self) -> js_sys::Array {
        self.animator
            .animated_elements()
            .into_iter()
            .map(|el| JsValue::from(el.into_inner()))
            .collect()
    }

    #[wasm_bindgen(getter)]
    pub fn initialised(&self) -> bool {
        self.animator.is_initialised()
    }

    /// Number of tracked elements
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.animator.elements().len()
    }

    /// Labels of tracked elements, e.g. `div#hero`
    #[wasm_bindgen(js_name = describeElements)]
    pub fn describe_elements(&self) -> Vec<String> {
        self.animator.elements().iter().map(Element::describe).collect()
    }
}
