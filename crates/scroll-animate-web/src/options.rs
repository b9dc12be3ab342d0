//! Reading the JS options object
//!
//! Keys follow the JavaScript API (`animatedClass`, `onScroll`,
//! `callbackOnInView`, ...). Missing keys keep their defaults. Values of the
//! wrong type are collected as problems and ignored.

use js_sys::{Array, Function, Reflect};
use scroll_animate_core::{AnimatorConfig, Error, Hooks, OffsetSpec};
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};

use crate::dom::DomElement;

/// Configuration and hooks read from a JS object
pub struct Options {
    pub config: AnimatorConfig,
    pub hooks: Hooks<DomElement>,
    /// Ignored values, reported by the caller
    pub problems: Vec<Error>,
}

impl Options {
    pub fn from_js(value: &JsValue) -> Self {
        let mut reader = Reader {
            source: value,
            problems: Vec::new(),
        };
        let mut config = AnimatorConfig::default();
        let mut hooks = Hooks::default();

        if !value.is_object() {
            if !(value.is_undefined() || value.is_null()) {
                reader
                    .problems
                    .push(Error::Config("options must be an object".to_string()));
            }
            return Self {
                config,
                hooks,
                problems: reader.problems,
            };
        }

        if let Some(target) = reader.string("target") {
            config.target = target;
        }
        if let Some(class) = reader.string("animatedClass") {
            config.animated_class = class;
        }
        if let Some(offset) = reader.offset("offset") {
            config.offset = offset;
        }
        if let Some(delay) = reader.number("delay") {
            config.delay_ms = delay.max(0.0) as u64;
        }
        if let Some(throttle) = reader.number("throttle") {
            config.throttle_ms = throttle.max(0.0) as u64;
        }
        for (key, flag) in [
            ("remove", &mut config.remove),
            ("scrolled", &mut config.scrolled),
            ("reverse", &mut config.reverse),
            ("onLoad", &mut config.on_load),
            ("onScroll", &mut config.on_scroll),
            ("onResize", &mut config.on_resize),
        ] {
            if let Some(value) = reader.bool(key) {
                *flag = value;
            }
        }

        if let Some(f) = reader.function("disableFilter") {
            hooks = hooks.disable_filter(move || match f.call0(&JsValue::NULL) {
                Ok(result) => result.as_bool() == Some(true),
                Err(err) => {
                    warn!(error = ?err, "disableFilter threw");
                    false
                }
            });
        }
        if let Some(f) = reader.function("callbackOnInit") {
            hooks = hooks.on_init(move || {
                if let Err(err) = f.call0(&JsValue::NULL) {
                    warn!(error = ?err, "callbackOnInit threw");
                }
            });
        }
        if let Some(f) = reader.function("callbackOnInView") {
            hooks = hooks.on_in_view(move |el: &DomElement| {
                if let Err(err) = f.call1(&JsValue::NULL, el.as_element()) {
                    warn!(error = ?err, "callbackOnInView threw");
                }
            });
        }
        if let Some(f) = reader.function("callbackOnAnimate") {
            hooks = hooks.on_animate(move |el: &DomElement| {
                if let Err(err) = f.call1(&JsValue::NULL, el.as_element()) {
                    warn!(error = ?err, "callbackOnAnimate threw");
                }
            });
        }

        Self {
            config,
            hooks,
            problems: reader.problems,
        }
    }
}

struct Reader<'a> {
    source: &'a JsValue,
    problems: Vec<Error>,
}

impl Reader<'_> {
    /// Present, non-null value for `key`
    fn get(&self, key: &str) -> Option<JsValue> {
        Reflect::get(self.source, &JsValue::from_str(key))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
    }

    fn wrong_type(&mut self, key: &str, expected: &str) {
        self.problems
            .push(Error::Config(format!("option '{}' must be {}", key, expected)));
    }

    fn string(&mut self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        let string = value.as_string();
        if string.is_none() {
            self.wrong_type(key, "a string");
        }
        string
    }

    fn number(&mut self, key: &str) -> Option<f64> {
        let value = self.get(key)?;
        let number = value.as_f64();
        if number.is_none() {
            self.wrong_type(key, "a number");
        }
        number
    }

    fn bool(&mut self, key: &str) -> Option<bool> {
        let value = self.get(key)?;
        let flag = value.as_bool();
        if flag.is_none() {
            self.wrong_type(key, "a boolean");
        }
        flag
    }

    /// `[v, h]`, a single number, or a `"v,h"` string
    fn offset(&mut self, key: &str) -> Option<OffsetSpec> {
        let value = self.get(key)?;

        if let Some(raw) = value.as_string() {
            return Some(OffsetSpec::Axes(raw));
        }
        if let Some(uniform) = value.as_f64() {
            return Some(OffsetSpec::Uniform(uniform));
        }
        if Array::is_array(&value) {
            let values: Vec<Option<f64>> = Array::from(&value).iter().map(|v| v.as_f64()).collect();
            match values.as_slice() {
                [Some(vertical), Some(horizontal)] => {
                    return Some(OffsetSpec::Pair([*vertical, *horizontal]))
                }
                [Some(both)] => return Some(OffsetSpec::Uniform(*both)),
                _ => {}
            }
        }

        self.wrong_type(key, "a number, a [vertical, horizontal] pair or a \"v,h\" string");
        None
    }

    /// Callable value for `key`; anything else is reported and skipped
    fn function(&mut self, key: &str) -> Option<Function> {
        let value = self.get(key)?;
        match value.dyn_into::<Function>() {
            Ok(f) => Some(f),
            Err(_) => {
                self.problems.push(Error::CallbackNotCallable(key.to_string()));
                None
            }
        }
    }
}
