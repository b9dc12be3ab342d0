//! Browser bindings for scroll-animate
//!
//! Wraps the live DOM in the core `Host`/`Element` traits and exports an
//! `Animate` class with the familiar JavaScript API.

#![cfg(target_arch = "wasm32")]

pub mod animate;
pub mod dom;
pub mod host;
pub mod options;

pub use animate::{init_logging, Animate};
pub use dom::DomElement;
pub use host::{detect_animation_end, BrowserHost};
pub use options::Options;
