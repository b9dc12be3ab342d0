pub mod animator;
pub mod config;
pub mod debounce;
pub mod dom;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod scene;
pub mod state;

pub use animator::ScrollAnimator;
pub use config::{AnimatorConfig, Hooks, OffsetSpec};
pub use debounce::{Debounced, Edge};
pub use dom::Element;
pub use error::{Error, Result};
pub use geometry::{Offset, Rect, ScrollPosition, Viewport};
pub use headless::{HeadlessElement, HeadlessHost};
pub use host::{Host, HostEvent, Timers};
pub use scene::{Scene, SimulationReport};
pub use state::ElementState;
