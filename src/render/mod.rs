//! Rendering layer: math backends and the HTML page wrapper.

pub mod html;
pub mod math;

pub use html::{wrap_standalone, PageConfig};
pub use math::{create_renderer, MathBackend, MathRenderer, RenderOptions};
