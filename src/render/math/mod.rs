//! Math rendering backends.
//!
//! A backend turns one math markup string into output markup. The expansion engine calls it
//! exactly once per outermost math region, with the concatenated markup of the whole nested
//! group.

mod katex;
mod macros;
mod mathml;
mod validate;

pub use self::katex::KaTeXRenderer;
pub use self::macros::expand_macros;
pub use self::mathml::MathMLRenderer;

use crate::config::MathRenderOptions;
use crate::error::{RenderError, Result};

/// Math rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MathBackend {
    /// Output raw LaTeX for KaTeX to render client-side.
    #[default]
    KaTeX,
    /// Convert to MathML for native browser rendering.
    MathML,
    /// Output raw LaTeX for MathJax (same markup as KaTeX, different head content).
    MathJax,
}

/// Options for a single render call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Render as a display (block) formula.
    pub display_mode: bool,
    /// Report invalid markup as an error instead of rendering it in `error_color`.
    pub throw_on_error: bool,
    /// The effective options of the scope the region was evaluated in.
    pub settings: MathRenderOptions,
}

impl RenderOptions {
    /// Options for rendering under `settings`; `throw_on_error` follows `halt_on_error`.
    pub fn new(settings: &MathRenderOptions, display_mode: bool) -> Self {
        Self {
            display_mode,
            throw_on_error: settings.halt_on_error,
            settings: settings.clone(),
        }
    }
}

/// Trait for math renderers.
pub trait MathRenderer {
    /// Render `markup`, failing when it is invalid and `options.throw_on_error` is set.
    fn render(&self, markup: &str, options: &RenderOptions) -> Result<String>;

    /// Get any required HTML head content (scripts, styles).
    fn head_content(&self) -> Option<String>;
}

/// Create a math renderer for the given backend.
pub fn create_renderer(backend: MathBackend) -> Box<dyn MathRenderer> {
    match backend {
        MathBackend::KaTeX => Box::new(KaTeXRenderer::new()),
        MathBackend::MathJax => Box::new(KaTeXRenderer::new_mathjax()),
        MathBackend::MathML => Box::new(MathMLRenderer::new()),
    }
}

/// Expand macros and check the markup against the limits and policies in `settings`.
///
/// Returns the LaTeX that should actually be typeset.
pub(crate) fn prepare(
    markup: &str,
    settings: &MathRenderOptions,
) -> std::result::Result<String, RenderError> {
    let latex = expand_macros(markup, &settings.macros, settings.max_expand)?;
    validate::check_braces(&latex)?;
    validate::check_trust(&latex, &settings.trust)?;
    validate::check_strict(&latex, &settings.strict)?;
    Ok(latex)
}

/// Markup shown in place of a formula the backend could not render.
pub(crate) fn error_markup(markup: &str, error: &RenderError, options: &RenderOptions) -> String {
    format!(
        r#"<span class="math-error" style="color:{}" title="{}">{}</span>"#,
        escape_html(&options.settings.error_color),
        escape_html(&error.to_string()),
        escape_html(markup)
    )
}

/// Space-separated classes for the wrapper element.
pub(crate) fn wrapper_classes(options: &RenderOptions) -> String {
    let mut classes = String::from("math");
    if options.display_mode {
        classes.push_str(" display");
        if options.settings.leqno {
            classes.push_str(" leqno");
        }
        if options.settings.fleqn {
            classes.push_str(" fleqn");
        }
    } else {
        classes.push_str(" inline");
    }
    classes
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
