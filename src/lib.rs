//! # mathmode
//!
//! Math regions for a tree-based markup expansion engine. Authors mark spans as inline
//! (`\M{...}`) or display (`\MM{...}`) math; regions may nest arbitrarily, and every
//! outermost region is rendered exactly once, over the raw markup of the whole nested group.
//!
//! ## Quick Start
//!
//! ```rust
//! use mathmode::{parse, expand_document, ExpandConfig};
//!
//! let doc = parse(r"Since \M{a = \M{b}^2}, we get \MM{a \geq 0}.").unwrap();
//! let html = expand_document(&doc, &ExpandConfig::default()).unwrap();
//!
//! assert!(html.contains(r"\(a = b^2\)"));
//! assert!(html.contains("math display"));
//! ```
//!
//! ## Syntax Reference
//!
//! ### Front Matter (TOML)
//!
//! ```text
//! +++
//! title = "My Document"
//!
//! [math]
//! errorColor = "#ff0000"
//! leqno = true
//!
//! [math.macros]
//! R = "\\mathbb{R}"
//! +++
//! ```
//!
//! ### Math regions
//!
//! - Inline: `\M{E = mc^2}`
//! - Display: `\MM{\int_0^1 x dx}`
//! - Prefix and postfix text glued to the formula: `\M[see ]{x}[.]`
//!
//! A region nested in another is not rendered on its own; its markup becomes part of the
//! outer region's markup, and the outer region decides the display mode.
//!
//! ### Scoped options
//!
//! `\mathconfig{errorColor = "#fff", haltOnError = false}{ ... }` applies options to
//! everything inside it.
//!
//! ### Branching on math context
//!
//! `\ifmath{inside}{outside}` and `\ifdisplay{display}{inline}`.
//!
//! ## Errors
//!
//! A formula the backend rejects halts the whole evaluation with [`Error::Halt`] unless
//! `haltOnError` is off, in which case the backend renders it in `errorColor`.
//!
//! ## Features
//!
//! - `mathml`: Enable MathML rendering backend (requires `latex2mathml` crate)

pub mod ast;
pub mod config;
pub mod error;
pub mod expand;
pub mod parser;
pub mod render;

// FFI module (always compiled for cdylib)
pub mod ffi;

// Convenience re-exports
pub use ast::{Document, MathRegion, Node};
pub use config::{MathRenderOptions, PartialMathOptions};
pub use error::{Error, Halt, ParseError, RenderError, Result};
pub use expand::{expand_document, expand_with, Context, ExpandConfig};
pub use parser::parse;
pub use render::{MathBackend, MathRenderer, RenderOptions};

use render::{create_renderer, wrap_standalone, PageConfig};

/// Parse and expand a document in one step.
///
/// # Example
///
/// ```rust
/// use mathmode::render;
///
/// let html = render(r"\M{x^2}", None).unwrap();
/// assert!(html.contains("math inline"));
/// ```
pub fn render(input: &str, config: Option<&ExpandConfig>) -> Result<String> {
    let default_config = ExpandConfig::default();
    let config = config.unwrap_or(&default_config);

    let doc = parse(input)?;
    let renderer = create_renderer(config.math_backend);
    let body = expand_with(&doc, renderer.as_ref(), &config.math)?;

    if !config.standalone {
        return Ok(body);
    }

    let page = PageConfig {
        title: config
            .title
            .clone()
            .or_else(|| doc.metadata.title.clone())
            .unwrap_or_else(|| "Document".to_string()),
        ..Default::default()
    };
    Ok(wrap_standalone(&body, renderer.as_ref(), &page))
}
