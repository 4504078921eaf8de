//! Tree expansion: evaluates a document depth-first into text.

mod context;
pub mod math;
pub mod state;

pub use context::{Context, Scope};
pub use state::{InMathMode, MathModeState};

use crate::ast::{Document, Node};
use crate::config::{MathRenderOptions, PartialMathOptions};
use crate::error::Result;
use crate::render::math::{create_renderer, MathBackend, MathRenderer};

/// Configuration for expansion.
#[derive(Debug, Clone, Default)]
pub struct ExpandConfig {
    /// Math rendering backend.
    pub math_backend: MathBackend,
    /// Math options applied before the document's own front matter.
    pub math: PartialMathOptions,
    /// Whether to wrap the output in a complete HTML page.
    pub standalone: bool,
    /// Page title (for standalone mode).
    pub title: Option<String>,
}

/// Expand a document with the backend selected in `config`.
pub fn expand_document(document: &Document, config: &ExpandConfig) -> Result<String> {
    let renderer = create_renderer(config.math_backend);
    expand_with(document, renderer.as_ref(), &config.math)
}

/// Expand a document with an explicit renderer.
///
/// The root options are the defaults, then `base`, then the document's front matter.
/// Evaluation stops at the first render failure.
pub fn expand_with(
    document: &Document,
    renderer: &dyn MathRenderer,
    base: &PartialMathOptions,
) -> Result<String> {
    let options = MathRenderOptions::default()
        .merge(base)
        .merge(&document.metadata.math);
    let mut ctx = Context::new(renderer, options);

    let output = expand_nodes(&mut ctx, &document.nodes)?;
    log::debug!("expanded document with {} math renders", ctx.renders());
    Ok(output)
}

/// Evaluate `nodes` in order and concatenate their text.
pub fn expand_nodes(ctx: &mut Context<'_>, nodes: &[Node]) -> Result<String> {
    let mut output = String::new();
    for node in nodes {
        output.push_str(&expand_node(ctx, node)?);
    }
    Ok(output)
}

/// Evaluate a subtree, then rewrite its text before it is spliced into the parent.
pub fn map_expanded<F>(ctx: &mut Context<'_>, nodes: &[Node], transform: F) -> Result<String>
where
    F: FnOnce(&mut Context<'_>, String) -> Result<String>,
{
    let evaled = expand_nodes(ctx, nodes)?;
    transform(ctx, evaled)
}

pub fn expand_node(ctx: &mut Context<'_>, node: &Node) -> Result<String> {
    match node {
        Node::Text(text) => Ok(text.clone()),
        Node::Fragment(nodes) => expand_nodes(ctx, nodes),
        Node::Math(region) => math::expand_math(ctx, region),
        Node::MathConfig { options, children } => {
            let mut scope = ctx.with_config(options);
            expand_nodes(&mut scope, children)
        }
        Node::IfMath { math, text } => {
            if ctx.is_math_mode() {
                expand_nodes(ctx, math)
            } else {
                expand_nodes(ctx, text)
            }
        }
        Node::IfDisplay { display, inline } => {
            if ctx.is_display_mode() {
                expand_nodes(ctx, display)
            } else {
                expand_nodes(ctx, inline)
            }
        }
    }
}
