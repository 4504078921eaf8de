//! MathML renderer.

use super::{error_markup, prepare, MathRenderer, RenderOptions};
use crate::error::Result;

/// Renderer that converts LaTeX to MathML.
///
/// Without the `mathml` feature this emits the same passthrough markup as
/// [`KaTeXRenderer`](super::KaTeXRenderer).
pub struct MathMLRenderer {
    #[cfg(feature = "mathml")]
    _phantom: std::marker::PhantomData<()>,
}

impl MathMLRenderer {
    /// Create a new MathML renderer.
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "mathml")]
            _phantom: std::marker::PhantomData,
        }
    }
}

impl Default for MathMLRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MathRenderer for MathMLRenderer {
    fn render(&self, markup: &str, options: &RenderOptions) -> Result<String> {
        let latex = match prepare(markup, &options.settings) {
            Ok(latex) => latex,
            Err(e) if options.throw_on_error => return Err(e.into()),
            Err(e) => return Ok(error_markup(markup, &e, options)),
        };

        #[cfg(feature = "mathml")]
        {
            use crate::error::RenderError;
            use latex2mathml::{latex_to_mathml, DisplayStyle};

            let style = if options.display_mode {
                DisplayStyle::Block
            } else {
                DisplayStyle::Inline
            };

            match latex_to_mathml(&latex, style) {
                Ok(mathml) if options.display_mode => Ok(format!(
                    r#"<div class="{}">{}</div>"#,
                    super::wrapper_classes(options),
                    mathml
                )),
                Ok(mathml) => Ok(mathml),
                Err(e) => {
                    let error = RenderError::Math(e.to_string());
                    if options.throw_on_error {
                        Err(error.into())
                    } else {
                        Ok(error_markup(markup, &error, options))
                    }
                }
            }
        }

        #[cfg(not(feature = "mathml"))]
        {
            Ok(super::katex::passthrough(&latex, options))
        }
    }

    fn head_content(&self) -> Option<String> {
        Some(MATHML_STYLES.to_string())
    }
}

const MATHML_STYLES: &str = r#"<style>
.math-error {
    font-family: monospace;
}
math {
    font-size: 1.1em;
}
</style>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MathRenderOptions;

    #[test]
    fn test_mathml_inline() {
        let renderer = MathMLRenderer::new();
        let options = RenderOptions::new(&MathRenderOptions::default(), false);
        let result = renderer.render("x^2", &options).unwrap();
        // Should produce some output regardless of feature
        assert!(!result.is_empty());
    }

    #[test]
    fn test_mathml_rejects_unbalanced() {
        let renderer = MathMLRenderer::new();
        let options = RenderOptions::new(&MathRenderOptions::default(), true);
        assert!(renderer.render("{x", &options).is_err());
    }
}
