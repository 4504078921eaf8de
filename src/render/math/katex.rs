//! KaTeX/MathJax passthrough renderer.

use super::{error_markup, escape_html, prepare, wrapper_classes, MathRenderer, RenderOptions};
use crate::error::Result;

/// Renderer that outputs checked LaTeX for client-side rendering.
pub struct KaTeXRenderer {
    use_mathjax: bool,
}

impl KaTeXRenderer {
    /// Create a new KaTeX renderer.
    pub fn new() -> Self {
        Self { use_mathjax: false }
    }

    /// Create a renderer configured for MathJax.
    pub fn new_mathjax() -> Self {
        Self { use_mathjax: true }
    }
}

impl Default for KaTeXRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MathRenderer for KaTeXRenderer {
    fn render(&self, markup: &str, options: &RenderOptions) -> Result<String> {
        let latex = match prepare(markup, &options.settings) {
            Ok(latex) => latex,
            Err(e) if options.throw_on_error => return Err(e.into()),
            Err(e) => return Ok(error_markup(markup, &e, options)),
        };

        Ok(passthrough(&latex, options))
    }

    fn head_content(&self) -> Option<String> {
        if self.use_mathjax {
            Some(MATHJAX_HEAD.to_string())
        } else {
            Some(KATEX_HEAD.to_string())
        }
    }
}

/// Wrap already prepared LaTeX in the delimiters the client-side script looks for.
pub(super) fn passthrough(latex: &str, options: &RenderOptions) -> String {
    let escaped = escape_html(latex);
    let classes = wrapper_classes(options);
    let output = options.settings.output.as_str();

    if options.display_mode {
        format!(
            r#"<div class="{}" data-output="{}">\[{}\]</div>"#,
            classes, output, escaped
        )
    } else {
        format!(
            r#"<span class="{}" data-output="{}">\({}\)</span>"#,
            classes, output, escaped
        )
    }
}

const KATEX_HEAD: &str = r#"<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.css" crossorigin="anonymous">
<script defer src="https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.js" crossorigin="anonymous"></script>
<script defer src="https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/contrib/auto-render.min.js" crossorigin="anonymous"
    onload="renderMathInElement(document.body, {
        delimiters: [
            {left: '\\[', right: '\\]', display: true},
            {left: '\\(', right: '\\)', display: false}
        ]
    });"></script>"#;

const MATHJAX_HEAD: &str = r#"<script>
MathJax = {
    tex: {
        inlineMath: [['\\(', '\\)']],
        displayMath: [['\\[', '\\]']]
    }
};
</script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MathRenderOptions;
    use crate::error::{Error, RenderError};

    fn options(display: bool) -> RenderOptions {
        RenderOptions::new(&MathRenderOptions::default(), display)
    }

    #[test]
    fn test_inline_math() {
        let renderer = KaTeXRenderer::new();
        let result = renderer.render("E = mc^2", &options(false)).unwrap();
        assert!(result.contains("E = mc^2"));
        assert!(result.contains("math inline"));
        assert!(result.contains(r#"data-output="html""#));
    }

    #[test]
    fn test_display_math() {
        let renderer = KaTeXRenderer::new();
        let result = renderer.render("\\int_0^1 x dx", &options(true)).unwrap();
        assert!(result.starts_with("<div"));
        assert!(result.contains("math display"));
    }

    #[test]
    fn test_escaping() {
        let renderer = KaTeXRenderer::new();
        let result = renderer.render("a < b", &options(false)).unwrap();
        assert!(result.contains("&lt;"));
    }

    #[test]
    fn test_invalid_markup_is_an_error() {
        let renderer = KaTeXRenderer::new();
        let err = renderer.render("\\frac{1}{2", &options(false)).unwrap_err();
        assert!(matches!(err, Error::Render(RenderError::Math(_))));
    }

    #[test]
    fn test_invalid_markup_without_throw() {
        let settings = MathRenderOptions {
            halt_on_error: false,
            error_color: "#123456".to_string(),
            ..Default::default()
        };
        let renderer = KaTeXRenderer::new();
        let result = renderer
            .render("\\frac{1}{2", &RenderOptions::new(&settings, false))
            .unwrap();
        assert!(result.contains("math-error"));
        assert!(result.contains("color:#123456"));
    }

    #[test]
    fn test_head_content() {
        assert!(KaTeXRenderer::new().head_content().unwrap().contains("katex"));
        assert!(KaTeXRenderer::new_mathjax()
            .head_content()
            .unwrap()
            .contains("MathJax"));
    }
}
