//! Standalone HTML page wrapper for expanded output.

use crate::render::math::{escape_html, MathRenderer};

/// Configuration for the page wrapper.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Page title.
    pub title: String,
    /// Additional CSS to include.
    pub custom_css: Option<String>,
    /// CSS class prefix for styling.
    pub class_prefix: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Document".to_string(),
            custom_css: None,
            class_prefix: "mm".to_string(),
        }
    }
}

/// Wrap `body` in a complete HTML document carrying the backend's head content.
pub fn wrap_standalone(body: &str, math: &dyn MathRenderer, config: &PageConfig) -> String {
    let mut output = String::new();

    output.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    output.push_str("<meta charset=\"UTF-8\">\n");
    output.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    output.push_str(&format!("<title>{}</title>\n", escape_html(&config.title)));

    if let Some(head) = math.head_content() {
        output.push_str(&head);
        output.push('\n');
    }

    output.push_str(&default_styles(&config.class_prefix));

    if let Some(ref css) = config.custom_css {
        output.push_str("<style>\n");
        output.push_str(css);
        output.push_str("\n</style>\n");
    }

    output.push_str("</head>\n<body>\n");
    output.push_str(&format!("<article class=\"{}document\">\n", config.class_prefix));
    output.push_str(body);
    output.push_str("\n</article>\n");
    output.push_str("</body>\n</html>");

    output
}

fn default_styles(prefix: &str) -> String {
    format!(
        r#"<style>
.{p}document {{ max-width: 800px; margin: 0 auto; padding: 2em; font-family: Georgia, serif; line-height: 1.6; }}
.{p}document .math.display {{ margin: 1em 0; text-align: center; }}
.{p}document .math.display.fleqn {{ text-align: left; }}
.{p}document .math-error {{ font-family: monospace; white-space: pre-wrap; }}
</style>
"#,
        p = prefix
    )
}
