//! Checks applied to math markup before it is typeset.

use crate::config::{Strictness, Trust};
use crate::error::RenderError;

/// Commands that can emit links, images, or raw HTML attributes.
const TRUST_COMMANDS: &[&str] = &[
    "href",
    "url",
    "includegraphics",
    "htmlClass",
    "htmlId",
    "htmlStyle",
    "htmlData",
];

/// Fail on unbalanced `{`/`}`. Escaped braces do not count.
pub(super) fn check_braces(latex: &str) -> Result<(), RenderError> {
    let mut depth = 0usize;
    let mut chars = latex.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return Err(RenderError::Math("Extra }".to_string()));
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(RenderError::Math("Expected '}', got 'EOF'".to_string()));
    }
    Ok(())
}

/// Fail on the first trust-requiring command that `trust` does not allow.
pub(super) fn check_trust(latex: &str, trust: &Trust) -> Result<(), RenderError> {
    if *trust == Trust::All {
        return Ok(());
    }

    match command_names(latex).find(|name| TRUST_COMMANDS.contains(name) && !trust.allows(name)) {
        Some(name) => Err(RenderError::Untrusted(format!("\\{}", name))),
        None => Ok(()),
    }
}

/// Apply the strict policy to non-ASCII characters in math mode.
///
/// Text inside `\text{...}` is not math mode and is never reported.
pub(super) fn check_strict(latex: &str, strict: &Strictness) -> Result<(), RenderError> {
    let math_only = strip_text_groups(latex);
    let Some(found) = math_only.chars().find(|c| !c.is_ascii()) else {
        return Ok(());
    };

    let message = format!("Unicode text character \"{}\" used in math mode", found);
    match strict {
        Strictness::Ignore => Ok(()),
        Strictness::Warn => {
            log::warn!("{}: {}", message, latex);
            Ok(())
        }
        Strictness::Error => Err(RenderError::Strict(message)),
        Strictness::Other(mode) => {
            log::debug!("strict mode `{}` left to the client renderer: {}", mode, message);
            Ok(())
        }
    }
}

/// Names of all `\command`s in `latex`, without the backslash.
fn command_names(latex: &str) -> impl Iterator<Item = &str> {
    latex.match_indices('\\').filter_map(move |(pos, _)| {
        let rest = &latex[pos + 1..];
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_alphabetic())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    })
}

/// Remove the content of every `\text{...}` group, keeping everything else.
fn strip_text_groups(latex: &str) -> String {
    const TEXT: &str = "\\text{";
    let mut result = String::with_capacity(latex.len());
    let mut remaining = latex;

    while let Some(pos) = remaining.find(TEXT) {
        result.push_str(&remaining[..pos]);
        let body = &remaining[pos + TEXT.len()..];

        let mut depth = 1usize;
        let mut end = body.len();
        let mut chars = body.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = i + 1;
                        break;
                    }
                }
                _ => {}
            }
        }
        remaining = &body[end..];
    }

    result.push_str(remaining);
    result
}
