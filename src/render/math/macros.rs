//! Expansion of user-defined LaTeX macros from the `macros` option.

use crate::error::RenderError;
use std::collections::BTreeMap;

/// A macro definition.
#[derive(Debug, Clone, PartialEq)]
struct Macro {
    /// Number of arguments (0 for simple substitution)
    arg_count: usize,
    /// Replacement template (use #1, #2, etc. for args)
    template: String,
}

/// Expand every macro in `content`, performing at most `max_expand` substitutions.
///
/// Names may be given with or without their leading backslash. Expansion repeats until the
/// content stops changing so macros may refer to each other.
pub fn expand_macros(
    content: &str,
    macros: &BTreeMap<String, String>,
    max_expand: usize,
) -> Result<String, RenderError> {
    if macros.is_empty() {
        return Ok(content.to_string());
    }

    let defs: Vec<(&str, Macro)> = macros
        .iter()
        .map(|(name, template)| {
            let def = Macro {
                arg_count: count_macro_args(template),
                template: template.clone(),
            };
            (name.trim_start_matches('\\'), def)
        })
        .collect();

    let mut result = content.to_string();
    let mut expansions = 0usize;

    loop {
        let mut changed = false;

        for (name, def) in &defs {
            let (expanded, count) = expand_single_macro(&result, name, def);
            if count > 0 {
                expansions += count;
                if expansions > max_expand {
                    return Err(RenderError::TooManyExpansions(max_expand));
                }
                result = expanded;
                changed = true;
            }
        }

        if !changed {
            return Ok(result);
        }
    }
}

fn expand_single_macro(content: &str, name: &str, def: &Macro) -> (String, usize) {
    let pattern = format!("\\{}", name);
    let mut result = String::new();
    let mut remaining = content;
    let mut count = 0;

    while let Some(pos) = remaining.find(&pattern) {
        result.push_str(&remaining[..pos]);

        let after_name = &remaining[pos + pattern.len()..];

        // `\R` must not match the start of `\Rightarrow`
        let continues_name = name.chars().all(|c| c.is_ascii_alphabetic())
            && after_name.starts_with(|c: char| c.is_ascii_alphabetic());
        if continues_name {
            result.push_str(&pattern);
            remaining = after_name;
            continue;
        }

        if def.arg_count == 0 {
            result.push_str(&def.template);
            remaining = after_name;
            count += 1;
        } else {
            match parse_macro_args(after_name, def.arg_count) {
                Some((args, rest)) => {
                    result.push_str(&substitute_args(&def.template, &args));
                    remaining = rest;
                    count += 1;
                }
                None => {
                    // Failed to parse args, keep original
                    result.push_str(&pattern);
                    remaining = after_name;
                }
            }
        }
    }

    result.push_str(remaining);
    (result, count)
}

fn parse_macro_args(input: &str, count: usize) -> Option<(Vec<String>, &str)> {
    let mut args = Vec::new();
    let mut remaining = input;

    for _ in 0..count {
        remaining = remaining.trim_start();

        if !remaining.starts_with('{') {
            return None;
        }

        // Find matching closing brace
        let mut depth = 0;
        let mut end = None;

        for (i, c) in remaining.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }

        let end = end?;
        args.push(remaining[1..end].to_string());
        remaining = &remaining[end + 1..];
    }

    Some((args, remaining))
}

fn substitute_args(template: &str, args: &[String]) -> String {
    let mut result = template.to_string();

    for (i, arg) in args.iter().enumerate() {
        let placeholder = format!("#{}", i + 1);
        result = result.replace(&placeholder, arg);
    }

    result
}

/// Count the number of macro arguments (#1, #2, etc.) in a template.
fn count_macro_args(template: &str) -> usize {
    let mut max_arg = 0;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '#' {
            if let Some(n) = chars.peek().and_then(|d| d.to_digit(10)) {
                max_arg = max_arg.max(n as usize);
            }
        }
    }

    max_arg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn macros(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_expand_simple_macro() {
        let defs = macros(&[("R", "\\mathbb{R}")]);
        let result = expand_macros("x \\in \\R", &defs, 1000).unwrap();
        assert_eq!(result, "x \\in \\mathbb{R}");
    }

    #[test]
    fn test_name_with_backslash() {
        let defs = macros(&[("\\RR", "\\mathbb{R}")]);
        let result = expand_macros("\\RR^n", &defs, 1000).unwrap();
        assert_eq!(result, "\\mathbb{R}^n");
    }

    #[test]
    fn test_does_not_match_longer_command() {
        let defs = macros(&[("R", "\\mathbb{R}")]);
        let result = expand_macros("a \\Rightarrow b", &defs, 1000).unwrap();
        assert_eq!(result, "a \\Rightarrow b");
    }

    #[test]
    fn test_expand_macro_with_args() {
        let defs = macros(&[("vec", "\\mathbf{#1}")]);
        let result = expand_macros("\\vec{x} + \\vec{y}", &defs, 1000).unwrap();
        assert_eq!(result, "\\mathbf{x} + \\mathbf{y}");
    }

    #[test]
    fn test_nested_definitions() {
        let defs = macros(&[("RR", "\\R"), ("R", "\\mathbb{R}")]);
        let result = expand_macros("\\RR", &defs, 1000).unwrap();
        assert_eq!(result, "\\mathbb{R}");
    }

    #[test]
    fn test_recursive_macro_hits_limit() {
        let defs = macros(&[("loop", "\\loop")]);
        let err = expand_macros("\\loop", &defs, 50).unwrap_err();
        assert!(matches!(err, RenderError::TooManyExpansions(50)));
    }

    #[test]
    fn test_parse_macro_args() {
        let (args, rest) = parse_macro_args("{x}{y} + z", 2).unwrap();
        assert_eq!(args, vec!["x", "y"]);
        assert_eq!(rest, " + z");
        assert!(parse_macro_args("{x", 1).is_none());
    }

    #[test]
    fn test_count_macro_args() {
        assert_eq!(count_macro_args("\\mathbb{R}"), 0);
        assert_eq!(count_macro_args("\\frac{#1}{#2}"), 2);
    }
}
