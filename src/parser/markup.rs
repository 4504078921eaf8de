//! Parser for the macro markup.
//!
//! ```text
//! \M{x^2}            inline math
//! \MM[see ]{y}[.]    display math with prefix and postfix
//! \mathconfig{leqno = true}{ ... }
//! \ifmath{in math}{outside}
//! \ifdisplay{display}{inline}
//! ```
//!
//! Anything else is literal text. Balanced `{...}` groups are kept verbatim (commands inside
//! them are still recognized) and `\x` for any other `x` never delimits.

use crate::ast::{MathRegion, Node};
use crate::config::PartialMathOptions;
use crate::error::{Error, ParseError};
use nom::{
    bytes::complete::take_while1,
    character::complete::{alpha1, anychar, char},
    combinator::{cut, map_res, opt, recognize},
    error::{ErrorKind, FromExternalError},
    sequence::{delimited, pair, preceded},
    IResult,
};
use serde::Deserialize;

type PResult<'a, T> = IResult<&'a str, T, MarkupError<'a>>;

/// Parse markup into nodes.
pub fn parse_markup(input: &str) -> crate::error::Result<Vec<Node>> {
    parse_nodes_in(input, input)
}

/// Parse `content`, a suffix of `source`, reporting lines relative to `source`.
pub(crate) fn parse_nodes_in(source: &str, content: &str) -> crate::error::Result<Vec<Node>> {
    match sequence(content, Closer::End) {
        Ok((_, nodes)) => Ok(nodes),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e.into_error(source)),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::UnexpectedEof.into()),
    }
}

/// What ends the sequence currently being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    End,
    Brace,
    Bracket,
}

impl Closer {
    fn closes(self, input: &str) -> bool {
        match self {
            Self::End => false,
            Self::Brace => input.starts_with('}'),
            Self::Bracket => input.starts_with(']'),
        }
    }
}

fn sequence(mut input: &str, closer: Closer) -> PResult<'_, Vec<Node>> {
    let mut nodes = Vec::new();

    while !input.is_empty() && !closer.closes(input) {
        let (rest, parsed) = element(input, closer)?;
        nodes.extend(parsed);
        input = rest;
    }

    Ok((input, merge_text(nodes)))
}

fn element(input: &str, closer: Closer) -> PResult<'_, Vec<Node>> {
    if input.starts_with('\\') {
        return backslash(input);
    }
    if input.starts_with('{') {
        let (rest, inner) = brace_group(input)?;
        return Ok((rest, wrap_literal("{", inner, "}")));
    }
    if input.starts_with('}') {
        return Err(nom::Err::Failure(MarkupError::syntax(input, "unmatched `}`")));
    }
    if closer == Closer::Bracket && input.starts_with('[') {
        let (rest, inner) = bracket_group(input)?;
        return Ok((rest, wrap_literal("[", inner, "]")));
    }

    let (rest, text) = take_while1(|c: char| {
        !matches!(c, '\\' | '{' | '}') && !(closer == Closer::Bracket && matches!(c, '[' | ']'))
    })(input)?;
    Ok((rest, vec![Node::text(text)]))
}

fn backslash(input: &str) -> PResult<'_, Vec<Node>> {
    let named: PResult<'_, &str> = preceded(char('\\'), alpha1)(input);
    let Ok((rest, name)) = named else {
        // `\\`, `\{`, `\}`, `\[`, `\]` and other escaped characters stay as they are
        let (rest, escaped) = recognize(pair(char('\\'), opt(anychar)))(input)?;
        return Ok((rest, vec![Node::text(escaped)]));
    };

    let (rest, node) = match name {
        "M" => cut(|i| math_region(i, false))(rest)?,
        "MM" => cut(|i| math_region(i, true))(rest)?,
        "mathconfig" => cut(math_config)(rest)?,
        "ifmath" => cut(if_math)(rest)?,
        "ifdisplay" => cut(if_display)(rest)?,
        // Any other command is math markup such as `\frac`
        _ => return Ok((rest, vec![Node::text(&input[..1 + name.len()])])),
    };
    Ok((rest, vec![node]))
}

fn math_region(input: &str, display: bool) -> PResult<'_, Node> {
    let (input, prefix) = opt(bracket_group)(input)?;
    let (input, children) = brace_group(input)?;
    let (input, postfix) = postfix(input);

    Ok((
        input,
        Node::Math(MathRegion {
            display,
            children,
            prefix,
            postfix,
        }),
    ))
}

/// An optional `[...]` right after the body. If it does not close, the bracket is left to
/// be read again as text.
fn postfix(input: &str) -> (&str, Option<Vec<Node>>) {
    match bracket_group(input) {
        Ok((rest, nodes)) => (rest, Some(nodes)),
        Err(_) => (input, None),
    }
}

fn math_config(input: &str) -> PResult<'_, Node> {
    let (input, options) = map_res(raw_brace_group, parse_options)(input)?;
    let (input, children) = brace_group(input)?;
    Ok((input, Node::MathConfig { options, children }))
}

fn if_math(input: &str) -> PResult<'_, Node> {
    let (input, (math, text)) = pair(brace_group, brace_group)(input)?;
    Ok((input, Node::IfMath { math, text }))
}

fn if_display(input: &str) -> PResult<'_, Node> {
    let (input, (display, inline)) = pair(brace_group, brace_group)(input)?;
    Ok((input, Node::IfDisplay { display, inline }))
}

fn brace_group(input: &str) -> PResult<'_, Vec<Node>> {
    delimited(
        char('{'),
        |i| sequence(i, Closer::Brace),
        cut(char('}')),
    )(input)
}

fn bracket_group(input: &str) -> PResult<'_, Vec<Node>> {
    delimited(
        char('['),
        |i| sequence(i, Closer::Bracket),
        cut(char(']')),
    )(input)
}

/// The verbatim content of a balanced `{...}` group.
fn raw_brace_group(input: &str) -> PResult<'_, &str> {
    let (body, _) = char('{')(input)?;
    let mut depth = 1usize;
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
                    return Ok((&body[i + 1..], &body[..i]));
                }
            }
            _ => {}
        }
    }

    Err(nom::Err::Failure(MarkupError::syntax(input, "expected `}`")))
}

/// Parse `key = value, ...` pairs as a TOML inline table.
fn parse_options(raw: &str) -> Result<PartialMathOptions, String> {
    #[derive(Deserialize)]
    struct Wrapper {
        math: PartialMathOptions,
    }

    let document = format!("math = {{ {} }}", raw.replace('\n', " "));
    toml::from_str::<Wrapper>(&document)
        .map(|w| w.math)
        .map_err(|e| e.message().to_string())
}

fn wrap_literal(open: &str, inner: Vec<Node>, close: &str) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(inner.len() + 2);
    nodes.push(Node::text(open));
    nodes.extend(inner);
    nodes.push(Node::text(close));
    merge_text(nodes)
}

/// Join adjacent text nodes.
fn merge_text(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());

    for node in nodes {
        if let Node::Text(next) = &node {
            if let Some(Node::Text(prev)) = merged.last_mut() {
                prev.push_str(next);
                continue;
            }
        }
        merged.push(node);
    }

    merged
}

/// Parse failure with the position it occurred at.
#[derive(Debug)]
struct MarkupError<'a> {
    input: &'a str,
    message: String,
    invalid_options: bool,
}

impl<'a> MarkupError<'a> {
    fn syntax(input: &'a str, message: &str) -> Self {
        Self {
            input,
            message: message.to_string(),
            invalid_options: false,
        }
    }

    fn into_error(self, source: &str) -> Error {
        let offset = source.len().saturating_sub(self.input.len());
        let line = source[..offset].matches('\n').count() + 1;

        if self.invalid_options {
            ParseError::Options {
                line,
                message: self.message,
            }
            .into()
        } else {
            ParseError::Syntax {
                line,
                message: self.message,
            }
            .into()
        }
    }
}

impl<'a> nom::error::ParseError<&'a str> for MarkupError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self::syntax(input, &format!("unexpected input ({})", kind.description()))
    }

    fn append(_: &'a str, _: ErrorKind, other: Self) -> Self {
        other
    }

    fn from_char(input: &'a str, c: char) -> Self {
        Self::syntax(input, &format!("expected `{}`", c))
    }
}

impl<'a> FromExternalError<&'a str, String> for MarkupError<'a> {
    fn from_external_error(input: &'a str, _: ErrorKind, message: String) -> Self {
        Self {
            input,
            message,
            invalid_options: true,
        }
    }
}
