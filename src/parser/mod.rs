//! Parser for documents written in the macro markup.

mod markup;

pub use markup::parse_markup;

use crate::ast::{Document, Metadata};
use crate::config::PartialMathOptions;
use crate::error::{ParseError, Result};
use serde::Deserialize;

/// Parse a complete document from source text.
pub fn parse(input: &str) -> Result<Document> {
    let (metadata, content) = parse_front_matter(input)?;
    let nodes = markup::parse_nodes_in(input, content)?;

    Ok(Document { metadata, nodes })
}

/// Parse TOML front matter delimited by `+++`.
fn parse_front_matter(input: &str) -> Result<(Metadata, &str)> {
    let trimmed = input.trim_start();

    if !trimmed.starts_with("+++") {
        return Ok((Metadata::default(), input));
    }

    let after_open = &trimmed[3..];
    let close_pos = after_open
        .find("\n+++")
        .ok_or_else(|| ParseError::FrontMatter("Unclosed front matter (missing closing +++)".into()))?;

    let front_matter_str = &after_open[..close_pos];
    let content_start = 3 + close_pos + 4; // "+++" + content + "\n+++"
    let content = trimmed[content_start..].trim_start_matches('\n');

    let raw: RawFrontMatter = toml::from_str(front_matter_str)
        .map_err(|e| ParseError::FrontMatter(format!("Invalid TOML: {}", e)))?;

    let metadata = Metadata {
        title: raw.title,
        math: raw.math,
    };

    Ok((metadata, content))
}

/// Raw front matter structure for deserialization.
#[derive(Debug, Deserialize, Default)]
struct RawFrontMatter {
    title: Option<String>,
    #[serde(default)]
    math: PartialMathOptions,
}
