//! Document tree evaluated by the expansion engine.

use crate::config::PartialMathOptions;

/// A complete parsed document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Front matter metadata
    pub metadata: Metadata,
    /// Document content
    pub nodes: Vec<Node>,
}

/// Document metadata from TOML front matter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,
    /// Document-wide math options, applied over the defaults
    pub math: PartialMathOptions,
}

/// A node of the expansion tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text
    Text(String),

    /// A sequence of nodes, evaluated in order and concatenated
    Fragment(Vec<Node>),

    /// An inline (`M`) or display (`MM`) math region
    Math(MathRegion),

    /// Scoped math options for everything in `children`
    MathConfig {
        options: PartialMathOptions,
        children: Vec<Node>,
    },

    /// `math` inside a math region, `text` outside of one
    IfMath { math: Vec<Node>, text: Vec<Node> },

    /// `display` inside a display math group, `inline` otherwise
    IfDisplay {
        display: Vec<Node>,
        inline: Vec<Node>,
    },
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Inline math region.
    pub fn m(children: Vec<Node>) -> Self {
        Self::Math(MathRegion::new(false, children))
    }

    /// Display math region.
    pub fn mm(children: Vec<Node>) -> Self {
        Self::Math(MathRegion::new(true, children))
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<MathRegion> for Node {
    fn from(region: MathRegion) -> Self {
        Self::Math(region)
    }
}

/// A span of content evaluated as math.
///
/// `prefix` and `postfix` end up inside the rendered math as plain text, glued to the
/// formula so a line break can never separate them.
#[derive(Debug, Clone, PartialEq)]
pub struct MathRegion {
    /// Display mode requested at this call site. Ignored when nested in another region.
    pub display: bool,
    pub children: Vec<Node>,
    pub prefix: Option<Vec<Node>>,
    pub postfix: Option<Vec<Node>>,
}

impl MathRegion {
    pub fn new(display: bool, children: Vec<Node>) -> Self {
        Self {
            display,
            children,
            prefix: None,
            postfix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: Vec<Node>) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn with_postfix(mut self, postfix: Vec<Node>) -> Self {
        self.postfix = Some(postfix);
        self
    }
}
