//! Math rendering options and their scoped store.
//!
//! [`MathRenderOptions`] is the full record handed (together with the display mode) to a
//! math backend. [`PartialMathOptions`] is what authors write: in front matter, in a
//! `\mathconfig{...}` macro, or from Rust. Merging is field-wise: every field present in
//! the update replaces the old one, every absent field is inherited.
//!
//! The defaults deliberately differ from KaTeX's own: rendering errors halt the build
//! (`haltOnError = true`) and `trust` is on.

use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Markup flavour the backend should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputFormat {
    #[default]
    Html,
    Mathml,
    HtmlAndMathml,
}

impl OutputFormat {
    /// The option value as written in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Mathml => "mathml",
            Self::HtmlAndMathml => "htmlAndMathml",
        }
    }
}

/// How the backend treats input that is valid but non-standard LaTeX.
///
/// `false` maps to [`Strictness::Ignore`] and `true` to [`Strictness::Error`]. Mode names the
/// backend defines beyond these are kept verbatim in [`Strictness::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Strictness {
    #[default]
    Ignore,
    Warn,
    Error,
    Other(String),
}

impl<'de> Deserialize<'de> for Strictness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Mode(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Self::Error,
            Raw::Flag(false) => Self::Ignore,
            Raw::Mode(mode) => match mode.as_str() {
                "ignore" => Self::Ignore,
                "warn" => Self::Warn,
                "error" => Self::Error,
                _ => Self::Other(mode),
            },
        })
    }
}

/// Which commands that can produce links, images, or raw HTML attributes are allowed.
///
/// A boolean trusts everything or nothing; a list of command names stands in for a
/// validator and trusts exactly those commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trust {
    All,
    Nothing,
    Commands(BTreeSet<String>),
}

impl Default for Trust {
    fn default() -> Self {
        Self::All
    }
}

impl Trust {
    /// Check whether `command` (with or without its leading backslash) may be used.
    pub fn allows(&self, command: &str) -> bool {
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::Commands(allowed) => allowed.contains(command.trim_start_matches('\\')),
        }
    }
}

impl<'de> Deserialize<'de> for Trust {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Commands(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Self::All,
            Raw::Flag(false) => Self::Nothing,
            Raw::Commands(commands) => Self::Commands(
                commands
                    .into_iter()
                    .map(|c| c.trim_start_matches('\\').to_string())
                    .collect(),
            ),
        })
    }
}

/// The complete set of options that parameterize one math render.
#[derive(Debug, Clone, PartialEq)]
pub struct MathRenderOptions {
    pub output: OutputFormat,
    /// Equation numbers on the left.
    pub leqno: bool,
    /// Flush-left display math.
    pub fleqn: bool,
    /// Abort the whole evaluation when the backend rejects the markup.
    pub halt_on_error: bool,
    /// Colour of error output when not halting.
    pub error_color: String,
    /// Macro name -> expansion. Names may be written with or without the backslash.
    pub macros: BTreeMap<String, String>,
    pub min_rule_thickness: Option<f64>,
    pub color_is_text_color: bool,
    pub max_size: f64,
    /// Upper bound on macro expansions per render.
    pub max_expand: usize,
    pub strict: Strictness,
    pub trust: Trust,
    pub global_group: bool,
}

impl Default for MathRenderOptions {
    fn default() -> Self {
        Self {
            output: OutputFormat::Html,
            leqno: false,
            fleqn: false,
            halt_on_error: true,
            error_color: "#cc0000".to_string(),
            macros: BTreeMap::new(),
            min_rule_thickness: None,
            color_is_text_color: false,
            max_size: f64::INFINITY,
            max_expand: 1000,
            strict: Strictness::Ignore,
            trust: Trust::All,
            global_group: false,
        }
    }
}

impl MathRenderOptions {
    /// Produce a new value with every field present in `update` replaced.
    pub fn merge(&self, update: &PartialMathOptions) -> Self {
        Self {
            output: update.output.unwrap_or(self.output),
            leqno: update.leqno.unwrap_or(self.leqno),
            fleqn: update.fleqn.unwrap_or(self.fleqn),
            halt_on_error: update.halt_on_error.unwrap_or(self.halt_on_error),
            error_color: update
                .error_color
                .clone()
                .unwrap_or_else(|| self.error_color.clone()),
            macros: update.macros.clone().unwrap_or_else(|| self.macros.clone()),
            min_rule_thickness: update.min_rule_thickness.or(self.min_rule_thickness),
            color_is_text_color: update.color_is_text_color.unwrap_or(self.color_is_text_color),
            max_size: update.max_size.unwrap_or(self.max_size),
            max_expand: update.max_expand.unwrap_or(self.max_expand),
            strict: update.strict.clone().unwrap_or_else(|| self.strict.clone()),
            trust: update.trust.clone().unwrap_or_else(|| self.trust.clone()),
            global_group: update.global_group.unwrap_or(self.global_group),
        }
    }
}

/// A partial update of [`MathRenderOptions`]; `None` means "inherit".
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialMathOptions {
    pub output: Option<OutputFormat>,
    pub leqno: Option<bool>,
    pub fleqn: Option<bool>,
    pub halt_on_error: Option<bool>,
    pub error_color: Option<String>,
    pub macros: Option<BTreeMap<String, String>>,
    pub min_rule_thickness: Option<f64>,
    pub color_is_text_color: Option<bool>,
    pub max_size: Option<f64>,
    pub max_expand: Option<usize>,
    pub strict: Option<Strictness>,
    pub trust: Option<Trust>,
    pub global_group: Option<bool>,
}

impl PartialMathOptions {
    /// True when the update would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One node in the chain of configuration scopes.
///
/// Scopes are persistent: [`ConfigScope::overlay`] returns a child that shares its parent, so
/// leaving a scope is just dropping back to the parent handle.
#[derive(Debug, Clone)]
pub struct ConfigScope {
    frame: Rc<ConfigFrame>,
}

#[derive(Debug)]
struct ConfigFrame {
    effective: MathRenderOptions,
    parent: Option<ConfigScope>,
    depth: usize,
}

impl ConfigScope {
    /// A root scope holding `options`.
    pub fn root(options: MathRenderOptions) -> Self {
        Self {
            frame: Rc::new(ConfigFrame {
                effective: options,
                parent: None,
                depth: 0,
            }),
        }
    }

    /// The effective options visible in this scope.
    pub fn read(&self) -> &MathRenderOptions {
        &self.frame.effective
    }

    /// A child scope with `update` merged over this one.
    pub fn overlay(&self, update: &PartialMathOptions) -> Self {
        Self {
            frame: Rc::new(ConfigFrame {
                effective: self.read().merge(update),
                parent: Some(self.clone()),
                depth: self.frame.depth + 1,
            }),
        }
    }

    pub fn parent(&self) -> Option<&ConfigScope> {
        self.frame.parent.as_ref()
    }

    /// Number of overrides between this scope and the root.
    pub fn depth(&self) -> usize {
        self.frame.depth
    }
}

impl Default for ConfigScope {
    fn default() -> Self {
        Self::root(MathRenderOptions::default())
    }
}
