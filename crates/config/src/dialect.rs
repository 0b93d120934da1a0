//! Template dialect detection.
//!
//! Classification runs against partial-expanded source text. The script
//! dialect claims a string only when its delimiters enclose the entire
//! string; markup delimiters may appear anywhere.

use once_cell::sync::Lazy;
use regex::Regex;

/// Whole string wrapped in the script-dialect delimiters.
static SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*\[\[\[(.*)\]\]\]\s*$").expect("static pattern compiles"));

/// Markup-dialect delimiter pairs anywhere in the string.
static MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}").expect("static pattern compiles"));

/// Templating dialect of a source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    /// Imperative code wrapped in `[[[` and `]]]`; holds the enclosed code.
    Script(String),
    /// Declarative markup with `{{ }}` or `{% %}` pairs; evaluated whole.
    Markup,
    /// No template syntax; used as a literal value.
    Literal,
}

/// Classify `source` into its templating dialect.
pub fn classify(source: &str) -> Dialect {
    if let Some(captures) = SCRIPT.captures(source) {
        return Dialect::Script(captures[1].trim().to_string());
    }
    if MARKUP.is_match(source) {
        return Dialect::Markup;
    }
    Dialect::Literal
}

/// Whether `source` would be evaluated rather than used literally.
pub fn is_template(source: &str) -> bool {
    !matches!(classify(source), Dialect::Literal)
}
