//! Enumerated option values and union-typed scalars used by the document model.

use serde::Serialize;

/// Overall panel presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelMode {
    /// Panel collapsed away entirely.
    Hidden,
    /// Icon-only rail.
    Narrow,
    /// Full panel with labels.
    Extended,
}

impl PanelMode {
    /// Parse a document keyword.
    pub(crate) fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "hidden" => Some(Self::Hidden),
            "narrow" => Some(Self::Narrow),
            "extended" => Some(Self::Extended),
            _ => None,
        }
    }
}

/// How an order item identifies its target entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchBy {
    /// Match against the entry's visible text.
    Text,
    /// Match against the entry's stable panel key.
    Key,
    /// Match against the entry's link target.
    Href,
}

impl MatchBy {
    pub(crate) fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "text" => Some(Self::Text),
            "key" => Some(Self::Key),
            "href" => Some(Self::Href),
            _ => None,
        }
    }
}

/// Link-opening target for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Target {
    /// Open in the current tab.
    #[serde(rename = "self")]
    SelfTab,
    /// Open in a new tab.
    #[serde(rename = "blank")]
    Blank,
}

impl Target {
    pub(crate) fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "self" => Some(Self::SelfTab),
            "blank" => Some(Self::Blank),
            _ => None,
        }
    }

    /// The attribute value written to the host entry.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelfTab => "self",
            Self::Blank => "blank",
        }
    }
}

/// How multiple predicate kinds on one override combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Every declared predicate kind must match.
    #[default]
    And,
    /// Any declared predicate kind may match.
    Or,
}

impl Combinator {
    pub(crate) fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }
}

/// Click behavior attached to an order item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClickAction {
    /// Navigate the host to an internal path.
    Navigate {
        /// Host-internal path to open.
        path: String,
    },
    /// Invoke a host service.
    Invoke {
        /// Service identifier.
        service: String,
        /// Optional payload passed to the service.
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Map<String, serde_json::Value>>,
    },
    /// Run a script-dialect snippet.
    Script {
        /// The code to run.
        code: String,
    },
}

/// Scalar that accepts either a number or a string in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NumberOrString {
    /// Numeric form.
    Number(f64),
    /// Textual form; may be a template.
    Text(String),
}

/// Boolean option that may instead hold a string (usually a template).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BoolOrString {
    /// Plain boolean form.
    Flag(bool),
    /// Textual form; may be a template.
    Text(String),
}
