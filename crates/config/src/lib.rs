//! Shared configuration types (document model, inheritance, selection,
//! partial expansion) used by panetune.
#![allow(missing_docs)]

mod context;
mod dialect;
mod document;
mod effective;
mod error;
mod fragments;
mod partials;
mod select;
mod types;

#[cfg(test)]
mod test_effective;
#[cfg(test)]
mod test_partials;
#[cfg(test)]
mod test_select;

pub use context::ViewerContext;
pub use dialect::{Dialect, classify, is_template};
pub use document::{Document, NamedFragment, OrderItem, Override, PanelOptions, Predicate};
pub use effective::EffectiveConfig;
pub use error::Error;
pub use fragments::{BASE, validate_extends};
pub use partials::resolve_partials;
pub use select::select;
pub use types::{
    BoolOrString, ClickAction, Combinator, MatchBy, NumberOrString, PanelMode, Target,
};
