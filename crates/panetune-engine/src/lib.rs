//! Panetune Engine
//!
//! The engine crate coordinates the reactive side of panel customization:
//! - expands partials and classifies template dialects
//! - binds templated fields to the external evaluators
//! - coerces evaluator output into display strings
//! - applies an effective configuration to the host panel through an
//!   injected entry-locator capability
//!
//! The expression evaluators themselves are external. This crate only
//! decides which dialect applies, what source text to feed each evaluator,
//! and how its asynchronous output becomes a display string. It exposes a
//! minimal, documented API:
//! - [`TemplateBinder`]: per-field reactive binding
//! - [`apply`]: drive a host panel behind an [`EntryLocator`]
//!
//! All other modules are crate-private implementation details.

mod apply;
mod binder;
mod error;
mod evaluator;
mod value;

#[cfg(test)]
mod test_binder;

pub use apply::{EntryAttr, EntryHandle, EntryLocator, apply};
pub use binder::{DisplaySink, Field, TemplateBinder};
pub use error::{Error, Result};
pub use evaluator::{MarkupBundle, MarkupChannel, ScriptEvaluator, ScriptScope};
pub use value::{TemplateValue, to_display};
