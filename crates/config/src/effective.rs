//! The merged configuration used for one page load.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    context::ViewerContext,
    document::{Document, OrderItem, PanelOptions},
    error::Error,
    fragments::{self, BASE},
    select,
};

/// The single fully merged configuration for the current viewer.
///
/// Built once per page load and immutable afterwards; live template values
/// flow through per-field subscriptions, never through rebuilds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EffectiveConfig {
    /// Merged panel-level options.
    pub options: PanelOptions,
    /// Effective order list. When the selected override inherits from
    /// `base`, its items come first so they claim matching host entries
    /// before the document's items are considered.
    pub order: Vec<OrderItem>,
    /// Named template snippets available to `@partial`.
    pub partials: BTreeMap<String, String>,
    /// Variables injected into script-dialect evaluations.
    pub script_variables: BTreeMap<String, Value>,
    /// Variables added to every markup-dialect bundle.
    pub markup_variables: BTreeMap<String, Value>,
}

impl EffectiveConfig {
    /// Merge `doc` with the override selected for `ctx`.
    ///
    /// Validates the inheritance graph first; any graph error aborts the
    /// build and no effective configuration is produced.
    pub fn build(doc: &Document, ctx: &ViewerContext) -> Result<Self, Error> {
        fragments::validate_extends(doc)?;
        let base = fragments::flatten_document(doc);

        let (options, order) = match select::select(&doc.exceptions, ctx) {
            None => (base.options.clone(), base.order.clone().unwrap_or_default()),
            Some(exception) => {
                debug!(user = %ctx.user, device = %ctx.device, "override selected");
                let includes_base = exception.extend_from.iter().any(|name| name == BASE);
                let inherited = fragments::flatten_chain(&exception.extend_from, doc, Some(&base));
                let options = exception.options.clone().or_over(&inherited.options);
                let order = match &exception.order {
                    // Override items first: they claim matching entries
                    // ahead of the document items they shadow.
                    Some(own) if includes_base => {
                        let mut order = own.clone();
                        order.extend(base.order.clone().unwrap_or_default());
                        order
                    }
                    Some(own) => own.clone(),
                    None => inherited.order.clone().unwrap_or_default(),
                };
                (options, order)
            }
        };

        Ok(Self {
            options,
            order,
            partials: doc.partials.clone(),
            script_variables: doc.script_variables.clone(),
            markup_variables: doc.markup_variables.clone(),
        })
    }
}
