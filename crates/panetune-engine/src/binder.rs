//! Field binding: partial expansion, dialect dispatch, and delivery.

use std::{collections::BTreeMap, fmt, sync::Arc};

use config::{Dialect, EffectiveConfig, ViewerContext, classify, resolve_partials};
use serde_json::Value;
use tracing::warn;

use crate::{
    error::Result,
    evaluator::{MarkupBundle, MarkupChannel, ScriptEvaluator, ScriptScope},
    value::{TemplateValue, to_display},
};

/// Identity of a bound field, delivered with every display update.
///
/// Consumers key their targets off this; they are never told which dialect
/// or evaluator produced the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// Panel title text.
    Title,
    /// Panel subtitle text.
    Subtitle,
    /// Raw CSS attached to the panel.
    Style,
    /// Whether the panel is user-editable.
    Editable,
    /// A panel-level color option, by document key.
    Color(&'static str),
    /// Label of the order item at this index in the effective order.
    EntryLabel(usize),
    /// Badge of the order item at this index.
    EntryBadge(usize),
    /// Visibility of the order item at this index.
    EntryHidden(usize),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => f.write_str("title"),
            Self::Subtitle => f.write_str("subtitle"),
            Self::Style => f.write_str("style"),
            Self::Editable => f.write_str("editable"),
            Self::Color(key) => write!(f, "color:{key}"),
            Self::EntryLabel(index) => write!(f, "entry[{index}].label"),
            Self::EntryBadge(index) => write!(f, "entry[{index}].badge"),
            Self::EntryHidden(index) => write!(f, "entry[{index}].hidden"),
        }
    }
}

/// Consumer callback receiving `(field, display string)` for every delivery.
pub type DisplaySink = Arc<dyn Fn(Field, String) + Send + Sync>;

/// Binds raw template strings to their evaluators and delivers coerced
/// display strings to a consumer callback.
///
/// Subscriptions are fire-and-forget: once bound they run for the life of
/// the page and are never canceled. A stalled evaluator simply never
/// delivers another update for its field.
pub struct TemplateBinder {
    /// Script-dialect evaluator seam.
    script: Arc<dyn ScriptEvaluator>,
    /// Markup-dialect channel seam.
    markup: Arc<dyn MarkupChannel>,
    /// Named template snippets for `@partial` expansion.
    partials: BTreeMap<String, String>,
    /// Variables injected into script evaluations.
    script_variables: BTreeMap<String, Value>,
    /// Fixed bundle submitted with every markup subscription.
    bundle: MarkupBundle,
    /// Viewer context for script scopes.
    context: ViewerContext,
}

impl TemplateBinder {
    /// Create a binder for one resolved configuration and viewer context.
    pub fn new(
        script: Arc<dyn ScriptEvaluator>,
        markup: Arc<dyn MarkupChannel>,
        effective: &EffectiveConfig,
        context: ViewerContext,
    ) -> Self {
        let bundle = MarkupBundle::new(&context, effective.markup_variables.clone());
        Self {
            script,
            markup,
            partials: effective.partials.clone(),
            script_variables: effective.script_variables.clone(),
            bundle,
            context,
        }
    }

    /// Bind one field to its raw document value.
    ///
    /// Fails only on a partial cycle. Evaluator problems are logged and
    /// leave the field with no delivery, matching the behavior of a stalled
    /// evaluator.
    pub fn bind(&self, field: Field, raw: &str, sink: DisplaySink) -> Result<()> {
        let source = resolve_partials(raw, &self.partials)?;
        match classify(&source) {
            Dialect::Script(code) => self.bind_script(field, code, sink),
            Dialect::Markup => self.bind_markup(field, source, sink),
            Dialect::Literal => {
                // Literal values still pass through coercion so whitespace
                // normalizes the same way evaluated values do.
                drop(tokio::spawn(async move {
                    let display = to_display(TemplateValue::Text(source)).await;
                    sink(field, display);
                }));
            }
        }
        Ok(())
    }

    /// Subscribe `code` to the script evaluator and pump coerced results.
    fn bind_script(&self, field: Field, code: String, sink: DisplaySink) {
        let evaluator = self.script.clone();
        let scope = ScriptScope {
            variables: self.script_variables.clone(),
            context: self.context.clone(),
        };
        drop(tokio::spawn(async move {
            let mut results = match evaluator.track(code, scope).await {
                Ok(results) => results,
                Err(error) => {
                    warn!(%field, %error, "script subscription failed");
                    return;
                }
            };
            while let Some(value) = results.recv().await {
                let display = to_display(value).await;
                sink(field.clone(), display);
            }
        }));
    }

    /// Subscribe `template` to the markup channel and pump rendered strings.
    fn bind_markup(&self, field: Field, template: String, sink: DisplaySink) {
        let channel = self.markup.clone();
        let bundle = self.bundle.clone();
        drop(tokio::spawn(async move {
            let mut renders = match channel.subscribe(template, bundle).await {
                Ok(renders) => renders,
                Err(error) => {
                    warn!(%field, %error, "markup subscription failed");
                    return;
                }
            };
            // Server renders arrive as finished strings; no coercion needed.
            while let Some(rendered) = renders.recv().await {
                sink(field.clone(), rendered);
            }
        }));
    }
}
