//! Seams to the external template evaluators.
//!
//! Both evaluators live outside this crate. They are reached through
//! object-safe async traits so the host can plug in its own backends, and
//! each subscription is delivered as a channel of results that stays open
//! for the remaining life of the page.

use std::collections::BTreeMap;

use async_trait::async_trait;
use config::ViewerContext;
use serde_json::Value;
use tokio::sync::mpsc::Receiver;

use crate::{error::Result, value::TemplateValue};

/// Scope handed to the script evaluator with each tracked evaluation.
#[derive(Debug, Clone, Default)]
pub struct ScriptScope {
    /// User-declared variables injected into the evaluation.
    pub variables: BTreeMap<String, Value>,
    /// Viewer context the code may read.
    pub context: ViewerContext,
}

/// Variable bundle submitted with every markup subscription.
#[derive(Debug, Clone, Default)]
pub struct MarkupBundle {
    /// Viewer name.
    pub user: String,
    /// Raw user-agent string of the viewer's browser.
    pub user_agent: String,
    /// Whether the viewer has the admin flag.
    pub is_admin: bool,
    /// Whether the viewer owns the installation.
    pub is_owner: bool,
    /// User-declared variables merged into the bundle.
    pub variables: BTreeMap<String, Value>,
}

impl MarkupBundle {
    /// Build the fixed bundle for `ctx` plus user-declared `variables`.
    pub fn new(ctx: &ViewerContext, variables: BTreeMap<String, Value>) -> Self {
        Self {
            user: ctx.user.clone(),
            user_agent: ctx.user_agent.clone(),
            is_admin: ctx.is_admin,
            is_owner: ctx.is_owner,
            variables,
        }
    }
}

/// Reactive script evaluator.
///
/// Re-delivers a result whenever a dependency tracked during the previous
/// evaluation changes. Results may be any value type, including ones that
/// settle later.
#[async_trait]
pub trait ScriptEvaluator: Send + Sync {
    /// Begin a tracked evaluation of `code` under `scope`.
    ///
    /// The receiver yields the initial result and one further result per
    /// tracked-dependency change, for the remaining life of the page.
    async fn track(&self, code: String, scope: ScriptScope) -> Result<Receiver<TemplateValue>>;
}

/// Push-subscription channel that renders markup templates server-side.
#[async_trait]
pub trait MarkupChannel: Send + Sync {
    /// Subscribe to renders of `template`.
    ///
    /// Every message is the full, already-rendered output. The subscription
    /// is never closed by this crate.
    async fn subscribe(&self, template: String, bundle: MarkupBundle) -> Result<Receiver<String>>;
}
