//! Override selection for the current viewer context.

use crate::{
    context::ViewerContext,
    document::{Override, Predicate},
    types::Combinator,
};

/// Pick the first override whose predicate matches `ctx`.
///
/// Overrides are evaluated in declaration order and evaluation stops at the
/// first match; `None` means the base document alone is effective.
pub fn select<'a>(exceptions: &'a [Override], ctx: &ViewerContext) -> Option<&'a Override> {
    exceptions
        .iter()
        .find(|exception| matches(&exception.predicate, ctx))
}

/// Evaluate one predicate against the viewer context.
fn matches(predicate: &Predicate, ctx: &ViewerContext) -> bool {
    let mut results = Vec::new();
    if predicate.user.is_some() || predicate.not_user.is_some() {
        results.push(name_check(
            predicate.user.as_deref(),
            predicate.not_user.as_deref(),
            &ctx.user,
        ));
    }
    if predicate.device.is_some() || predicate.not_device.is_some() {
        results.push(name_check(
            predicate.device.as_deref(),
            predicate.not_device.as_deref(),
            &ctx.device,
        ));
    }
    if let Some(admin) = predicate.is_admin {
        results.push(admin == ctx.is_admin);
    }
    if let Some(owner) = predicate.is_owner {
        results.push(owner == ctx.is_owner);
    }
    match predicate.combine {
        Combinator::And => results.iter().all(|&ok| ok),
        // An override with no declared predicate kinds matches vacuously.
        Combinator::Or => results.is_empty() || results.iter().any(|&ok| ok),
    }
}

/// Include/exclude check for one name kind. Validation guarantees at most
/// one of the lists is set; matching is case-sensitive.
fn name_check(include: Option<&[String]>, exclude: Option<&[String]>, name: &str) -> bool {
    match (include, exclude) {
        (Some(list), _) => list.iter().any(|candidate| candidate == name),
        (None, Some(list)) => !list.iter().any(|candidate| candidate == name),
        (None, None) => true,
    }
}
