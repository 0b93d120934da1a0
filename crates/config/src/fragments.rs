//! Inheritance-chain validation and flattening for `extend_from`.
//!
//! Chains are resolved bottom-up (a fragment's ancestors first) and
//! overridden top-down (the directly-declared fragment always wins over
//! anything it inherits). Among inherited sources the chain is walked left
//! to right and the first source to set a field keeps it.

use crate::{
    document::{Document, NamedFragment, OrderItem, PanelOptions},
    error::Error,
};

/// Literal chain entry meaning "inherit from the document root".
///
/// Permitted only inside override chains; fragments and the document root
/// may never depend on it.
pub const BASE: &str = "base";

/// Validate every `extend_from` chain in `doc`: unknown targets, cycles,
/// and `base` placement.
pub fn validate_extends(doc: &Document) -> Result<(), Error> {
    if doc.fragments.contains_key(BASE) {
        return Err(Error::invalid(
            "\"base\" is reserved and cannot name a fragment",
        ));
    }
    let mut stack = Vec::new();
    check_chain("document", &doc.extend_from, doc, false, &mut stack)?;
    for (name, fragment) in &doc.fragments {
        let mut stack = vec![name.clone()];
        check_chain(
            &format!("fragment \"{name}\""),
            &fragment.extend_from,
            doc,
            false,
            &mut stack,
        )?;
    }
    for (index, exception) in doc.exceptions.iter().enumerate() {
        let mut stack = Vec::new();
        check_chain(
            &format!("exceptions[{index}]"),
            &exception.extend_from,
            doc,
            true,
            &mut stack,
        )?;
    }
    Ok(())
}

/// Depth-first walk of one chain, carrying the breadcrumb `stack` of names
/// currently being resolved.
fn check_chain(
    referrer: &str,
    names: &[String],
    doc: &Document,
    allow_base: bool,
    stack: &mut Vec<String>,
) -> Result<(), Error> {
    for name in names {
        if name == BASE {
            if allow_base {
                continue;
            }
            return Err(Error::BaseNotAllowed {
                referrer: referrer.to_string(),
            });
        }
        let Some(fragment) = doc.fragments.get(name) else {
            return Err(Error::UnknownExtend {
                referrer: referrer.to_string(),
                name: name.clone(),
            });
        };
        if let Some(position) = stack.iter().position(|visited| visited == name) {
            let mut cycle = stack[position..].to_vec();
            cycle.push(name.clone());
            return Err(Error::ExtendCycle { names: cycle });
        }
        stack.push(name.clone());
        check_chain(
            &format!("fragment \"{name}\""),
            &fragment.extend_from,
            doc,
            false,
            stack,
        )?;
        let _popped = stack.pop();
    }
    Ok(())
}

/// A fragment or document flattened through its inheritance chain.
#[derive(Debug, Clone, Default)]
pub(crate) struct Flattened {
    /// Merged scalar options.
    pub options: PanelOptions,
    /// Order list, from the nearest layer that declared one.
    pub order: Option<Vec<OrderItem>>,
}

impl Flattened {
    /// Fill unset fields from `base`, keeping fields already set.
    fn or_over(self, base: Self) -> Self {
        Self {
            options: self.options.or_over(&base.options),
            order: self.order.or(base.order),
        }
    }
}

/// Flatten the document root through its own `extend_from` chain.
pub(crate) fn flatten_document(doc: &Document) -> Flattened {
    let own = Flattened {
        options: doc.options.clone(),
        order: doc.order.clone(),
    };
    own.or_over(flatten_chain(&doc.extend_from, doc, None))
}

/// Resolve `names` left to right into a single inherited layer. The first
/// source to set a field keeps it; `base` (when the caller supplies one)
/// contributes the already-flattened document at its chain position.
///
/// Assumes [`validate_extends`] has passed: unknown names and `base`
/// without a supplied layer are skipped rather than re-reported.
pub(crate) fn flatten_chain(
    names: &[String],
    doc: &Document,
    base: Option<&Flattened>,
) -> Flattened {
    let mut merged = Flattened::default();
    for name in names {
        let source = if name == BASE {
            match base {
                Some(layer) => layer.clone(),
                None => continue,
            }
        } else {
            match doc.fragments.get(name) {
                Some(fragment) => flatten_fragment(fragment, doc),
                None => continue,
            }
        };
        merged = merged.or_over(source);
    }
    merged
}

/// Flatten one named fragment: inherited sources first, own fields on top.
fn flatten_fragment(fragment: &NamedFragment, doc: &Document) -> Flattened {
    let own = Flattened {
        options: fragment.options.clone(),
        order: fragment.order.clone(),
    };
    own.or_over(flatten_chain(&fragment.extend_from, doc, None))
}
