//! `@partial` macro expansion.
//!
//! Expansion is an explicit walk over the partial reference graph with a
//! breadcrumb stack, not unguarded recursive substitution: cycles are
//! fatal, unknown references are dropped with a warning.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::Error;

/// An `@partial <name>` directive.
static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@partial\s+([A-Za-z0-9_][A-Za-z0-9_-]*)").expect("static pattern compiles")
});

/// Expand every `@partial` directive in `source` using `partials`.
///
/// A template consisting solely of a single directive expands to that
/// partial's fully resolved body verbatim, so dialect detection can run
/// against the expanded text.
pub fn resolve_partials(
    source: &str,
    partials: &BTreeMap<String, String>,
) -> Result<String, Error> {
    let mut stack = Vec::new();
    expand(source, partials, &mut stack)
}

/// Expand one layer, recursing into each referenced partial's body before
/// substituting it.
fn expand(
    source: &str,
    partials: &BTreeMap<String, String>,
    stack: &mut Vec<String>,
) -> Result<String, Error> {
    let mut out = String::with_capacity(source.len());
    let mut tail = 0;
    for captures in DIRECTIVE.captures_iter(source) {
        let directive = captures.get(0).expect("whole match is always present");
        let name = &captures[1];
        out.push_str(&source[tail..directive.start()]);
        tail = directive.end();

        let Some(body) = partials.get(name) else {
            warn!("partial {name} doesn't exist");
            continue;
        };
        if let Some(position) = stack.iter().position(|visited| visited == name) {
            let mut cycle = stack[position..].to_vec();
            cycle.push(name.to_string());
            return Err(Error::PartialCycle { names: cycle });
        }
        stack.push(name.to_string());
        let resolved = expand(body, partials, stack)?;
        let _popped = stack.pop();
        out.push_str(&resolved);
    }
    out.push_str(&source[tail..]);
    Ok(out)
}
