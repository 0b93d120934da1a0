#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::{Dialect, Error, classify, resolve_partials};

    /// Build a partial map from (name, body) pairs.
    fn partials(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(name, body)| (name.to_string(), body.to_string()))
            .collect()
    }

    #[test]
    fn directive_expands_in_place() {
        let map = partials(&[("greeting", "Hello")]);
        let out = resolve_partials("@partial greeting, world", &map).unwrap();
        assert_eq!(out, "Hello, world");
    }

    #[test]
    fn nested_partials_expand_recursively() {
        let map = partials(&[
            ("outer", "<@partial inner>"),
            ("inner", "x"),
        ]);
        let out = resolve_partials("a @partial outer b", &map).unwrap();
        assert_eq!(out, "a <x> b");
    }

    #[test]
    fn sole_directive_yields_the_resolved_body_verbatim() {
        let map = partials(&[("expr", "[[[ return panel.count ]]]")]);
        let out = resolve_partials("@partial expr", &map).unwrap();
        assert_eq!(out, "[[[ return panel.count ]]]");
        // The expanded text, not the directive, drives dialect detection.
        assert_eq!(
            classify(&out),
            Dialect::Script("return panel.count".to_string())
        );
    }

    #[test]
    fn unknown_partial_is_dropped_not_fatal() {
        let out = resolve_partials("Hello @partial missing!", &BTreeMap::new()).unwrap();
        assert_eq!(out, "Hello !");
    }

    #[test]
    fn cycle_reports_exact_breadcrumb() {
        let map = partials(&[
            ("a", "start @partial b"),
            ("b", "@partial c"),
            ("c", "@partial a"),
        ]);
        let err = resolve_partials("@partial a", &map).unwrap_err();
        assert_eq!(
            err,
            Error::PartialCycle {
                names: vec!["a".into(), "b".into(), "c".into(), "a".into()],
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid configuration: circular partial reference: a > b > c > a"
        );
    }

    #[test]
    fn self_referencing_partial_is_a_cycle() {
        let map = partials(&[("loop", "again @partial loop")]);
        let err = resolve_partials("@partial loop", &map).unwrap_err();
        assert_eq!(
            err,
            Error::PartialCycle {
                names: vec!["loop".into(), "loop".into()],
            }
        );
    }

    #[test]
    fn repeated_references_are_not_cycles() {
        let map = partials(&[("dot", "."), ("line", "@partial dot@partial dot")]);
        let out = resolve_partials("@partial line @partial dot", &map).unwrap();
        assert_eq!(out, ".. .");
    }

    #[test]
    fn surrounding_markup_survives_expansion() {
        let map = partials(&[("state", "{{ sensor_state }}")]);
        let out = resolve_partials("Status: @partial state", &map).unwrap();
        assert_eq!(out, "Status: {{ sensor_state }}");
        assert_eq!(classify(&out), Dialect::Markup);
    }
}
