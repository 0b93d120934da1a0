#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{Document, EffectiveConfig, ViewerContext};

    /// Build the effective configuration for `user` against `value`.
    fn effective(value: serde_json::Value, user: &str) -> EffectiveConfig {
        let doc = Document::from_value(&value).unwrap();
        let ctx = ViewerContext {
            user: user.to_string(),
            ..ViewerContext::default()
        };
        EffectiveConfig::build(&doc, &ctx).unwrap()
    }

    #[test]
    fn base_scalar_survives_when_override_is_silent() {
        let effective = effective(
            json!({
                "title": "X",
                "exceptions": [{"user": "guest", "extend_from": "base"}],
            }),
            "guest",
        );
        assert_eq!(effective.options.title.as_deref(), Some("X"));
    }

    #[test]
    fn override_scalar_wins_over_base() {
        let effective = effective(
            json!({
                "title": "X",
                "exceptions": [{"user": "guest", "extend_from": "base", "title": "Y"}],
            }),
            "guest",
        );
        assert_eq!(effective.options.title.as_deref(), Some("Y"));
    }

    #[test]
    fn without_base_inheritance_fields_are_absent() {
        let effective = effective(
            json!({
                "title": "X",
                "background": "#101010",
                "exceptions": [{"user": "guest", "title": "Y"}],
            }),
            "guest",
        );
        assert_eq!(effective.options.title.as_deref(), Some("Y"));
        assert_eq!(effective.options.background, None);
    }

    #[test]
    fn override_items_concatenate_before_base_items() {
        let effective = effective(
            json!({
                "order": [{"item": "overview"}, {"item": "logs"}],
                "exceptions": [{
                    "user": "guest",
                    "extend_from": "base",
                    "order": [{"item": "help"}],
                }],
            }),
            "guest",
        );
        let ids: Vec<&str> = effective.order.iter().map(|i| i.item.as_str()).collect();
        assert_eq!(ids, ["help", "overview", "logs"]);
    }

    #[test]
    fn without_base_the_override_list_stands_alone() {
        let effective = effective(
            json!({
                "order": [{"item": "overview"}],
                "exceptions": [{"user": "guest", "order": [{"item": "help"}]}],
            }),
            "guest",
        );
        let ids: Vec<&str> = effective.order.iter().map(|i| i.item.as_str()).collect();
        assert_eq!(ids, ["help"]);
    }

    #[test]
    fn silent_override_inherits_the_base_list() {
        let effective = effective(
            json!({
                "order": [{"item": "overview"}],
                "exceptions": [{"user": "guest", "extend_from": "base"}],
            }),
            "guest",
        );
        assert_eq!(effective.order.len(), 1);
        assert_eq!(effective.order[0].item, "overview");
    }

    #[test]
    fn silent_override_without_base_has_no_list() {
        let effective = effective(
            json!({
                "order": [{"item": "overview"}],
                "exceptions": [{"user": "guest"}],
            }),
            "guest",
        );
        assert!(effective.order.is_empty());
    }

    #[test]
    fn no_matching_override_leaves_the_document_effective() {
        let effective = effective(
            json!({
                "title": "X",
                "order": [{"item": "overview"}],
                "exceptions": [{"user": "guest", "title": "Y"}],
            }),
            "admin",
        );
        assert_eq!(effective.options.title.as_deref(), Some("X"));
        assert_eq!(effective.order.len(), 1);
    }

    #[test]
    fn override_may_mix_base_with_named_fragments() {
        let effective = effective(
            json!({
                "title": "X",
                "background": "#101010",
                "fragments": {"night": {"background": "#000000", "text_color": "#e0e0e0"}},
                "exceptions": [{
                    "user": "guest",
                    "extend_from": ["night", "base"],
                }],
            }),
            "guest",
        );
        // The fragment sits earlier in the chain than base, so its fields win.
        assert_eq!(effective.options.background.as_deref(), Some("#000000"));
        assert_eq!(effective.options.text_color.as_deref(), Some("#e0e0e0"));
        assert_eq!(effective.options.title.as_deref(), Some("X"));
    }

    #[test]
    fn document_only_maps_are_always_carried() {
        let effective = effective(
            json!({
                "partials": {"greeting": "Hello"},
                "script_variables": {"limit": 5},
                "markup_variables": {"palette": "dark"},
                "exceptions": [{"user": "guest", "title": "Y"}],
            }),
            "guest",
        );
        assert_eq!(effective.partials.get("greeting").unwrap(), "Hello");
        assert_eq!(effective.script_variables.len(), 1);
        assert_eq!(effective.markup_variables.len(), 1);
    }

    #[test]
    fn first_match_determines_every_field() {
        let effective = effective(
            json!({
                "title": "Base",
                "exceptions": [
                    {"not_user": "nobody", "extend_from": "base"},
                    {"user": "guest", "title": "Second"},
                ],
            }),
            "guest",
        );
        // Both predicates match; only the first override contributes.
        assert_eq!(effective.options.title.as_deref(), Some("Base"));
    }
}
