#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{Document, ViewerContext, select};

    /// Viewer context for `user` on `device`, no flags.
    fn ctx(user: &str, device: &str) -> ViewerContext {
        ViewerContext {
            user: user.to_string(),
            device: device.to_string(),
            ..ViewerContext::default()
        }
    }

    /// Parse the `exceptions` list out of a document literal.
    fn exceptions(value: serde_json::Value) -> Vec<crate::Override> {
        Document::from_value(&value).unwrap().exceptions
    }

    #[test]
    fn include_list_matches_by_name() {
        let list = exceptions(json!({
            "exceptions": [{"user": ["alice", "bob"], "title": "Scoped"}],
        }));
        assert!(select(&list, &ctx("alice", "desk")).is_some());
        assert!(select(&list, &ctx("carol", "desk")).is_none());
    }

    #[test]
    fn matching_is_case_sensitive() {
        let list = exceptions(json!({
            "exceptions": [{"user": "Alice"}],
        }));
        assert!(select(&list, &ctx("Alice", "")).is_some());
        assert!(select(&list, &ctx("alice", "")).is_none());
    }

    #[test]
    fn exclude_list_matches_everyone_else() {
        let list = exceptions(json!({
            "exceptions": [{"not_user": "guest"}],
        }));
        assert!(select(&list, &ctx("alice", "")).is_some());
        assert!(select(&list, &ctx("guest", "")).is_none());
    }

    #[test]
    fn device_predicate_is_symmetric() {
        let list = exceptions(json!({
            "exceptions": [{"device": "kiosk"}, {"not_device": "kiosk"}],
        }));
        let on_kiosk = select(&list, &ctx("any", "kiosk")).unwrap();
        assert_eq!(on_kiosk.predicate.device.as_ref().unwrap()[0], "kiosk");
        let elsewhere = select(&list, &ctx("any", "desk")).unwrap();
        assert!(elsewhere.predicate.not_device.is_some());
    }

    #[test]
    fn flag_predicates_require_equality() {
        let list = exceptions(json!({
            "exceptions": [{"is_admin": false, "title": "Limited"}],
        }));
        let viewer = ViewerContext {
            is_admin: true,
            ..ViewerContext::default()
        };
        assert!(select(&list, &viewer).is_none());
        assert!(select(&list, &ViewerContext::default()).is_some());
    }

    #[test]
    fn and_combinator_requires_every_declared_kind() {
        let list = exceptions(json!({
            "exceptions": [{"user": "alice", "device": "tablet"}],
        }));
        assert!(select(&list, &ctx("alice", "tablet")).is_some());
        assert!(select(&list, &ctx("alice", "desk")).is_none());
    }

    #[test]
    fn or_combinator_accepts_any_declared_kind() {
        let list = exceptions(json!({
            "exceptions": [{"user": "alice", "device": "tablet", "combine": "or"}],
        }));
        assert!(select(&list, &ctx("alice", "desk")).is_some());
        assert!(select(&list, &ctx("bob", "tablet")).is_some());
        assert!(select(&list, &ctx("bob", "desk")).is_none());
    }

    #[test]
    fn first_matching_override_wins() {
        let list = exceptions(json!({
            "exceptions": [
                {"not_user": "nobody", "title": "First"},
                {"user": "alice", "title": "Second"},
            ],
        }));
        let selected = select(&list, &ctx("alice", "")).unwrap();
        assert_eq!(selected.options.title.as_deref(), Some("First"));
    }

    #[test]
    fn predicate_free_override_matches_everyone() {
        let list = exceptions(json!({
            "exceptions": [{"title": "Always"}],
        }));
        assert!(select(&list, &ctx("anyone", "anywhere")).is_some());
    }
}
