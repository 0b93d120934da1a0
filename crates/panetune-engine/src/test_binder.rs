#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use config::{EffectiveConfig, ViewerContext};
    use serde_json::json;
    use tokio::sync::mpsc::{self, Receiver};

    use crate::{
        DisplaySink, Field, MarkupBundle, MarkupChannel, Result, ScriptEvaluator, ScriptScope,
        TemplateBinder, TemplateValue,
    };

    /// Script evaluator that echoes the code it was given, once.
    struct EchoScript;

    #[async_trait]
    impl ScriptEvaluator for EchoScript {
        async fn track(&self, code: String, _scope: ScriptScope) -> Result<Receiver<TemplateValue>> {
            let (sender, receiver) = mpsc::channel(4);
            let _sent = sender.send(TemplateValue::Text(format!("script:{code}"))).await;
            Ok(receiver)
        }
    }

    /// Script evaluator that re-delivers, as a tracked dependency would.
    struct TwoShotScript;

    #[async_trait]
    impl ScriptEvaluator for TwoShotScript {
        async fn track(
            &self,
            _code: String,
            _scope: ScriptScope,
        ) -> Result<Receiver<TemplateValue>> {
            let (sender, receiver) = mpsc::channel(4);
            let _first = sender.send(TemplateValue::Number(1.0)).await;
            let _second = sender.send(TemplateValue::Number(2.0)).await;
            Ok(receiver)
        }
    }

    /// Markup channel that echoes the template, once, and records its bundle.
    #[derive(Default)]
    struct EchoMarkup {
        bundle: Mutex<Option<MarkupBundle>>,
    }

    #[async_trait]
    impl MarkupChannel for EchoMarkup {
        async fn subscribe(
            &self,
            template: String,
            bundle: MarkupBundle,
        ) -> Result<Receiver<String>> {
            *self.bundle.lock().unwrap() = Some(bundle);
            let (sender, receiver) = mpsc::channel(4);
            let _sent = sender.send(format!("markup:{template}")).await;
            Ok(receiver)
        }
    }

    /// Sink that forwards deliveries into a channel the test can await.
    fn channel_sink() -> (DisplaySink, mpsc::UnboundedReceiver<(Field, String)>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let sink: DisplaySink = Arc::new(move |field, display| {
            let _sent = sender.send((field, display));
        });
        (sink, receiver)
    }

    /// Binder over echo evaluators for `effective`.
    fn binder(effective: &EffectiveConfig) -> TemplateBinder {
        TemplateBinder::new(
            Arc::new(EchoScript),
            Arc::new(EchoMarkup::default()),
            effective,
            ViewerContext::default(),
        )
    }

    #[tokio::test]
    async fn literal_values_are_coerced_and_delivered() {
        let (sink, mut deliveries) = channel_sink();
        let effective = EffectiveConfig::default();
        binder(&effective)
            .bind(Field::Title, "  Dashboard  ", sink)
            .unwrap();
        assert_eq!(
            deliveries.recv().await.unwrap(),
            (Field::Title, "Dashboard".to_string())
        );
    }

    #[tokio::test]
    async fn script_dialect_feeds_the_enclosed_code() {
        let (sink, mut deliveries) = channel_sink();
        let effective = EffectiveConfig::default();
        binder(&effective)
            .bind(Field::Title, "[[[ return panel.title ]]]", sink)
            .unwrap();
        assert_eq!(
            deliveries.recv().await.unwrap(),
            (Field::Title, "script:return panel.title".to_string())
        );
    }

    #[tokio::test]
    async fn markup_dialect_feeds_the_whole_string() {
        let (sink, mut deliveries) = channel_sink();
        let effective = EffectiveConfig::default();
        binder(&effective)
            .bind(Field::Subtitle, "Count: {{ counter }}", sink)
            .unwrap();
        assert_eq!(
            deliveries.recv().await.unwrap(),
            (Field::Subtitle, "markup:Count: {{ counter }}".to_string())
        );
    }

    #[tokio::test]
    async fn partials_expand_before_dialect_classification() {
        let (sink, mut deliveries) = channel_sink();
        let effective = EffectiveConfig {
            partials: [("expr".to_string(), "[[[ code ]]]".to_string())].into(),
            ..EffectiveConfig::default()
        };
        binder(&effective)
            .bind(Field::Title, "@partial expr", sink)
            .unwrap();
        assert_eq!(
            deliveries.recv().await.unwrap(),
            (Field::Title, "script:code".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_partial_still_renders() {
        let (sink, mut deliveries) = channel_sink();
        let effective = EffectiveConfig::default();
        binder(&effective)
            .bind(Field::Title, "Hello @partial missing!", sink)
            .unwrap();
        assert_eq!(
            deliveries.recv().await.unwrap(),
            (Field::Title, "Hello !".to_string())
        );
    }

    #[tokio::test]
    async fn partial_cycle_fails_the_bind() {
        let (sink, _deliveries) = channel_sink();
        let effective = EffectiveConfig {
            partials: [
                ("a".to_string(), "@partial b".to_string()),
                ("b".to_string(), "@partial a".to_string()),
            ]
            .into(),
            ..EffectiveConfig::default()
        };
        let result = binder(&effective).bind(Field::Title, "@partial a", sink);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn tracked_changes_redeliver_through_the_same_sink() {
        let (sink, mut deliveries) = channel_sink();
        let effective = EffectiveConfig::default();
        let binder = TemplateBinder::new(
            Arc::new(TwoShotScript),
            Arc::new(EchoMarkup::default()),
            &effective,
            ViewerContext::default(),
        );
        binder.bind(Field::EntryBadge(0), "[[[ count ]]]", sink).unwrap();
        assert_eq!(
            deliveries.recv().await.unwrap(),
            (Field::EntryBadge(0), "1".to_string())
        );
        assert_eq!(
            deliveries.recv().await.unwrap(),
            (Field::EntryBadge(0), "2".to_string())
        );
    }

    #[tokio::test]
    async fn markup_bundle_carries_viewer_and_variables() {
        let (sink, mut deliveries) = channel_sink();
        let effective = EffectiveConfig {
            markup_variables: [("palette".to_string(), json!("dark"))].into(),
            ..EffectiveConfig::default()
        };
        let markup = Arc::new(EchoMarkup::default());
        let binder = TemplateBinder::new(
            Arc::new(EchoScript),
            markup.clone(),
            &effective,
            ViewerContext {
                user: "alice".to_string(),
                user_agent: "Mozilla/5.0".to_string(),
                is_admin: true,
                ..ViewerContext::default()
            },
        );
        binder.bind(Field::Title, "{{ greeting }}", sink).unwrap();
        let _delivered = deliveries.recv().await.unwrap();

        let bundle = markup.bundle.lock().unwrap().clone().unwrap();
        assert_eq!(bundle.user, "alice");
        assert_eq!(bundle.user_agent, "Mozilla/5.0");
        assert!(bundle.is_admin);
        assert!(!bundle.is_owner);
        assert_eq!(bundle.variables.get("palette").unwrap(), &json!("dark"));
    }
}
