//! Scenario tests for the recursive builder.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};

    use crate::build::{build_actions, BuildOptions, BuildReport};
    use crate::host::{Document, FontName, LayoutAlign, NodeKind, TextAutoResize};
    use crate::scene::{ComponentDef, SceneDocument};
    use crate::viewport::Viewport;
    use crate::ProgressCallback;

    async fn build(doc: &mut SceneDocument, actions: Value) -> BuildReport {
        let actions = match actions {
            Value::Array(items) => items,
            other => vec![other],
        };
        build_actions(doc, &actions, &BuildOptions::default(), None).await
    }

    #[tokio::test]
    async fn unsupported_types_are_omitted_in_order() {
        let mut doc = SceneDocument::default();
        let report = build(
            &mut doc,
            json!([
                {"action": "create", "type": "rectangle", "name": "first",
                 "x": 0, "y": 0, "w": 10, "h": 10},
                {"action": "create", "type": "BLOB"},
                {"action": "create", "type": "rect", "name": "second",
                 "x": 20, "y": 0, "w": 10, "h": 10}
            ]),
        )
        .await;

        assert_eq!(report.nodes.len(), 2);
        assert_eq!((report.built, report.skipped, report.failed), (2, 1, 0));
        let names: Vec<_> = report
            .nodes
            .iter()
            .map(|n| doc.node(n.id()).expect("node").name.clone())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(report.warnings.iter().any(|w| w.contains("BLOB")));
    }

    #[tokio::test]
    async fn frame_children_are_attached_with_their_own_geometry() {
        let mut doc = SceneDocument::default();
        let report = build(
            &mut doc,
            json!({
                "action": "create",
                "type": "frame",
                "x": 100, "y": 100, "w": 400, "h": 300,
                "children": [
                    {"action": "create", "type": "rectangle", "x": 10, "y": 20, "w": 50, "h": 60},
                    {"action": "create", "type": "ellipse",
                     "x": 200, "y": 40, "width": 30, "height": 30}
                ]
            }),
        )
        .await;

        assert_eq!(report.nodes.len(), 1);
        assert_eq!(report.built, 3);
        let frame = report.nodes[0].id();
        let children = doc.children_of(frame);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].kind, NodeKind::Rectangle);
        assert_eq!(
            (children[0].x, children[0].y, children[0].width, children[0].height),
            (10.0, 20.0, 50.0, 60.0)
        );
        assert_eq!(children[1].kind, NodeKind::Ellipse);
        assert_eq!((children[1].x, children[1].width), (200.0, 30.0));
        assert!(doc.children_of(children[0].id).is_empty());
    }

    #[tokio::test]
    async fn wrapped_and_string_actions_are_unwrapped() {
        let mut doc = SceneDocument::default();
        let report = build(
            &mut doc,
            json!([
                {"create": {"type": "ellipse"}},
                "{\"action\": \"add\", \"type\": \"line\"}",
                "just words"
            ]),
        )
        .await;

        assert_eq!(report.nodes.len(), 2);
        assert_eq!(report.nodes[0].kind(), NodeKind::Ellipse);
        assert_eq!(report.nodes[1].kind(), NodeKind::Line);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn unsupported_verbs_are_skipped() {
        let mut doc = SceneDocument::default();
        let report = build(&mut doc, json!({"action": "delete", "type": "rectangle"})).await;

        assert!(report.nodes.is_empty());
        assert!(doc.is_empty());
        assert!(report.warnings[0].contains("DELETE"));
    }

    #[tokio::test]
    async fn type_is_inferred_from_verb() {
        let mut doc = SceneDocument::default();
        let report = build(&mut doc, json!({"action": "create_text", "text": "Hello"})).await;

        let node = doc.node(report.nodes[0].id()).expect("text node");
        let text = node.text.as_ref().expect("text props");
        assert_eq!(text.characters, "Hello");
        assert_eq!(text.font_name, FontName::default());
        assert_eq!(text.auto_resize, TextAutoResize::WidthAndHeight);
    }

    #[tokio::test]
    async fn text_with_size_disables_auto_resize() {
        let mut doc = SceneDocument::default();
        let report = build(
            &mut doc,
            json!({
                "type": "text",
                "characters": "Title",
                "name": "Heading",
                "fontName": {"family": "Inter", "style": "Bold"},
                "fontSize": 24,
                "w": 300,
                "x": 5
            }),
        )
        .await;

        let node = doc.node(report.nodes[0].id()).expect("text node");
        let text = node.text.as_ref().expect("text props");
        assert_eq!(node.name, "Heading");
        assert_eq!(text.characters, "Title");
        assert_eq!(text.font_name, FontName::new("Inter", "Bold"));
        assert_eq!(text.font_size, 24.0);
        assert_eq!(text.auto_resize, TextAutoResize::None);
        assert_eq!((node.x, node.width), (5.0, 300.0));
    }

    #[tokio::test]
    async fn missing_font_fails_only_that_action() {
        let mut doc = SceneDocument::default();
        let report = build(
            &mut doc,
            json!([
                {"type": "text", "text": "x",
                 "fontName": {"family": "Papyrus", "style": "Regular"}},
                {"type": "rectangle"}
            ]),
        )
        .await;

        assert_eq!(report.nodes.len(), 1);
        assert_eq!(report.failed, 1);
        assert_eq!(doc.len(), 1);
        assert!(report.warnings.iter().any(|w| w.contains("Papyrus")));
    }

    #[tokio::test]
    async fn failing_child_does_not_affect_parent_or_siblings() {
        let mut doc = SceneDocument::default();
        let report = build(
            &mut doc,
            json!({
                "type": "frame",
                "children": [
                    {"type": "text", "fontName": {"family": "Nope", "style": "Bold"}},
                    {"type": "blob"},
                    {"type": "rectangle", "name": "survivor"}
                ]
            }),
        )
        .await;

        assert_eq!(report.nodes.len(), 1);
        assert_eq!((report.built, report.skipped, report.failed), (2, 1, 1));
        let children = doc.children_of(report.nodes[0].id());
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "survivor");
    }

    #[tokio::test]
    async fn children_of_non_containers_stay_detached() {
        let mut doc = SceneDocument::default();
        let report = build(
            &mut doc,
            json!({"type": "rectangle", "children": [{"type": "ellipse"}]}),
        )
        .await;

        assert_eq!(report.nodes.len(), 1);
        assert_eq!(report.built, 2);
        assert!(doc.children_of(report.nodes[0].id()).is_empty());
        assert_eq!(doc.roots().len(), 2);
    }

    #[tokio::test]
    async fn instance_resolves_by_key_then_id_then_falls_back_to_frame() {
        let mut doc = SceneDocument::default();
        doc.register_component(ComponentDef {
            id: "10:1".into(),
            key: Some("button-key".into()),
            name: "Button".into(),
            width: 120.0,
            height: 40.0,
        });
        doc.register_component(ComponentDef {
            id: "10:2".into(),
            key: None,
            name: "Card".into(),
            width: 200.0,
            height: 100.0,
        });

        let report = build(
            &mut doc,
            json!([
                {"type": "instance", "componentKey": "button-key", "x": 10},
                {"type": "instance", "componentKey": "missing", "componentId": "10:2"},
                {"type": "instance", "componentId": "nope", "name": "Placeholder", "w": 50}
            ]),
        )
        .await;

        assert_eq!(report.nodes.len(), 3);
        let kinds: Vec<_> = report.nodes.iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Instance, NodeKind::Instance, NodeKind::Frame]);

        let button = doc.node(report.nodes[0].id()).expect("button");
        assert_eq!((button.name.as_str(), button.x, button.width), ("Button", 10.0, 120.0));
        let card = doc.node(report.nodes[1].id()).expect("card");
        assert_eq!(card.name, "Card");
        let fallback = doc.node(report.nodes[2].id()).expect("fallback");
        assert_eq!((fallback.name.as_str(), fallback.width), ("Placeholder", 50.0));

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("FRAME"));
    }

    #[tokio::test]
    async fn auto_layout_children_get_layout_participation() {
        let mut doc = SceneDocument::default();
        let report = build(
            &mut doc,
            json!({
                "type": "frame",
                "layoutMode": "HORIZONTAL",
                "itemSpacing": 12,
                "children": [
                    {"type": "rectangle", "layoutAlign": "STRETCH", "layoutGrow": 1},
                    {"type": "text", "text": "label", "layoutAlign": "CENTER"}
                ]
            }),
        )
        .await;

        let children = doc.children_of(report.nodes[0].id());
        assert_eq!(children[0].layout_align, Some(LayoutAlign::Stretch));
        assert_eq!(children[0].layout_grow, Some(1.0));
        assert_eq!(children[1].layout_align, Some(LayoutAlign::Center));
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn invalid_child_layout_align_is_reported_once() {
        let mut doc = SceneDocument::default();
        let report = build(
            &mut doc,
            json!({
                "type": "frame",
                "layoutMode": "VERTICAL",
                "children": [{"type": "rectangle", "layoutAlign": "SIDEWAYS", "layoutGrow": 2}]
            }),
        )
        .await;

        assert_eq!(
            report.warnings,
            vec!["Ignoring unknown layoutAlign value 'SIDEWAYS'".to_string()]
        );
        let children = doc.children_of(report.nodes[0].id());
        assert_eq!(children[0].layout_align, None);
        assert_eq!(children[0].layout_grow, Some(2.0));
    }

    #[tokio::test]
    async fn doubly_wrapped_action_is_an_invalid_payload() {
        let mut doc = SceneDocument::default();
        let report = build(
            &mut doc,
            json!([
                {"create": {"node": {"type": "rectangle"}}},
                {"create": {"type": "ellipse"}}
            ]),
        )
        .await;

        assert_eq!((report.built, report.skipped), (1, 1));
        assert!(report.warnings[0].contains("wrapped more than once"));
    }

    #[tokio::test]
    async fn styles_apply_only_where_supported() {
        let mut doc = SceneDocument::default();
        let report = build(
            &mut doc,
            json!([
                {"type": "rectangle", "fills": ["#ff0000"], "cornerRadius": 8, "effects": ["#000"]},
                {"type": "line", "fills": ["#ff0000"], "cornerRadius": 8}
            ]),
        )
        .await;

        assert_eq!(report.nodes.len(), 2);
        let rect = doc.node(report.nodes[0].id()).expect("rect");
        assert_eq!(rect.fills.len(), 1);
        assert_eq!(rect.corner_radius, Some(8.0));
        assert_eq!(rect.effects.len(), 1);
        let line = doc.node(report.nodes[1].id()).expect("line");
        assert!(line.fills.is_empty());
        assert_eq!(line.corner_radius, None);
    }

    #[tokio::test]
    async fn configured_default_font_is_used() {
        let mut doc = SceneDocument::with_fonts(
            Viewport::default(),
            [FontName::new("Roboto", "Regular")],
        );
        let options = BuildOptions {
            default_font: FontName::new("Roboto", "Regular"),
        };
        let report = build_actions(&mut doc, &[json!({"type": "text"})], &options, None).await;

        let node = doc.node(report.nodes[0].id()).expect("text");
        let text = node.text.as_ref().expect("text props");
        assert_eq!(text.font_name.family, "Roboto");
        assert_eq!(text.characters, "Text");
    }

    #[tokio::test]
    async fn progress_reports_each_root_action() {
        let mut doc = SceneDocument::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress: ProgressCallback = Arc::new(move |msg: &str| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(msg.to_string());
            }
        });

        let actions = vec![json!({"type": "rectangle"}), json!({"type": "ellipse"})];
        build_actions(&mut doc, &actions, &BuildOptions::default(), Some(&progress)).await;

        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 2);
        assert!(seen[1].contains("2/2"));
    }

    #[tokio::test]
    async fn nodes_created_by_builder_report_capabilities() {
        let mut doc = SceneDocument::default();
        let report = build(&mut doc, json!({"type": "component"})).await;
        let component = &report.nodes[0];
        assert_eq!(component.kind(), NodeKind::Component);
        assert_eq!(doc.geometry(component).width, 100.0);
    }
}
