//! Node factory: one canonical type + payload in, one configured node out.

use crate::host::{
    ComponentId, Document, FontName, HostError, NodeHandle, NodeKind, Property, TextAutoResize,
};

use super::appliers::{
    apply_auto_layout, apply_corner_radius, apply_effects, apply_fills,
    apply_layout_participation, apply_name, apply_position, apply_size, apply_text_style,
};
use super::normalize::NodeType;
use super::payload::Payload;
use super::{ActionOutcome, BuildFailure, BuildOptions, BuildReport, SkipReason};

/// Create and configure a node of `node_type`.
///
/// Does not attach the node to a parent or build its children. A node whose
/// configuration fails is removed from the document before returning.
pub async fn create_node<D: Document>(
    doc: &mut D,
    node_type: &NodeType,
    payload: &Payload,
    options: &BuildOptions,
    report: &mut BuildReport,
) -> ActionOutcome {
    let kind = match node_type {
        NodeType::Known(kind) => *kind,
        NodeType::Unsupported(raw) => {
            return ActionOutcome::Skipped(SkipReason::UnsupportedType(raw.clone()))
        }
    };

    let (node, font) = match kind {
        NodeKind::Text => {
            let node = doc.create_node(NodeKind::Text);
            let font = payload
                .font_name()
                .unwrap_or_else(|| options.default_font.clone());
            if let Err(err) = doc.load_font(&font).await {
                doc.remove_node(node);
                return ActionOutcome::Failed(BuildFailure::FontUnavailable {
                    message: err.to_string(),
                    font,
                });
            }
            (node, Some(font))
        }
        NodeKind::Instance => (resolve_instance(doc, payload, report).await, None),
        other => (doc.create_node(other), None),
    };

    let configured = match font {
        Some(font) => configure_text(doc, &node, payload, font, report),
        None => configure_shape(doc, &node, payload, report),
    }
    .and_then(|()| apply_styles(doc, &node, payload, report));

    match configured {
        Ok(()) => ActionOutcome::Built(node),
        Err(err) => {
            tracing::debug!(node = %node.id(), error = %err, "removing partially built node");
            doc.remove_node(node);
            ActionOutcome::Failed(BuildFailure::Host(err))
        }
    }
}

fn configure_text<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
    font: FontName,
    report: &mut BuildReport,
) -> Result<(), HostError> {
    doc.set_property(node, Property::FontName(font))?;
    doc.set_property(node, Property::Characters(payload.text_content()))?;
    apply_text_style(doc, node, payload, report)?;
    apply_name(doc, node, payload)?;
    if payload.has_size() {
        doc.set_property(node, Property::TextAutoResize(TextAutoResize::None))?;
    }
    apply_size(doc, node, payload)?;
    apply_position(doc, node, payload)
}

fn configure_shape<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
    report: &mut BuildReport,
) -> Result<(), HostError> {
    apply_name(doc, node, payload)?;
    apply_auto_layout(doc, node, payload, report)?;
    apply_size(doc, node, payload)?;
    apply_position(doc, node, payload)
}

/// Appliers shared by every node kind.
fn apply_styles<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
    report: &mut BuildReport,
) -> Result<(), HostError> {
    apply_corner_radius(doc, node, payload)?;
    apply_fills(doc, node, payload)?;
    apply_effects(doc, node, payload)?;
    apply_layout_participation(doc, node, payload, report)
}

/// Resolve a component reference by key, then by id, else substitute a frame.
async fn resolve_instance<D: Document>(
    doc: &mut D,
    payload: &Payload,
    report: &mut BuildReport,
) -> NodeHandle {
    let mut component: Option<ComponentId> = None;

    if let Some(key) = payload.component_key() {
        match doc.import_component_by_key(key).await {
            Ok(id) => component = Some(id),
            Err(err) => tracing::debug!(key, error = %err, "component import failed"),
        }
    }
    if component.is_none() {
        component = payload.component_id().and_then(|id| doc.component_by_id(id));
    }

    if let Some(component) = component {
        match doc.create_instance(&component) {
            Ok(node) => return node,
            Err(err) => {
                tracing::debug!(component = %component.0, error = %err, "instance creation failed")
            }
        }
    }

    let reference = payload
        .component_key()
        .or(payload.component_id())
        .unwrap_or("<none>");
    report.warn(format!(
        "Component '{reference}' could not be resolved; created a FRAME instead"
    ));
    doc.create_node(NodeKind::Frame)
}
