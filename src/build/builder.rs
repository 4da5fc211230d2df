//! Recursive builder over action lists.

use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;

use crate::host::{Capabilities, Document, NodeHandle};
use crate::ProgressCallback;

use super::appliers::reapply_layout_participation;
use super::factory;
use super::normalize::{normalize_type, normalize_verb, ActionVerb};
use super::payload::extract_payload;
use super::{ActionOutcome, BuildFailure, BuildOptions, BuildReport, SkipReason};

/// Build every action in `actions` as a root-level node.
///
/// Never fails: rejected or failed actions are counted and logged, and the
/// remaining actions still run. Built root nodes keep input order.
pub async fn build_actions<D: Document>(
    doc: &mut D,
    actions: &[Value],
    options: &BuildOptions,
    progress: Option<&ProgressCallback>,
) -> BuildReport {
    let mut report = BuildReport::default();
    let total = actions.len();

    for (index, action) in actions.iter().enumerate() {
        if let Some(cb) = progress {
            cb(&format!("Building action {}/{}...", index + 1, total));
        }
        let outcome = build_action(doc, action, None, options, &mut report).await;
        if let Some(node) = outcome.node() {
            report.nodes.push(node);
        }
    }

    tracing::info!(
        actions = total,
        built = report.built,
        skipped = report.skipped,
        failed = report.failed,
        "build finished"
    );
    report
}

/// Build one action, attach it to `parent` when possible, then build its children.
pub fn build_action<'a, D: Document>(
    doc: &'a mut D,
    action: &'a Value,
    parent: Option<&'a NodeHandle>,
    options: &'a BuildOptions,
    report: &'a mut BuildReport,
) -> LocalBoxFuture<'a, ActionOutcome> {
    async move {
        let outcome = build_one(doc, action, parent, options, report).await;
        report.record(&outcome);
        match &outcome {
            ActionOutcome::Built(_) => {}
            ActionOutcome::Skipped(reason) => report.warn(format!("Skipped action: {reason}")),
            ActionOutcome::Failed(failure) => report.warn(format!("Action failed: {failure}")),
        }
        outcome
    }
    .boxed_local()
}

async fn build_one<D: Document>(
    doc: &mut D,
    action: &Value,
    parent: Option<&NodeHandle>,
    options: &BuildOptions,
    report: &mut BuildReport,
) -> ActionOutcome {
    let Some(payload) = extract_payload(action) else {
        return ActionOutcome::Skipped(SkipReason::InvalidPayload);
    };
    let fields = Value::Object(payload.as_map().clone());
    tracing::debug!(payload = %fields, "building action");

    if let ActionVerb::Other(verb) = normalize_verb(payload.verb_source()) {
        return ActionOutcome::Skipped(SkipReason::UnsupportedAction(verb));
    }
    let node_type = normalize_type(payload.type_source(), payload.verb_source());

    let node = match factory::create_node(doc, &node_type, &payload, options, report).await {
        ActionOutcome::Built(node) => node,
        other => return other,
    };

    if let Some(parent) = parent {
        if parent.supports(Capabilities::CHILDREN) && node.supports(Capabilities::APPENDABLE) {
            if let Err(err) = doc.append_child(parent, &node) {
                doc.remove_node(node);
                return ActionOutcome::Failed(BuildFailure::Host(err));
            }
        }
    }

    for child in payload.children() {
        let outcome = build_action(&mut *doc, child, Some(&node), options, &mut *report).await;
        let Some(child_node) = outcome.node() else {
            continue;
        };
        // Layout participation again now that the child sits inside its parent.
        if let Some(child_payload) = extract_payload(child) {
            if let Err(err) = reapply_layout_participation(doc, &child_node, &child_payload) {
                report.warn(format!(
                    "Could not apply layout properties to {}: {err}",
                    child_node.id()
                ));
            }
        }
    }

    ActionOutcome::Built(node)
}
