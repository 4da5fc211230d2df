//! Action verb and node type normalization.

use std::fmt;

use crate::host::NodeKind;

/// Substring hints checked in order; the first hit decides the node kind.
const TYPE_HINTS: [(&str, NodeKind); 7] = [
    ("TEXT", NodeKind::Text),
    ("RECT", NodeKind::Rectangle),
    ("ELLIPSE", NodeKind::Ellipse),
    ("OVAL", NodeKind::Ellipse),
    ("FRAME", NodeKind::Frame),
    ("LINE", NodeKind::Line),
    ("COMPONENT", NodeKind::Component),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionVerb {
    Create,
    /// Any other verb, uppercased.
    Other(String),
}

impl fmt::Display for ActionVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionVerb::Create => f.write_str("CREATE"),
            ActionVerb::Other(verb) => f.write_str(verb),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    Known(NodeKind),
    /// No hint matched; carries the uppercased raw string.
    Unsupported(String),
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Known(kind) => kind.fmt(f),
            NodeType::Unsupported(raw) => f.write_str(raw),
        }
    }
}

/// Canonicalize a free-text verb. A missing verb means `CREATE`.
pub fn normalize_verb(raw: Option<&str>) -> ActionVerb {
    let Some(raw) = raw else {
        return ActionVerb::Create;
    };
    let upper = raw.trim().to_ascii_uppercase();
    if upper.contains("CREATE") || upper.contains("ADD") {
        ActionVerb::Create
    } else {
        ActionVerb::Other(upper)
    }
}

/// Canonicalize a node type from an explicit hint, falling back to the verb string.
pub fn normalize_type(type_hint: Option<&str>, verb_source: Option<&str>) -> NodeType {
    let upper = type_hint
        .or(verb_source)
        .unwrap_or_default()
        .trim()
        .to_ascii_uppercase();

    if let Some((_, kind)) = TYPE_HINTS.iter().find(|(hint, _)| upper.contains(hint)) {
        return NodeType::Known(*kind);
    }
    if upper == NodeKind::Instance.as_str() {
        return NodeType::Known(NodeKind::Instance);
    }
    NodeType::Unsupported(upper)
}
