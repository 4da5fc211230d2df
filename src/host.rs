//! Capability interface to the document that receives built nodes.
//!
//! The builder never inspects node kinds to decide what it may set. Each node
//! carries a [`Capabilities`] set, fixed when the host creates it, and every
//! property applier checks that set before touching the node.

use std::fmt;
use std::ops::BitOr;

use futures::future::LocalBoxFuture;
use palette::Srgb;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a node inside a host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// Identifier of a reusable component known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub String);

/// Closed set of node kinds the builder can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Text,
    Rectangle,
    Ellipse,
    Frame,
    Line,
    Component,
    Instance,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Text => "TEXT",
            NodeKind::Rectangle => "RECTANGLE",
            NodeKind::Ellipse => "ELLIPSE",
            NodeKind::Frame => "FRAME",
            NodeKind::Line => "LINE",
            NodeKind::Component => "COMPONENT",
            NodeKind::Instance => "INSTANCE",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Small bit-set of optional operations a node supports.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u16);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    pub const RESIZE: Capabilities = Capabilities(1 << 0);
    pub const CORNER_RADIUS: Capabilities = Capabilities(1 << 1);
    pub const FILLS: Capabilities = Capabilities(1 << 2);
    pub const EFFECTS: Capabilities = Capabilities(1 << 3);
    pub const AUTO_LAYOUT: Capabilities = Capabilities(1 << 4);
    /// The node accepts appended children.
    pub const CHILDREN: Capabilities = Capabilities(1 << 5);
    /// The node may be appended to a parent.
    pub const APPENDABLE: Capabilities = Capabilities(1 << 6);
    /// The node honors `layoutAlign` / `layoutGrow` inside an auto-layout parent.
    pub const LAYOUT_CHILD: Capabilities = Capabilities(1 << 7);
    pub const TEXT: Capabilities = Capabilities(1 << 8);

    const NAMED: [(Capabilities, &'static str); 9] = [
        (Capabilities::RESIZE, "RESIZE"),
        (Capabilities::CORNER_RADIUS, "CORNER_RADIUS"),
        (Capabilities::FILLS, "FILLS"),
        (Capabilities::EFFECTS, "EFFECTS"),
        (Capabilities::AUTO_LAYOUT, "AUTO_LAYOUT"),
        (Capabilities::CHILDREN, "CHILDREN"),
        (Capabilities::APPENDABLE, "APPENDABLE"),
        (Capabilities::LAYOUT_CHILD, "LAYOUT_CHILD"),
        (Capabilities::TEXT, "TEXT"),
    ];

    pub const fn union(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 | other.0)
    }

    pub const fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capabilities) -> Capabilities {
        self.union(rhs)
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capabilities({})", self.names().join(" | "))
    }
}

/// The builder's handle on a node it is constructing.
///
/// Not `Clone`: whoever holds the handle is the only party still configuring
/// the node. Once the node is appended the document owns it; the handle just
/// lets the caller finish setting layout properties before dropping it.
#[derive(Debug, PartialEq, Eq)]
pub struct NodeHandle {
    id: NodeId,
    kind: NodeKind,
    capabilities: Capabilities,
}

impl NodeHandle {
    pub fn new(id: NodeId, kind: NodeKind, capabilities: Capabilities) -> Self {
        Self {
            id,
            kind,
            capabilities,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn supports(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Current placement and size of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl From<Srgb<f32>> for RgbColor {
    fn from(color: Srgb<f32>) -> Self {
        Self {
            r: color.red,
            g: color.green,
            b: color.blue,
        }
    }
}

impl RgbColor {
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

/// A paint entry in a node's fill list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    #[serde(rename = "type")]
    pub paint_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<RgbColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl Paint {
    pub fn solid(color: RgbColor) -> Self {
        Self {
            paint_type: "SOLID".to_string(),
            color: Some(color),
            opacity: None,
            visible: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    DropShadow,
    InnerShadow,
    LayerBlur,
    BackgroundBlur,
}

impl EffectKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DROP_SHADOW" => Some(EffectKind::DropShadow),
            "INNER_SHADOW" => Some(EffectKind::InnerShadow),
            "LAYER_BLUR" => Some(EffectKind::LayerBlur),
            "BACKGROUND_BLUR" => Some(EffectKind::BackgroundBlur),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

/// A visual effect (shadow or blur).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<RgbColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<Offset>,
    pub radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
    pub visible: bool,
}

impl Effect {
    pub fn drop_shadow(color: RgbColor) -> Self {
        Self {
            kind: EffectKind::DropShadow,
            color: Some(color),
            offset: Some(Offset { x: 0.0, y: 4.0 }),
            radius: 4.0,
            spread: Some(0.0),
            visible: true,
        }
    }
}

/// Font family + style pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }

    /// Parse a `"Family:Style"` spec as used in configuration files.
    pub fn parse_spec(spec: &str) -> Option<Self> {
        let (family, style) = spec.split_once(':')?;
        let (family, style) = (family.trim(), style.trim());
        if family.is_empty() || style.is_empty() {
            return None;
        }
        Some(Self::new(family, style))
    }
}

impl Default for FontName {
    fn default() -> Self {
        Self::new("Inter", "Regular")
    }
}

impl fmt::Display for FontName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineHeight {
    Auto,
    Pixels { value: f64 },
    Percent { value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextAutoResize {
    None,
    Height,
    WidthAndHeight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    None,
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryAxisAlign {
    Min,
    Center,
    Max,
    SpaceBetween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounterAxisAlign {
    Min,
    Center,
    Max,
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisSizing {
    Fixed,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutAlign {
    Inherit,
    Stretch,
    Min,
    Center,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// A typed property assignment on a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Name(String),
    Position { x: f64, y: f64 },
    Size { width: f64, height: f64 },
    CornerRadius(f64),
    Fills(Vec<Paint>),
    Effects(Vec<Effect>),
    LayoutMode(LayoutMode),
    Padding { side: Side, value: f64 },
    ItemSpacing(f64),
    PrimaryAxisAlign(PrimaryAxisAlign),
    CounterAxisAlign(CounterAxisAlign),
    PrimaryAxisSizing(AxisSizing),
    CounterAxisSizing(AxisSizing),
    LayoutAlign(LayoutAlign),
    LayoutGrow(f64),
    FontName(FontName),
    Characters(String),
    FontSize(f64),
    LineHeight(LineHeight),
    TextAutoResize(TextAutoResize),
}

impl Property {
    /// Capability a node must have for this property to apply.
    pub fn required_capability(&self) -> Capabilities {
        match self {
            Property::Name(_) | Property::Position { .. } => Capabilities::NONE,
            Property::Size { .. } => Capabilities::RESIZE,
            Property::CornerRadius(_) => Capabilities::CORNER_RADIUS,
            Property::Fills(_) => Capabilities::FILLS,
            Property::Effects(_) => Capabilities::EFFECTS,
            Property::LayoutMode(_)
            | Property::Padding { .. }
            | Property::ItemSpacing(_)
            | Property::PrimaryAxisAlign(_)
            | Property::CounterAxisAlign(_)
            | Property::PrimaryAxisSizing(_)
            | Property::CounterAxisSizing(_) => Capabilities::AUTO_LAYOUT,
            Property::LayoutAlign(_) | Property::LayoutGrow(_) => Capabilities::LAYOUT_CHILD,
            Property::FontName(_)
            | Property::Characters(_)
            | Property::FontSize(_)
            | Property::LineHeight(_)
            | Property::TextAutoResize(_) => Capabilities::TEXT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Property::Name(_) => "name",
            Property::Position { .. } => "position",
            Property::Size { .. } => "size",
            Property::CornerRadius(_) => "cornerRadius",
            Property::Fills(_) => "fills",
            Property::Effects(_) => "effects",
            Property::LayoutMode(_) => "layoutMode",
            Property::Padding { .. } => "padding",
            Property::ItemSpacing(_) => "itemSpacing",
            Property::PrimaryAxisAlign(_) => "primaryAxisAlignItems",
            Property::CounterAxisAlign(_) => "counterAxisAlignItems",
            Property::PrimaryAxisSizing(_) => "primaryAxisSizingMode",
            Property::CounterAxisSizing(_) => "counterAxisSizingMode",
            Property::LayoutAlign(_) => "layoutAlign",
            Property::LayoutGrow(_) => "layoutGrow",
            Property::FontName(_) => "fontName",
            Property::Characters(_) => "characters",
            Property::FontSize(_) => "fontSize",
            Property::LineHeight(_) => "lineHeight",
            Property::TextAutoResize(_) => "textAutoResize",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("Node {node} ({kind}) does not support property '{property}'")]
    UnsupportedProperty {
        node: NodeId,
        kind: NodeKind,
        property: &'static str,
    },
    #[error("Invalid value for '{property}': {message}")]
    InvalidValue {
        property: &'static str,
        message: String,
    },
    #[error("Node {parent} cannot accept children")]
    NotAContainer { parent: NodeId },
    #[error("Node {child} already has a parent")]
    AlreadyAttached { child: NodeId },
    #[error("Font {0} is not available")]
    FontUnavailable(FontName),
    #[error("Component not found: {0}")]
    ComponentNotFound(String),
}

/// The document the builder writes into.
///
/// Mutation happens on one cooperative task, so async operations hand back
/// non-`Send` futures.
pub trait Document {
    /// Allocate a new, detached node of `kind` with host defaults.
    fn create_node(&mut self, kind: NodeKind) -> NodeHandle;

    /// Allocate a new instance of a resolved component.
    fn create_instance(&mut self, component: &ComponentId) -> Result<NodeHandle, HostError>;

    fn geometry(&self, node: &NodeHandle) -> Geometry;

    fn set_property(&mut self, node: &NodeHandle, property: Property) -> Result<(), HostError>;

    /// Attach `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &NodeHandle, child: &NodeHandle) -> Result<(), HostError>;

    /// Discard a node (and its subtree) whose construction was abandoned.
    fn remove_node(&mut self, node: NodeHandle);

    fn load_font<'a>(&'a mut self, font: &'a FontName) -> LocalBoxFuture<'a, Result<(), HostError>>;

    /// Import a published component by key.
    fn import_component_by_key<'a>(
        &'a mut self,
        key: &'a str,
    ) -> LocalBoxFuture<'a, Result<ComponentId, HostError>>;

    /// Look up a component already present in this document.
    fn component_by_id(&self, id: &str) -> Option<ComponentId>;

    /// Select `nodes` and frame them in the viewport.
    fn focus(&mut self, nodes: &[NodeHandle]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_union_and_contains() {
        let caps = Capabilities::RESIZE | Capabilities::FILLS;
        assert!(caps.contains(Capabilities::RESIZE));
        assert!(caps.contains(Capabilities::FILLS));
        assert!(!caps.contains(Capabilities::TEXT));
        assert!(caps.contains(Capabilities::NONE));
        assert_eq!(caps.names(), vec!["RESIZE", "FILLS"]);
    }

    #[test]
    fn font_spec_parses_family_and_style() {
        assert_eq!(
            FontName::parse_spec("Roboto Mono: Bold"),
            Some(FontName::new("Roboto Mono", "Bold"))
        );
        assert_eq!(FontName::parse_spec("Inter"), None);
        assert_eq!(FontName::parse_spec(":Bold"), None);
    }

    #[test]
    fn rgb_color_to_hex() {
        let color = RgbColor {
            r: 1.0,
            g: 0.5,
            b: 0.0,
        };
        assert_eq!(color.to_hex(), "#ff8000");
    }

    #[test]
    fn property_requirements_follow_capabilities() {
        assert_eq!(
            Property::Fills(vec![]).required_capability(),
            Capabilities::FILLS
        );
        assert_eq!(
            Property::Position { x: 0.0, y: 0.0 }.required_capability(),
            Capabilities::NONE
        );
        assert_eq!(
            Property::ItemSpacing(4.0).required_capability(),
            Capabilities::AUTO_LAYOUT
        );
    }
}
