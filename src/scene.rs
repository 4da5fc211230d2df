//! In-memory host document.
//!
//! [`SceneDocument`] implements [`Document`] with the same capability rules a
//! design tool enforces, so the builder can run from the CLI and in tests.

use std::collections::{BTreeMap, HashSet};

use futures::future::{self, FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::host::{
    AxisSizing, Capabilities, ComponentId, CounterAxisAlign, Document, Effect, FontName, Geometry,
    HostError, LayoutAlign, LayoutMode, LineHeight, NodeHandle, NodeId, NodeKind, Paint,
    PrimaryAxisAlign, Property, Side, TextAutoResize,
};
use crate::viewport::{union_bounds, Viewport, ViewportFrame};

const DEFAULT_SHAPE_SIZE: f64 = 100.0;
const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Capability set the in-memory document grants each node kind.
pub fn capabilities_for(kind: NodeKind) -> Capabilities {
    let shape = Capabilities::RESIZE
        | Capabilities::EFFECTS
        | Capabilities::APPENDABLE
        | Capabilities::LAYOUT_CHILD;
    let container = shape
        | Capabilities::CORNER_RADIUS
        | Capabilities::FILLS
        | Capabilities::AUTO_LAYOUT;

    match kind {
        NodeKind::Text => shape | Capabilities::FILLS | Capabilities::TEXT,
        NodeKind::Rectangle => shape | Capabilities::CORNER_RADIUS | Capabilities::FILLS,
        NodeKind::Ellipse => shape | Capabilities::FILLS,
        NodeKind::Line => shape,
        NodeKind::Frame | NodeKind::Component => container | Capabilities::CHILDREN,
        NodeKind::Instance => container,
    }
}

fn default_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Text => "Text",
        NodeKind::Rectangle => "Rectangle",
        NodeKind::Ellipse => "Ellipse",
        NodeKind::Frame => "Frame",
        NodeKind::Line => "Line",
        NodeKind::Component => "Component",
        NodeKind::Instance => "Instance",
    }
}

/// A reusable component the document can resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDef {
    pub id: String,
    /// Publish key; components without one can only be found by id.
    #[serde(default)]
    pub key: Option<String>,
    pub name: String,
    #[serde(default = "default_component_size")]
    pub width: f64,
    #[serde(default = "default_component_size")]
    pub height: f64,
}

fn default_component_size() -> f64 {
    DEFAULT_SHAPE_SIZE
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoLayout {
    pub mode: Option<LayoutMode>,
    pub padding_top: Option<f64>,
    pub padding_right: Option<f64>,
    pub padding_bottom: Option<f64>,
    pub padding_left: Option<f64>,
    pub item_spacing: Option<f64>,
    pub primary_axis_align: Option<PrimaryAxisAlign>,
    pub counter_axis_align: Option<CounterAxisAlign>,
    pub primary_axis_sizing: Option<AxisSizing>,
    pub counter_axis_sizing: Option<AxisSizing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub characters: String,
    pub font_name: FontName,
    pub font_size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<LineHeight>,
    pub auto_resize: TextAutoResize,
}

/// One node of the in-memory document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fills: Vec<Paint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_layout: Option<AutoLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_align: Option<LayoutAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_grow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextProps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentId>,
    #[serde(skip)]
    pub parent: Option<NodeId>,
    #[serde(skip)]
    pub children: Vec<NodeId>,
}

impl SceneNode {
    fn new(id: NodeId, kind: NodeKind) -> Self {
        let (width, height) = match kind {
            NodeKind::Text => (0.0, 0.0),
            _ => (DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_SIZE),
        };
        let text = (kind == NodeKind::Text).then(|| TextProps {
            characters: String::new(),
            font_name: FontName::default(),
            font_size: DEFAULT_FONT_SIZE,
            line_height: None,
            auto_resize: TextAutoResize::WidthAndHeight,
        });

        Self {
            id,
            kind,
            name: default_name(kind).to_string(),
            x: 0.0,
            y: 0.0,
            width,
            height,
            corner_radius: None,
            fills: Vec::new(),
            effects: Vec::new(),
            auto_layout: None,
            layout_align: None,
            layout_grow: None,
            text,
            component: None,
            parent: None,
            children: Vec::new(),
        }
    }

    fn geometry(&self) -> Geometry {
        Geometry {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    fn layout_mut(&mut self) -> &mut AutoLayout {
        self.auto_layout.get_or_insert_with(Default::default)
    }

    /// Rough text box estimate so auto-sized text has non-zero bounds.
    fn refit_text(&mut self) {
        let Some(text) = &self.text else { return };
        let line_height = match text.line_height {
            Some(LineHeight::Pixels { value }) => value,
            Some(LineHeight::Percent { value }) => text.font_size * value / 100.0,
            Some(LineHeight::Auto) | None => text.font_size * 1.2,
        };
        let lines = text.characters.lines().count().max(1) as f64;
        let longest = text
            .characters
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as f64;

        match text.auto_resize {
            TextAutoResize::WidthAndHeight => {
                self.width = longest * text.font_size * 0.6;
                self.height = lines * line_height;
            }
            TextAutoResize::Height => self.height = lines * line_height,
            TextAutoResize::None => {}
        }
    }
}

/// Serializable tree view of a node and its descendants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneTree {
    #[serde(flatten)]
    pub node: SceneNode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneTree>,
}

/// Serializable view of the whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub viewport: Viewport,
    pub nodes: Vec<SceneTree>,
    #[serde(default)]
    pub selection: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<ViewportFrame>,
}

#[derive(Debug, Clone)]
pub struct SceneDocument {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u64,
    available_fonts: HashSet<FontName>,
    loaded_fonts: HashSet<FontName>,
    components: Vec<ComponentDef>,
    selection: Vec<NodeId>,
    viewport: Viewport,
    frame: Option<ViewportFrame>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl SceneDocument {
    /// Empty document with the stock Inter / Roboto fonts installed.
    pub fn new(viewport: Viewport) -> Self {
        let fonts = [
            FontName::new("Inter", "Regular"),
            FontName::new("Inter", "Medium"),
            FontName::new("Inter", "Bold"),
            FontName::new("Roboto", "Regular"),
        ];
        Self::with_fonts(viewport, fonts)
    }

    pub fn with_fonts(viewport: Viewport, fonts: impl IntoIterator<Item = FontName>) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
            available_fonts: fonts.into_iter().collect(),
            loaded_fonts: HashSet::new(),
            components: Vec::new(),
            selection: Vec::new(),
            viewport,
            frame: None,
        }
    }

    pub fn register_component(&mut self, component: ComponentDef) {
        self.components.push(component);
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn children_of(&self, id: NodeId) -> Vec<&SceneNode> {
        self.nodes
            .get(&id)
            .map(|n| n.children.iter().filter_map(|c| self.nodes.get(c)).collect())
            .unwrap_or_default()
    }

    pub fn roots(&self) -> Vec<&SceneNode> {
        self.nodes.values().filter(|n| n.parent.is_none()).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn frame(&self) -> Option<ViewportFrame> {
        self.frame
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            viewport: self.viewport,
            nodes: self.roots().into_iter().map(|n| self.subtree(n)).collect(),
            selection: self.selection.clone(),
            frame: self.frame,
        }
    }

    fn subtree(&self, node: &SceneNode) -> SceneTree {
        SceneTree {
            node: node.clone(),
            children: self
                .children_of(node.id)
                .into_iter()
                .map(|c| self.subtree(c))
                .collect(),
        }
    }

    fn allocate(&mut self, kind: NodeKind) -> NodeHandle {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, SceneNode::new(id, kind));
        NodeHandle::new(id, kind, capabilities_for(kind))
    }

    fn absolute_geometry(&self, id: NodeId) -> Option<Geometry> {
        let node = self.nodes.get(&id)?;
        let mut geometry = node.geometry();
        let mut parent = node.parent;
        while let Some(pid) = parent {
            let p = self.nodes.get(&pid)?;
            geometry.x += p.x;
            geometry.y += p.y;
            parent = p.parent;
        }
        Some(geometry)
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = self.nodes.get(&of).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }
}

fn non_negative(property: &'static str, value: f64) -> Result<f64, HostError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(HostError::InvalidValue {
            property,
            message: format!("expected a non-negative number, got {value}"),
        })
    }
}

impl Document for SceneDocument {
    fn create_node(&mut self, kind: NodeKind) -> NodeHandle {
        self.allocate(kind)
    }

    fn create_instance(&mut self, component: &ComponentId) -> Result<NodeHandle, HostError> {
        let def = self
            .components
            .iter()
            .find(|c| c.id == component.0)
            .cloned()
            .ok_or_else(|| HostError::ComponentNotFound(component.0.clone()))?;

        let handle = self.allocate(NodeKind::Instance);
        if let Some(node) = self.nodes.get_mut(&handle.id()) {
            node.name = def.name;
            node.width = def.width;
            node.height = def.height;
            node.component = Some(component.clone());
        }
        Ok(handle)
    }

    fn geometry(&self, node: &NodeHandle) -> Geometry {
        self.nodes
            .get(&node.id())
            .map(SceneNode::geometry)
            .unwrap_or_default()
    }

    fn set_property(&mut self, handle: &NodeHandle, property: Property) -> Result<(), HostError> {
        let required = property.required_capability();
        let loaded_fonts = &self.loaded_fonts;
        let node = self
            .nodes
            .get_mut(&handle.id())
            .ok_or(HostError::UnknownNode(handle.id()))?;

        if !capabilities_for(node.kind).contains(required) {
            return Err(HostError::UnsupportedProperty {
                node: node.id,
                kind: node.kind,
                property: property.name(),
            });
        }

        match property {
            Property::Name(name) => node.name = name,
            Property::Position { x, y } => {
                node.x = x;
                node.y = y;
            }
            Property::Size { width, height } => {
                node.width = non_negative("width", width)?;
                node.height = non_negative("height", height)?;
            }
            Property::CornerRadius(radius) => {
                node.corner_radius = Some(non_negative("cornerRadius", radius)?)
            }
            Property::Fills(fills) => node.fills = fills,
            Property::Effects(effects) => node.effects = effects,
            Property::LayoutMode(mode) => node.layout_mut().mode = Some(mode),
            Property::Padding { side, value } => {
                let value = non_negative("padding", value)?;
                let layout = node.layout_mut();
                match side {
                    Side::Top => layout.padding_top = Some(value),
                    Side::Right => layout.padding_right = Some(value),
                    Side::Bottom => layout.padding_bottom = Some(value),
                    Side::Left => layout.padding_left = Some(value),
                }
            }
            Property::ItemSpacing(spacing) => {
                node.layout_mut().item_spacing = Some(spacing)
            }
            Property::PrimaryAxisAlign(align) => {
                node.layout_mut().primary_axis_align = Some(align)
            }
            Property::CounterAxisAlign(align) => {
                node.layout_mut().counter_axis_align = Some(align)
            }
            Property::PrimaryAxisSizing(sizing) => {
                node.layout_mut().primary_axis_sizing = Some(sizing)
            }
            Property::CounterAxisSizing(sizing) => {
                node.layout_mut().counter_axis_sizing = Some(sizing)
            }
            Property::LayoutAlign(align) => node.layout_align = Some(align),
            Property::LayoutGrow(grow) => {
                node.layout_grow = Some(non_negative("layoutGrow", grow)?)
            }
            Property::FontName(font) => {
                if !loaded_fonts.contains(&font) {
                    return Err(HostError::FontUnavailable(font));
                }
                if let Some(text) = node.text.as_mut() {
                    text.font_name = font;
                }
                node.refit_text();
            }
            Property::Characters(characters) => {
                if let Some(text) = node.text.as_mut() {
                    if !loaded_fonts.contains(&text.font_name) {
                        return Err(HostError::InvalidValue {
                            property: "characters",
                            message: format!("font {} has not been loaded", text.font_name),
                        });
                    }
                    text.characters = characters;
                }
                node.refit_text();
            }
            Property::FontSize(size) => {
                if !(size.is_finite() && size > 0.0) {
                    return Err(HostError::InvalidValue {
                        property: "fontSize",
                        message: format!("expected a positive number, got {size}"),
                    });
                }
                if let Some(text) = node.text.as_mut() {
                    text.font_size = size;
                }
                node.refit_text();
            }
            Property::LineHeight(line_height) => {
                if let Some(text) = node.text.as_mut() {
                    text.line_height = Some(line_height);
                }
                node.refit_text();
            }
            Property::TextAutoResize(mode) => {
                if let Some(text) = node.text.as_mut() {
                    text.auto_resize = mode;
                }
            }
        }
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeHandle, child: &NodeHandle) -> Result<(), HostError> {
        if !parent.supports(Capabilities::CHILDREN) {
            return Err(HostError::NotAContainer {
                parent: parent.id(),
            });
        }
        if parent.id() == child.id() || self.is_ancestor(child.id(), parent.id()) {
            return Err(HostError::InvalidValue {
                property: "children",
                message: format!(
                    "appending {} to {} would create a cycle",
                    child.id(),
                    parent.id()
                ),
            });
        }
        if !self.nodes.contains_key(&parent.id()) {
            return Err(HostError::UnknownNode(parent.id()));
        }

        let child_node = self
            .nodes
            .get_mut(&child.id())
            .ok_or(HostError::UnknownNode(child.id()))?;
        if child_node.parent.is_some() {
            return Err(HostError::AlreadyAttached { child: child.id() });
        }
        child_node.parent = Some(parent.id());

        if let Some(parent_node) = self.nodes.get_mut(&parent.id()) {
            parent_node.children.push(child.id());
        }
        Ok(())
    }

    fn remove_node(&mut self, node: NodeHandle) {
        let id = node.id();
        if let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|c| *c != id);
            }
        }
        self.remove_subtree(id);
        self.selection.retain(|s| *s != id);
    }

    fn load_font<'a>(
        &'a mut self,
        font: &'a FontName,
    ) -> LocalBoxFuture<'a, Result<(), HostError>> {
        let result = if self.available_fonts.contains(font) {
            self.loaded_fonts.insert(font.clone());
            Ok(())
        } else {
            Err(HostError::FontUnavailable(font.clone()))
        };
        future::ready(result).boxed_local()
    }

    fn import_component_by_key<'a>(
        &'a mut self,
        key: &'a str,
    ) -> LocalBoxFuture<'a, Result<ComponentId, HostError>> {
        let result = self
            .components
            .iter()
            .find(|c| c.key.as_deref() == Some(key))
            .map(|c| ComponentId(c.id.clone()))
            .ok_or_else(|| HostError::ComponentNotFound(key.to_string()));
        future::ready(result).boxed_local()
    }

    fn component_by_id(&self, id: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .find(|c| c.id == id)
            .map(|c| ComponentId(c.id.clone()))
    }

    fn focus(&mut self, nodes: &[NodeHandle]) {
        self.selection = nodes.iter().map(NodeHandle::id).collect();
        let bounds = union_bounds(
            self.selection
                .iter()
                .filter_map(|id| self.absolute_geometry(*id)),
        );
        self.frame = Some(self.viewport.frame(bounds));
    }
}
