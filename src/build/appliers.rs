//! Property appliers.
//!
//! Each applier handles one concern, checks the node's capabilities first and
//! does nothing when the node lacks them or the payload lacks the field.
//! Re-applying an applier with the same payload leaves the node unchanged.

use serde_json::Value;

use crate::coerce::to_number;
use crate::host::{Capabilities, Document, HostError, LayoutAlign, NodeHandle, Property, Side};

use super::payload::{Field, Payload};
use super::BuildReport;

/// Resolve a requested dimension against the node's current one.
fn dimension(requested: Option<&Value>, current: f64) -> f64 {
    match requested {
        Some(value) => {
            let size = to_number(value, current);
            if size < 0.0 {
                current
            } else {
                size
            }
        }
        None => current,
    }
}

fn take_field<T>(field: Field<T>, report: &mut BuildReport) -> Option<T> {
    match field {
        Field::Present(value) => Some(value),
        Field::Missing => None,
        Field::Invalid(invalid) => {
            report.warn(format!(
                "Ignoring unknown {} value '{}'",
                invalid.key, invalid.raw
            ));
            None
        }
    }
}

pub fn apply_name<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
) -> Result<(), HostError> {
    match payload.name() {
        Some(name) => doc.set_property(node, Property::Name(name.to_string())),
        None => Ok(()),
    }
}

/// Set `x` / `y`; a missing or non-numeric coordinate keeps its current value.
pub fn apply_position<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
) -> Result<(), HostError> {
    if payload.x().is_none() && payload.y().is_none() {
        return Ok(());
    }
    let current = doc.geometry(node);
    let x = payload.x().map_or(current.x, |v| to_number(v, current.x));
    let y = payload.y().map_or(current.y, |v| to_number(v, current.y));
    doc.set_property(node, Property::Position { x, y })
}

pub fn apply_size<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
) -> Result<(), HostError> {
    if !node.supports(Capabilities::RESIZE) || !payload.has_size() {
        return Ok(());
    }
    let current = doc.geometry(node);
    let width = dimension(payload.width(), current.width);
    let height = dimension(payload.height(), current.height);
    doc.set_property(node, Property::Size { width, height })
}

pub fn apply_corner_radius<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
) -> Result<(), HostError> {
    if !node.supports(Capabilities::CORNER_RADIUS) {
        return Ok(());
    }
    match payload.corner_radius() {
        Some(radius) => doc.set_property(node, Property::CornerRadius(radius)),
        None => Ok(()),
    }
}

pub fn apply_fills<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
) -> Result<(), HostError> {
    if !node.supports(Capabilities::FILLS) {
        return Ok(());
    }
    match payload.fills() {
        Some(fills) => doc.set_property(node, Property::Fills(fills)),
        None => Ok(()),
    }
}

pub fn apply_effects<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
) -> Result<(), HostError> {
    if !node.supports(Capabilities::EFFECTS) {
        return Ok(());
    }
    match payload.effects() {
        Some(effects) => doc.set_property(node, Property::Effects(effects)),
        None => Ok(()),
    }
}

/// Layout mode, padding, spacing, alignment and sizing of an auto-layout container.
pub fn apply_auto_layout<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
    report: &mut BuildReport,
) -> Result<(), HostError> {
    if !node.supports(Capabilities::AUTO_LAYOUT) {
        return Ok(());
    }

    if let Some(mode) = take_field(payload.layout_mode(), report) {
        doc.set_property(node, Property::LayoutMode(mode))?;
    }

    let uniform = payload.padding();
    let sides = [
        (Side::Top, payload.padding_top()),
        (Side::Right, payload.padding_right()),
        (Side::Bottom, payload.padding_bottom()),
        (Side::Left, payload.padding_left()),
    ];
    for (side, specific) in sides {
        match specific.or(uniform) {
            Some(value) if value >= 0.0 => {
                doc.set_property(node, Property::Padding { side, value })?;
            }
            Some(value) => report.warn(format!("Ignoring negative padding {value}")),
            None => {}
        }
    }

    if let Some(spacing) = payload.item_spacing() {
        doc.set_property(node, Property::ItemSpacing(spacing))?;
    }
    if let Some(align) = take_field(payload.primary_axis_align(), report) {
        doc.set_property(node, Property::PrimaryAxisAlign(align))?;
    }
    if let Some(align) = take_field(payload.counter_axis_align(), report) {
        doc.set_property(node, Property::CounterAxisAlign(align))?;
    }
    if let Some(sizing) = take_field(payload.primary_axis_sizing(), report) {
        doc.set_property(node, Property::PrimaryAxisSizing(sizing))?;
    }
    if let Some(sizing) = take_field(payload.counter_axis_sizing(), report) {
        doc.set_property(node, Property::CounterAxisSizing(sizing))?;
    }
    Ok(())
}

/// `layoutAlign` / `layoutGrow` of a node inside an auto-layout parent.
pub fn apply_layout_participation<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
    report: &mut BuildReport,
) -> Result<(), HostError> {
    if !node.supports(Capabilities::LAYOUT_CHILD) {
        return Ok(());
    }
    let align = take_field(payload.layout_align(), report);
    set_layout_participation(doc, node, align, payload.layout_grow())
}

/// Layout participation for a child that was just attached. Invalid values
/// were reported when the child was built and are skipped silently here.
pub fn reapply_layout_participation<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
) -> Result<(), HostError> {
    if !node.supports(Capabilities::LAYOUT_CHILD) {
        return Ok(());
    }
    let align = match payload.layout_align() {
        Field::Present(align) => Some(align),
        Field::Missing | Field::Invalid(_) => None,
    };
    set_layout_participation(doc, node, align, payload.layout_grow())
}

fn set_layout_participation<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    align: Option<LayoutAlign>,
    grow: Option<f64>,
) -> Result<(), HostError> {
    if let Some(align) = align {
        doc.set_property(node, Property::LayoutAlign(align))?;
    }
    if let Some(grow) = grow {
        doc.set_property(node, Property::LayoutGrow(grow))?;
    }
    Ok(())
}

/// Font size and line height. The font itself is set by the factory once loaded.
pub fn apply_text_style<D: Document>(
    doc: &mut D,
    node: &NodeHandle,
    payload: &Payload,
    report: &mut BuildReport,
) -> Result<(), HostError> {
    if !node.supports(Capabilities::TEXT) {
        return Ok(());
    }
    if let Some(size) = payload.font_size() {
        doc.set_property(node, Property::FontSize(size))?;
    }
    if let Some(line_height) = take_field(payload.line_height(), report) {
        doc.set_property(node, Property::LineHeight(line_height))?;
    }
    Ok(())
}
