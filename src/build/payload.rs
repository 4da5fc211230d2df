//! Payload extraction and typed field access.
//!
//! [`extract_payload`] unwraps one level of envelope around an action. The
//! resulting [`Payload`] exposes every field through an explicit, ordered
//! lookup so fallback chains stay testable.

use serde_json::{Map, Value};

use crate::coerce::{as_number, try_parse_hex_color};
use crate::host::{
    AxisSizing, CounterAxisAlign, Effect, EffectKind, FontName, LayoutAlign, LayoutMode,
    LineHeight, Offset, Paint, PrimaryAxisAlign, RgbColor,
};

/// Keys an upstream model may wrap the real instruction under, in priority order.
pub const WRAPPER_KEYS: [&str; 5] = ["create", "payload", "node", "element", "action"];

const VERB_KEYS: [&str; 4] = ["action", "operation", "op", "actionType"];
const TYPE_KEYS: [&str; 3] = ["type", "nodeType", "kind"];
const TEXT_KEYS: [&str; 4] = ["characters", "text", "content", "name"];

/// Normalize a raw action into a payload object, or reject it.
///
/// Strings must hold a JSON object literal. Objects carrying one of
/// [`WRAPPER_KEYS`] with an object value are unwrapped exactly one level;
/// an envelope that still wraps another envelope is rejected.
pub fn extract_payload(raw: &Value) -> Option<Payload> {
    match raw {
        Value::String(text) => {
            let text = text.trim();
            if !(text.starts_with('{') && text.ends_with('}')) {
                return None;
            }
            match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => Some(Payload::new(map)),
                _ => None,
            }
        }
        Value::Object(map) => match wrapped(map) {
            Some(inner) if wrapped(inner).is_some() => None,
            Some(inner) => Some(Payload::new(inner.clone())),
            None => Some(Payload::new(map.clone())),
        },
        _ => None,
    }
}

fn wrapped(map: &Map<String, Value>) -> Option<&Map<String, Value>> {
    WRAPPER_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_object))
}

/// A field that was looked up and could not be interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidField {
    pub key: &'static str,
    pub raw: String,
}

impl InvalidField {
    fn new(key: &'static str, raw: &Value) -> Self {
        let raw = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self { key, raw }
    }
}

/// Result of looking up an enumerated field.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Missing,
    Present(T),
    Invalid(InvalidField),
}

impl<T> Field<T> {
    pub fn present(self) -> Option<T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }
}

/// The canonical form of one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|key| self.get(key))
    }

    fn first_string(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key).and_then(Value::as_str))
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(as_number)
    }

    fn enumerated<T>(&self, key: &'static str, parse: impl Fn(&str) -> Option<T>) -> Field<T> {
        match self.get(key) {
            None => Field::Missing,
            Some(value) => {
                let parsed = value
                    .as_str()
                    .and_then(|s| parse(&s.trim().to_ascii_uppercase()));
                match parsed {
                    Some(parsed) => Field::Present(parsed),
                    None => Field::Invalid(InvalidField::new(key, value)),
                }
            }
        }
    }

    /// Raw action verb: `action`, `operation`, `op`, `actionType`.
    pub fn verb_source(&self) -> Option<&str> {
        self.first_string(&VERB_KEYS)
    }

    /// Raw node type hint: `type`, `nodeType`, `kind`.
    pub fn type_source(&self) -> Option<&str> {
        self.first_string(&TYPE_KEYS)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn x(&self) -> Option<&Value> {
        self.get("x")
    }

    pub fn y(&self) -> Option<&Value> {
        self.get("y")
    }

    /// `w`, then `width`.
    pub fn width(&self) -> Option<&Value> {
        self.first_present(&["w", "width"])
    }

    /// `h`, then `height`.
    pub fn height(&self) -> Option<&Value> {
        self.first_present(&["h", "height"])
    }

    pub fn has_size(&self) -> bool {
        self.width().is_some() || self.height().is_some()
    }

    /// Text content: `characters`, `text`, `content`, `name`, then `"Text"`.
    pub fn text_content(&self) -> String {
        TEXT_KEYS
            .iter()
            .find_map(|key| match self.get(key)? {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| "Text".to_string())
    }

    /// Explicit `{family, style}` font descriptor, if well formed.
    pub fn font_name(&self) -> Option<FontName> {
        let font = self.get("fontName")?.as_object()?;
        let family = font.get("family")?.as_str()?.trim();
        let style = font.get("style")?.as_str()?.trim();
        if family.is_empty() || style.is_empty() {
            return None;
        }
        Some(FontName::new(family, style))
    }

    pub fn font_size(&self) -> Option<f64> {
        self.number("fontSize").filter(|size| *size > 0.0)
    }

    pub fn line_height(&self) -> Field<LineHeight> {
        let Some(value) = self.get("lineHeight") else {
            return Field::Missing;
        };
        if let Some(pixels) = as_number(value) {
            return Field::Present(LineHeight::Pixels { value: pixels });
        }
        let parsed = match value {
            Value::String(s) if s.trim().eq_ignore_ascii_case("auto") => Some(LineHeight::Auto),
            Value::Object(map) => {
                let unit = map
                    .get("unit")
                    .and_then(Value::as_str)
                    .map(|u| u.trim().to_ascii_uppercase());
                let amount = map.get("value").and_then(as_number);
                match (unit.as_deref(), amount) {
                    (Some("AUTO"), _) => Some(LineHeight::Auto),
                    (Some("PIXELS"), Some(value)) => Some(LineHeight::Pixels { value }),
                    (Some("PERCENT"), Some(value)) => Some(LineHeight::Percent { value }),
                    _ => None,
                }
            }
            _ => None,
        };
        match parsed {
            Some(line_height) => Field::Present(line_height),
            None => Field::Invalid(InvalidField::new("lineHeight", value)),
        }
    }

    /// `cornerRadius`, clamped at zero.
    pub fn corner_radius(&self) -> Option<f64> {
        self.number("cornerRadius").map(|r| r.max(0.0))
    }

    /// Fill descriptors. `None` when the field is absent; invalid entries are dropped.
    pub fn fills(&self) -> Option<Vec<Paint>> {
        let entries = as_list(self.get("fills")?);
        Some(entries.iter().filter_map(|e| paint_from(e)).collect())
    }

    /// Effect descriptors. `None` when the field is absent; invalid entries are dropped.
    pub fn effects(&self) -> Option<Vec<Effect>> {
        let entries = as_list(self.get("effects")?);
        Some(entries.iter().filter_map(|e| effect_from(e)).collect())
    }

    pub fn layout_mode(&self) -> Field<LayoutMode> {
        self.enumerated("layoutMode", |s| match s {
            "HORIZONTAL" | "ROW" => Some(LayoutMode::Horizontal),
            "VERTICAL" | "COLUMN" => Some(LayoutMode::Vertical),
            "NONE" => Some(LayoutMode::None),
            _ => None,
        })
    }

    /// Uniform `padding`.
    pub fn padding(&self) -> Option<f64> {
        self.number("padding")
    }

    pub fn padding_top(&self) -> Option<f64> {
        self.number("paddingTop")
    }

    pub fn padding_right(&self) -> Option<f64> {
        self.number("paddingRight")
    }

    pub fn padding_bottom(&self) -> Option<f64> {
        self.number("paddingBottom")
    }

    pub fn padding_left(&self) -> Option<f64> {
        self.number("paddingLeft")
    }

    pub fn item_spacing(&self) -> Option<f64> {
        self.number("itemSpacing")
    }

    pub fn primary_axis_align(&self) -> Field<PrimaryAxisAlign> {
        self.enumerated("primaryAxisAlignItems", |s| match s {
            "MIN" => Some(PrimaryAxisAlign::Min),
            "CENTER" => Some(PrimaryAxisAlign::Center),
            "MAX" => Some(PrimaryAxisAlign::Max),
            "SPACE_BETWEEN" => Some(PrimaryAxisAlign::SpaceBetween),
            _ => None,
        })
    }

    pub fn counter_axis_align(&self) -> Field<CounterAxisAlign> {
        self.enumerated("counterAxisAlignItems", |s| match s {
            "MIN" => Some(CounterAxisAlign::Min),
            "CENTER" => Some(CounterAxisAlign::Center),
            "MAX" => Some(CounterAxisAlign::Max),
            "BASELINE" => Some(CounterAxisAlign::Baseline),
            _ => None,
        })
    }

    pub fn primary_axis_sizing(&self) -> Field<AxisSizing> {
        self.enumerated("primaryAxisSizingMode", parse_axis_sizing)
    }

    pub fn counter_axis_sizing(&self) -> Field<AxisSizing> {
        self.enumerated("counterAxisSizingMode", parse_axis_sizing)
    }

    pub fn layout_align(&self) -> Field<LayoutAlign> {
        self.enumerated("layoutAlign", |s| match s {
            "INHERIT" => Some(LayoutAlign::Inherit),
            "STRETCH" => Some(LayoutAlign::Stretch),
            "MIN" => Some(LayoutAlign::Min),
            "CENTER" => Some(LayoutAlign::Center),
            "MAX" => Some(LayoutAlign::Max),
            _ => None,
        })
    }

    pub fn layout_grow(&self) -> Option<f64> {
        self.number("layoutGrow").filter(|g| *g >= 0.0)
    }

    pub fn component_key(&self) -> Option<&str> {
        self.get("componentKey")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn component_id(&self) -> Option<&str> {
        self.get("componentId")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn children(&self) -> &[Value] {
        self.get("children")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn parse_axis_sizing(value: &str) -> Option<AxisSizing> {
    match value {
        "FIXED" => Some(AxisSizing::Fixed),
        "AUTO" => Some(AxisSizing::Auto),
        _ => None,
    }
}

fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    }
}

fn color_from(value: &Value) -> Option<RgbColor> {
    match value {
        Value::String(hex) => try_parse_hex_color(hex).map(RgbColor::from),
        Value::Object(map) => {
            let channel = |key: &str| {
                map.get(key)
                    .and_then(as_number)
                    .map(|v| v.clamp(0.0, 1.0) as f32)
            };
            Some(RgbColor {
                r: channel("r")?,
                g: channel("g")?,
                b: channel("b")?,
            })
        }
        _ => None,
    }
}

fn paint_from(entry: &Value) -> Option<Paint> {
    match entry {
        Value::String(hex) => try_parse_hex_color(hex).map(|c| Paint::solid(c.into())),
        Value::Object(map) => {
            let paint_type = map.get("type")?.as_str()?.trim().to_ascii_uppercase();
            if paint_type.is_empty() {
                return None;
            }
            Some(Paint {
                paint_type,
                color: map.get("color").and_then(color_from),
                opacity: map.get("opacity").and_then(as_number).map(|o| o.clamp(0.0, 1.0)),
                visible: map.get("visible").and_then(Value::as_bool),
            })
        }
        _ => None,
    }
}

fn effect_from(entry: &Value) -> Option<Effect> {
    match entry {
        Value::String(hex) => try_parse_hex_color(hex).map(|c| Effect::drop_shadow(c.into())),
        Value::Object(map) => {
            let kind = EffectKind::parse(map.get("type")?.as_str()?)?;
            let shadow = matches!(kind, EffectKind::DropShadow | EffectKind::InnerShadow);
            let offset = map.get("offset").and_then(Value::as_object).map(|o| Offset {
                x: o.get("x").and_then(as_number).unwrap_or(0.0),
                y: o.get("y").and_then(as_number).unwrap_or(0.0),
            });
            let color = map.get("color").and_then(color_from);
            Some(Effect {
                kind,
                color: if shadow {
                    color.or(Some(RgbColor { r: 0.0, g: 0.0, b: 0.0 }))
                } else {
                    None
                },
                offset: if shadow {
                    offset.or(Some(Offset { x: 0.0, y: 4.0 }))
                } else {
                    None
                },
                radius: map
                    .get("radius")
                    .and_then(as_number)
                    .map(|r| r.max(0.0))
                    .unwrap_or(4.0),
                spread: map.get("spread").and_then(as_number).filter(|_| shadow),
                visible: map.get("visible").and_then(Value::as_bool).unwrap_or(true),
            })
        }
        _ => None,
    }
}
