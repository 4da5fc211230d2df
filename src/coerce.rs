//! Primitive coercions for model-generated values.
//!
//! Everything here is total: malformed input yields a fallback, never an error.

use std::str::FromStr;

use palette::Srgb;
use serde_json::Value;

/// Color used when a hex string cannot be parsed.
pub const FALLBACK_COLOR: Srgb<f32> = Srgb::new(0.0, 0.0, 0.0);

/// Read a finite number out of a JSON value.
///
/// Numbers are taken as-is, strings are trimmed and parsed. Anything else
/// (booleans, null, containers, blank strings) is non-numeric.
pub fn as_number(value: &Value) -> Option<f64> {
    let num = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    num.is_finite().then_some(num)
}

/// Convert `value` to a finite number, or return `fallback`.
pub fn to_number(value: &Value, fallback: f64) -> f64 {
    as_number(value).unwrap_or(fallback)
}

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional) into
/// floating point channels in `[0, 1]`. Alpha is ignored.
///
/// Any other shape yields [`FALLBACK_COLOR`].
pub fn parse_hex_color(value: &str) -> Srgb<f32> {
    try_parse_hex_color(value).unwrap_or(FALLBACK_COLOR)
}

/// Like [`parse_hex_color`], but reports malformed input as `None`.
pub fn try_parse_hex_color(value: &str) -> Option<Srgb<f32>> {
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let rgb = match hex.len() {
        3 | 6 => hex,
        8 => &hex[..6],
        _ => return None,
    };

    Srgb::<u8>::from_str(rgb)
        .ok()
        .map(|color| color.into_format::<f32>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_channels(color: Srgb<f32>, expected: (f32, f32, f32)) {
        assert!((color.red - expected.0).abs() < 1e-3, "red {}", color.red);
        assert!((color.green - expected.1).abs() < 1e-3, "green {}", color.green);
        assert!((color.blue - expected.2).abs() < 1e-3, "blue {}", color.blue);
    }

    #[test]
    fn to_number_accepts_numbers_and_numeric_strings() {
        assert_eq!(to_number(&json!(12), 0.0), 12.0);
        assert_eq!(to_number(&json!(-3.5), 0.0), -3.5);
        assert_eq!(to_number(&json!(" 42 "), 0.0), 42.0);
        assert_eq!(to_number(&json!("1e2"), 0.0), 100.0);
    }

    #[test]
    fn to_number_falls_back_for_non_numeric_input() {
        for value in [
            json!("12px"),
            json!(""),
            json!("   "),
            json!(true),
            json!(null),
            json!([1]),
            json!({"x": 1}),
        ] {
            assert_eq!(to_number(&value, 7.0), 7.0, "input {value}");
        }
    }

    #[test]
    fn to_number_never_returns_non_finite_values() {
        for text in ["NaN", "inf", "-inf", "infinity", "1e400"] {
            let result = to_number(&json!(text), 3.0);
            assert_eq!(result, 3.0, "input {text}");
        }
    }

    #[test]
    fn parse_hex_color_six_digits() {
        assert_channels(parse_hex_color("#ff8000"), (1.0, 128.0 / 255.0, 0.0));
        assert_channels(parse_hex_color("0000FF"), (0.0, 0.0, 1.0));
    }

    #[test]
    fn parse_hex_color_three_digits_duplicates_nibbles() {
        assert_channels(parse_hex_color("#f80"), (1.0, 136.0 / 255.0, 0.0));
    }

    #[test]
    fn parse_hex_color_ignores_alpha() {
        assert_channels(parse_hex_color("#11223300"), (17.0 / 255.0, 34.0 / 255.0, 51.0 / 255.0));
    }

    #[test]
    fn parse_hex_color_falls_back_to_black_for_other_lengths() {
        for input in ["", "#", "#ff", "#ffff", "#fffff", "#fffffff", "#fffffffff", "#ggg"] {
            assert_eq!(parse_hex_color(input), FALLBACK_COLOR, "input {input:?}");
        }
    }

    #[test]
    fn parse_hex_color_channels_stay_in_unit_range() {
        for input in ["fff", "000", "a1b2c3", "FFFFFFFF", "7f7f7f80", "#09F"] {
            let color = parse_hex_color(input);
            for channel in [color.red, color.green, color.blue] {
                assert!((0.0..=1.0).contains(&channel), "{input} -> {channel}");
            }
        }
    }
}
