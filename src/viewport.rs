//! Canvas viewport size and "scroll and zoom into view" framing.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::host::Geometry;

/// Fraction of the viewport left free around a framed selection.
const FRAME_MARGIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440,
            height: 900,
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewportParseError {
    #[error("Invalid viewport format: expected WIDTHxHEIGHT (e.g., 1440x900)")]
    InvalidFormat,
    #[error("Invalid width: {0}")]
    InvalidWidth(String),
    #[error("Invalid height: {0}")]
    InvalidHeight(String),
    #[error("Width must be positive")]
    ZeroWidth,
    #[error("Height must be positive")]
    ZeroHeight,
}

impl FromStr for Viewport {
    type Err = ViewportParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            return Err(ViewportParseError::InvalidFormat);
        }

        let width: u32 = parts[0]
            .trim()
            .parse()
            .map_err(|_| ViewportParseError::InvalidWidth(parts[0].to_string()))?;

        let height: u32 = parts[1]
            .trim()
            .parse()
            .map_err(|_| ViewportParseError::InvalidHeight(parts[1].to_string()))?;

        if width == 0 {
            return Err(ViewportParseError::ZeroWidth);
        }
        if height == 0 {
            return Err(ViewportParseError::ZeroHeight);
        }

        Ok(Viewport { width, height })
    }
}

/// Where the viewport ends up after framing a set of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportFrame {
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
}

impl Viewport {
    /// Frame `bounds` inside the viewport, keeping a margin on every side.
    ///
    /// Zoom never exceeds 1.0, so small selections are centered rather than
    /// magnified.
    pub fn frame(&self, bounds: Option<Geometry>) -> ViewportFrame {
        let Some(bounds) = bounds else {
            return ViewportFrame {
                center_x: 0.0,
                center_y: 0.0,
                zoom: 1.0,
            };
        };

        let usable = 1.0 - 2.0 * FRAME_MARGIN;
        let fit = |available: u32, extent: f64| {
            if extent > 0.0 {
                available as f64 * usable / extent
            } else {
                f64::INFINITY
            }
        };
        let zoom = fit(self.width, bounds.width)
            .min(fit(self.height, bounds.height))
            .min(1.0);

        ViewportFrame {
            center_x: bounds.x + bounds.width / 2.0,
            center_y: bounds.y + bounds.height / 2.0,
            zoom,
        }
    }
}

/// Smallest rectangle containing every rectangle in `rects`.
pub fn union_bounds(rects: impl IntoIterator<Item = Geometry>) -> Option<Geometry> {
    rects.into_iter().fold(None, |acc: Option<Geometry>, r| {
        Some(match acc {
            None => r,
            Some(a) => {
                let min_x = a.x.min(r.x);
                let min_y = a.y.min(r.y);
                let max_x = (a.x + a.width).max(r.x + r.width);
                let max_y = (a.y + a.height).max(r.y + r.height);
                Geometry {
                    x: min_x,
                    y: min_y,
                    width: max_x - min_x,
                    height: max_y - min_y,
                }
            }
        })
    })
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let vp: Viewport = "1440x900".parse().unwrap();
        assert_eq!(vp.width, 1440);
        assert_eq!(vp.height, 900);
    }

    #[test]
    fn test_parse_with_spaces() {
        let vp: Viewport = " 1920 x 1080 ".parse().unwrap();
        assert_eq!(vp.width, 1920);
        assert_eq!(vp.height, 1080);
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!("1440".parse::<Viewport>().is_err());
        assert!("1440x900x600".parse::<Viewport>().is_err());
        assert!("x900".parse::<Viewport>().is_err());
    }

    #[test]
    fn test_parse_invalid_numbers() {
        assert!("abcx900".parse::<Viewport>().is_err());
        assert!("1440xabc".parse::<Viewport>().is_err());
    }

    #[test]
    fn test_parse_zero_dimensions() {
        assert!("0x900".parse::<Viewport>().is_err());
        assert!("1440x0".parse::<Viewport>().is_err());
    }

    #[test]
    fn test_default() {
        let vp = Viewport::default();
        assert_eq!(vp.width, 1440);
        assert_eq!(vp.height, 900);
    }

    #[test]
    fn frame_centers_small_selection_without_magnifying() {
        let vp = Viewport::default();
        let frame = vp.frame(Some(Geometry {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
        }));
        assert_eq!(frame.center_x, 60.0);
        assert_eq!(frame.center_y, 45.0);
        assert_eq!(frame.zoom, 1.0);
    }

    #[test]
    fn frame_zooms_out_to_fit_large_selection() {
        let vp = Viewport {
            width: 1000,
            height: 1000,
        };
        let frame = vp.frame(Some(Geometry {
            x: 0.0,
            y: 0.0,
            width: 4000.0,
            height: 1000.0,
        }));
        assert!((frame.zoom - 0.2).abs() < 1e-9);
    }

    #[test]
    fn frame_without_bounds_is_identity() {
        let frame = Viewport::default().frame(None);
        assert_eq!(frame.zoom, 1.0);
        assert_eq!((frame.center_x, frame.center_y), (0.0, 0.0));
    }

    #[test]
    fn union_bounds_covers_all_rects() {
        let bounds = union_bounds([
            Geometry {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
            },
            Geometry {
                x: 20.0,
                y: -5.0,
                width: 5.0,
                height: 5.0,
            },
        ])
        .expect("bounds");
        assert_eq!(bounds.x, 0.0);
        assert_eq!(bounds.y, -5.0);
        assert_eq!(bounds.width, 25.0);
        assert_eq!(bounds.height, 15.0);
        assert!(union_bounds(Vec::new()).is_none());
    }

    #[test]
    fn test_display() {
        let vp = Viewport {
            width: 1920,
            height: 1080,
        };
        assert_eq!(format!("{}", vp), "1920x1080");
    }
}
