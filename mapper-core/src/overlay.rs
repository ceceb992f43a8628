//! Hover highlight state for the viewport overlay.
//!
//! The UI reports which objects the pointer is over; the overlay keeps that
//! list and turns it into draw primitives. Drawing them is up to the host.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{DocumentAdapter, ObjectId};
use crate::geometry::Shape;

/// Opacity used for shaded highlights.
pub const SHADED_ALPHA: f32 = 0.5;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// A colour string could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid hex colour: {0}")]
pub struct ColorParseError(pub String);

impl Color {
    /// Royal blue, the default highlight.
    pub const ROYAL_BLUE: Self = Self {
        r: 0x41,
        g: 0x69,
        b: 0xE1,
    };

    /// Parse `#RRGGBB` or `RRGGBB`.
    ///
    /// # Errors
    ///
    /// Returns [`ColorParseError`] for anything else.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ColorParseError(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ColorParseError(s.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Format as `#RRGGBB`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::ROYAL_BLUE
    }
}

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// How one highlighted object should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum HighlightPrimitive {
    /// Curve drawn as a wire.
    Wire {
        /// Object to draw.
        id: ObjectId,
        /// Wire colour.
        color: Color,
    },
    /// Mesh, extrusion or brep drawn shaded.
    Shaded {
        /// Object to draw.
        id: ObjectId,
        /// Fill colour.
        color: Color,
        /// Fill opacity.
        alpha: f32,
    },
}

/// Objects currently highlighted in the viewport.
#[derive(Debug, Clone)]
pub struct HighlightOverlay {
    object_ids: Vec<String>,
    color: Color,
    enabled: bool,
}

impl Default for HighlightOverlay {
    fn default() -> Self {
        Self::new(Color::default())
    }
}

impl HighlightOverlay {
    /// Create an enabled overlay with no objects.
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self {
            object_ids: Vec::new(),
            color,
            enabled: true,
        }
    }

    /// Replace the highlighted IDs as received from the UI.
    pub fn set_object_ids(&mut self, ids: Vec<String>) {
        self.object_ids = ids;
    }

    /// Highlighted IDs in UI order.
    #[must_use]
    pub fn object_ids(&self) -> &[String] {
        &self.object_ids
    }

    /// Highlight colour.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Whether the overlay draws at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn drawing on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Draw list for the current frame.
    ///
    /// IDs that fail to parse or no longer resolve are skipped, as are
    /// points, which have nothing to shade.
    pub fn primitives<D: DocumentAdapter + ?Sized>(&self, doc: &D) -> Vec<HighlightPrimitive> {
        if !self.enabled {
            return Vec::new();
        }
        self.object_ids
            .iter()
            .filter_map(|raw| ObjectId::parse(raw).ok())
            .filter_map(|id| doc.find_by_id(id).ok())
            .filter_map(|object| match object.shape {
                Shape::Curve(_) => Some(HighlightPrimitive::Wire {
                    id: object.id,
                    color: self.color,
                }),
                Shape::Mesh | Shape::Extrusion { .. } | Shape::Brep { .. } => {
                    Some(HighlightPrimitive::Shaded {
                        id: object.id,
                        color: self.color,
                        alpha: SHADED_ALPHA,
                    })
                }
                Shape::Point(_) => None,
            })
            .collect()
    }
}
