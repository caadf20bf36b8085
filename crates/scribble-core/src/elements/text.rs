//! Text element.

use super::{ElementId, ElementTrait, SerializableColor, rect_contains_inclusive};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single line of filled text anchored at its baseline origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub(crate) id: ElementId,
    /// Left end of the baseline.
    pub anchor: Point,
    pub content: String,
    pub color: SerializableColor,
    /// Font size in pixels.
    pub font_size: f64,
}

impl Text {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Average advance of a sans-serif glyph, as a fraction of the font size.
    const AVERAGE_CHAR_WIDTH: f64 = 0.52;

    /// Create a new text element.
    pub fn new(anchor: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            anchor,
            content: content.into(),
            color: SerializableColor::black(),
            font_size: Self::DEFAULT_FONT_SIZE,
        }
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Rough width estimate used when no font backend is available.
    pub fn approximate_width(&self) -> f64 {
        self.content.chars().count() as f64 * self.font_size * Self::AVERAGE_CHAR_WIDTH
    }

    /// Box spanning `[x, x + width] × [y − font_size, y]`.
    pub fn bounds_with_width(&self, width: f64) -> Rect {
        Rect::new(
            self.anchor.x,
            self.anchor.y - self.font_size,
            self.anchor.x + width,
            self.anchor.y,
        )
    }

    /// Containment against a measured text width.
    pub fn contains_with_width(&self, point: Point, width: f64) -> bool {
        rect_contains_inclusive(self.bounds_with_width(width), point)
    }
}

impl ElementTrait for Text {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.bounds_with_width(self.approximate_width())
    }

    fn move_center_to(&mut self, point: Point) {
        self.anchor = point;
    }
}
