//! Drawable element definitions for the whiteboard.

mod circle;
mod image;
mod rectangle;
mod stroke;
mod text;

pub use circle::Circle;
pub use image::{Bitmap, Image, ImageFormat};
pub use rectangle::Rectangle;
pub use stroke::Stroke;
pub use text::Text;

use crate::tools::ToolKind;
use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Read an element id. Older records used timestamp strings rather than UUIDs;
/// those get a fresh id.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<ElementId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::new_v4())),
        serde_json::Value::Number(_) => Ok(Uuid::new_v4()),
        other => Err(serde::de::Error::custom(format!("invalid element id: {other}"))),
    }
}

/// Error returned when a color string is not `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color: {0}")]
pub struct ColorParseError(pub String);

/// Serializable color representation (RGBA8), stored as a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        // from_str_radix alone would accept a leading '+'.
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or(ColorParseError(value))
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Axis-aligned rect spanned by a corner and a signed extent, with min/max normalized.
pub(crate) fn normalized_rect(origin: Point, width: f64, height: f64) -> Rect {
    let x1 = origin.x + width;
    let y1 = origin.y + height;
    Rect::new(
        origin.x.min(x1),
        origin.y.min(y1),
        origin.x.max(x1),
        origin.y.max(y1),
    )
}

/// Closed containment test (edges count as inside).
pub(crate) fn rect_contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Common trait for all elements.
pub trait ElementTrait {
    /// Get the unique identifier.
    fn id(&self) -> ElementId;

    /// Get the normalized bounding box.
    fn bounds(&self) -> Rect;

    /// Reposition so the element's center follows `point`.
    fn move_center_to(&mut self, point: Point);
}

/// A drawable element. Variant order has no meaning; list order is paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    #[serde(rename = "pencil")]
    Stroke(Stroke),
    /// A stroke painted in the canvas background color. Its own color is unused.
    Eraser(Stroke),
    Rectangle(Rectangle),
    Circle(Circle),
    Text(Text),
    Image(Image),
}

impl Element {
    /// Create a zero-extent element for a drawing tool.
    ///
    /// Returns `None` for tools that do not draw on pointer-down.
    pub fn create(
        tool: ToolKind,
        origin: Point,
        color: SerializableColor,
        stroke_width: f64,
    ) -> Option<Self> {
        match tool {
            ToolKind::Pencil => Some(Element::Stroke(Stroke::new(origin, color, stroke_width))),
            ToolKind::Eraser => Some(Element::Eraser(Stroke::new(
                origin,
                SerializableColor::white(),
                stroke_width,
            ))),
            ToolKind::Rectangle => Some(Element::Rectangle(
                Rectangle::new(origin, 0.0, 0.0).with_stroke(color, stroke_width),
            )),
            ToolKind::Circle => Some(Element::Circle(
                Circle::new(origin, 0.0).with_stroke(color, stroke_width),
            )),
            ToolKind::Text | ToolKind::Image | ToolKind::Select => None,
        }
    }

    /// Grow the element toward a new pointer position.
    pub fn extend_to(&mut self, point: Point) {
        match self {
            Element::Stroke(s) | Element::Eraser(s) => s.add_point(point),
            Element::Rectangle(r) => r.set_corner(point),
            Element::Image(i) => i.set_corner(point),
            Element::Circle(c) => c.set_radius_to(point),
            Element::Text(_) => {}
        }
    }

    /// Persisted type tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Stroke(_) => "pencil",
            Element::Eraser(_) => "eraser",
            Element::Rectangle(_) => "rectangle",
            Element::Circle(_) => "circle",
            Element::Text(_) => "text",
            Element::Image(_) => "image",
        }
    }

    pub fn id(&self) -> ElementId {
        match self {
            Element::Stroke(s) | Element::Eraser(s) => s.id(),
            Element::Rectangle(s) => s.id(),
            Element::Circle(s) => s.id(),
            Element::Text(s) => s.id(),
            Element::Image(s) => s.id(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Element::Stroke(s) | Element::Eraser(s) => s.bounds(),
            Element::Rectangle(s) => s.bounds(),
            Element::Circle(s) => s.bounds(),
            Element::Text(s) => s.bounds(),
            Element::Image(s) => s.bounds(),
        }
    }

    pub fn move_center_to(&mut self, point: Point) {
        match self {
            Element::Stroke(s) | Element::Eraser(s) => s.move_center_to(point),
            Element::Rectangle(s) => s.move_center_to(point),
            Element::Circle(s) => s.move_center_to(point),
            Element::Text(s) => s.move_center_to(point),
            Element::Image(s) => s.move_center_to(point),
        }
    }

    /// Get the image if this element is an image.
    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Element::Image(img) => Some(img),
            _ => None,
        }
    }

    /// Get the mutable image if this element is an image.
    pub fn as_image_mut(&mut self) -> Option<&mut Image> {
        match self {
            Element::Image(img) => Some(img),
            _ => None,
        }
    }
}
