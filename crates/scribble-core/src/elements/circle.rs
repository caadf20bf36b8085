//! Circle element.

use super::{ElementId, ElementTrait, SerializableColor};
use kurbo::{Circle as KurboCircle, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An outlined circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub(crate) id: ElementId,
    pub center: Point,
    pub radius: f64,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Circle {
    /// Create a circle.
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius,
            color: SerializableColor::black(),
            stroke_width: 2.0,
        }
    }

    pub fn with_stroke(mut self, color: SerializableColor, stroke_width: f64) -> Self {
        self.color = color;
        self.stroke_width = stroke_width;
        self
    }

    /// Radius becomes the distance from the center to `point`.
    pub fn set_radius_to(&mut self, point: Point) {
        self.radius = self.center.distance(point);
    }

    /// Get as a kurbo Circle.
    pub fn as_kurbo(&self) -> KurboCircle {
        KurboCircle::new(self.center, self.radius)
    }

    /// Whether `point` lies inside the disc (boundary included).
    pub fn contains(&self, point: Point) -> bool {
        self.center.distance(point) <= self.radius
    }
}

impl ElementTrait for Circle {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    fn move_center_to(&mut self, point: Point) {
        self.center = point;
    }
}
