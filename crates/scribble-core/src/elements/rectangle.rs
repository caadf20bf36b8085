//! Rectangle element.

use super::{
    ElementId, ElementTrait, SerializableColor, normalized_rect, rect_contains_inclusive,
};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An outlined rectangle.
///
/// `width` and `height` are signed: dragging up or left of the origin makes them
/// negative. Everything geometric goes through [`Rectangle::as_rect`], which
/// normalizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub(crate) id: ElementId,
    /// Corner where the drag started.
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            width,
            height,
            color: SerializableColor::black(),
            stroke_width: 2.0,
        }
    }

    pub fn with_stroke(mut self, color: SerializableColor, stroke_width: f64) -> Self {
        self.color = color;
        self.stroke_width = stroke_width;
        self
    }

    /// Set the dragged corner; extents stay signed.
    pub fn set_corner(&mut self, corner: Point) {
        self.width = corner.x - self.origin.x;
        self.height = corner.y - self.origin.y;
    }

    /// Get the rectangle as a normalized kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        normalized_rect(self.origin, self.width, self.height)
    }

    /// Whether `point` lies inside or on the edge of the rectangle.
    pub fn contains(&self, point: Point) -> bool {
        rect_contains_inclusive(self.as_rect(), point)
    }
}

impl ElementTrait for Rectangle {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn move_center_to(&mut self, point: Point) {
        self.origin = Point::new(point.x - self.width / 2.0, point.y - self.height / 2.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_creation() {
        let rect = Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0);
        assert!((rect.origin.x - 10.0).abs() < f64::EPSILON);
        assert!((rect.origin.y - 20.0).abs() < f64::EPSILON);
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reverse_drag_normalizes() {
        let mut rect = Rectangle::new(Point::new(100.0, 100.0), 0.0, 0.0);
        rect.set_corner(Point::new(50.0, 50.0));
        assert!((rect.width + 50.0).abs() < f64::EPSILON);

        let bounds = rect.bounds();
        assert!((bounds.x0 - 50.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 50.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
        assert!(rect.contains(Point::new(75.0, 75.0)));
    }

    #[test]
    fn test_contains_edges() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(rect.contains(Point::new(50.0, 50.0)));
        assert!(rect.contains(Point::new(100.0, 100.0)));
        assert!(!rect.contains(Point::new(150.0, 50.0)));
    }

    #[test]
    fn test_move_center() {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), 40.0, 20.0);
        rect.move_center_to(Point::new(100.0, 100.0));
        assert_eq!(rect.origin, Point::new(80.0, 90.0));
        assert_eq!(rect.bounds().center(), Point::new(100.0, 100.0));
    }
}
