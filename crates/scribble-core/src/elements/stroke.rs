//! Freehand stroke (pencil and eraser paths).

use super::{ElementId, ElementTrait, SerializableColor};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand path. Points are only ever appended while drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub(crate) id: ElementId,
    /// Points in drawing order.
    pub points: Vec<Point>,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Stroke {
    /// Start a stroke at a single point.
    pub fn new(origin: Point, color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![origin],
            color,
            stroke_width,
        }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Polyline through the points, for stroking.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.points.first() else {
            return path;
        };
        path.move_to(*first);
        for point in &self.points[1..] {
            path.line_to(*point);
        }
        path
    }
}

impl ElementTrait for Stroke {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .skip(1)
            .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
    }

    fn move_center_to(&mut self, point: Point) {
        let delta: Vec2 = point - self.bounds().center();
        for p in &mut self.points {
            *p += delta;
        }
    }
}
