//! Pointer and touch events in canvas coordinates.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are canvas-relative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up,
    /// The pointer left the canvas. Ends a gesture like `Up`.
    Leave,
}

/// Touch event type. Touch positions are in the surface's client space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TouchEvent {
    Start { touches: Vec<Point> },
    Move { touches: Vec<Point> },
    End,
}

impl TouchEvent {
    /// Translate into a pointer event using the first active touch.
    ///
    /// `canvas_origin` is the canvas's top-left corner in client space.
    /// A start or move with no touches yields `None`.
    pub fn to_pointer_event(&self, canvas_origin: Point) -> Option<PointerEvent> {
        let relative = |touches: &[Point]| {
            touches
                .first()
                .map(|touch| Point::new(touch.x - canvas_origin.x, touch.y - canvas_origin.y))
        };
        match self {
            TouchEvent::Start { touches } => {
                relative(touches).map(|position| PointerEvent::Down { position })
            }
            TouchEvent::Move { touches } => {
                relative(touches).map(|position| PointerEvent::Move { position })
            }
            TouchEvent::End => Some(PointerEvent::Up),
        }
    }
}

/// Tracks the pointer across events for shells whose button events carry no position.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    /// Last known pointer position in canvas coordinates.
    pub pointer_position: Point,
    /// Whether the primary button is held.
    pub is_pointer_down: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event, returning it unchanged for forwarding.
    pub fn track(&mut self, event: PointerEvent) -> PointerEvent {
        match event {
            PointerEvent::Down { position } => {
                self.pointer_position = position;
                self.is_pointer_down = true;
            }
            PointerEvent::Move { position } => {
                self.pointer_position = position;
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.is_pointer_down = false;
            }
        }
        event
    }

    /// A pointer-down at the last known position.
    pub fn press(&mut self) -> PointerEvent {
        self.track(PointerEvent::Down {
            position: self.pointer_position,
        })
    }
}
