//! The drawing-element engine: element list, gesture state machine, history and persistence.

use crate::elements::{Bitmap, Element, ElementId, Image, SerializableColor, Text};
use crate::hit_test::{self, ApproximateTextMeasure, TextMeasure};
use crate::history::HistoryStore;
use crate::input::{PointerEvent, TouchEvent};
use crate::settings::{ResizeDirection, ToolSettings};
use crate::storage::{MemoryStorage, PersistenceGateway, Storage};
use crate::tools::ToolKind;
use crate::upload::{self, BoxFuture, UploadResult, UploadedFile};
use kurbo::{Point, Size};
use std::sync::Arc;

/// Where the engine is within a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// The last element of the list is being grown.
    Drawing,
    /// The element with this id follows the pointer.
    Moving { id: ElementId },
}

/// Owns the element list and everything that mutates it.
///
/// The view layer calls into this and repaints from [`Engine::elements`],
/// [`Engine::selection`] and [`Engine::is_dark_mode`].
pub struct Engine {
    elements: Vec<Element>,
    history: HistoryStore,
    selection: Option<ElementId>,
    state: InteractionState,
    settings: ToolSettings,
    dark_mode: bool,
    viewport_size: Size,
    persistence: PersistenceGateway,
    measure: Box<dyn TextMeasure>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine backed by in-memory storage.
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    /// Create an engine, restoring any record saved in `storage`.
    ///
    /// The restored list becomes the undo floor.
    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        let persistence = PersistenceGateway::new(storage);
        let (elements, dark_mode) = match persistence.load() {
            Some(state) => {
                log::info!(
                    "Restored whiteboard with {} elements (dark mode: {})",
                    state.elements.len(),
                    state.is_dark_mode
                );
                (state.elements, state.is_dark_mode)
            }
            None => (Vec::new(), false),
        };

        Self {
            history: HistoryStore::with_baseline(elements.clone()),
            elements,
            selection: None,
            state: InteractionState::Idle,
            settings: ToolSettings::default(),
            dark_mode,
            viewport_size: Size::new(800.0, 600.0),
            persistence,
            measure: Box::new(ApproximateTextMeasure),
        }
    }

    /// Replace the text measurer used by hit-testing.
    pub fn set_text_measure(&mut self, measure: Box<dyn TextMeasure>) {
        self.measure = measure;
    }

    /// Set the viewport size; new text is placed at its center.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width, height);
    }

    // --- Queries ---

    /// The element list in paint order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    pub fn selected_element(&self) -> Option<&Element> {
        let id = self.selection?;
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.state
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Topmost element covering `point`.
    pub fn element_at(&mut self, point: Point) -> Option<&Element> {
        let index = hit_test::element_at(&self.elements, point, self.measure.as_mut())?;
        self.elements.get(index)
    }

    // --- Settings ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        log::debug!("Tool: {}", tool);
        self.settings.tool = tool;
    }

    pub fn set_stroke_color(&mut self, color: SerializableColor) {
        self.settings.color = color;
    }

    /// Set the stroke width, clamped to [1, 20].
    pub fn set_stroke_width(&mut self, width: f64) {
        self.settings.set_stroke_width(width);
    }

    /// Set the text size, clamped to [8, 72].
    pub fn set_text_size(&mut self, size: f64) {
        self.settings.set_text_size(size);
    }

    pub fn increase_text_size(&mut self) {
        self.settings.increase_text_size();
    }

    pub fn decrease_text_size(&mut self) {
        self.settings.decrease_text_size();
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        if self.dark_mode != dark {
            self.dark_mode = dark;
            self.persist();
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        self.set_dark_mode(!self.dark_mode);
    }

    // --- Pointer input ---

    /// Feed one pointer event (canvas coordinates) to the state machine.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up | PointerEvent::Leave => self.pointer_up(),
        }
    }

    /// Feed one touch event. `canvas_origin` is the canvas's top-left in client space.
    pub fn handle_touch_event(&mut self, event: &TouchEvent, canvas_origin: Point) {
        if let Some(pointer) = event.to_pointer_event(canvas_origin) {
            self.handle_pointer_event(pointer);
        }
    }

    fn pointer_down(&mut self, position: Point) {
        if self.state != InteractionState::Idle {
            log::debug!("Ignoring pointer-down during {:?}", self.state);
            return;
        }

        let tool = self.settings.tool;
        if tool == ToolKind::Select {
            self.selection = self.element_at(position).map(Element::id);
            if let Some(id) = self.selection {
                log::debug!("Selected {id}; moving");
                self.state = InteractionState::Moving { id };
            }
            return;
        }

        if let Some(element) =
            Element::create(tool, position, self.settings.color, self.settings.stroke_width)
        {
            log::debug!("Drawing {} at {:?}", element.kind_name(), position);
            self.elements.push(element);
            self.state = InteractionState::Drawing;
        }
    }

    fn pointer_move(&mut self, position: Point) {
        match self.state {
            InteractionState::Idle => {}
            InteractionState::Drawing => {
                if let Some(element) = self.elements.last_mut() {
                    element.extend_to(position);
                }
            }
            InteractionState::Moving { id } => {
                if let Some(element) = self.elements.iter_mut().find(|e| e.id() == id) {
                    element.move_center_to(position);
                }
            }
        }
    }

    fn pointer_up(&mut self) {
        self.settle_gesture();
    }

    /// End any gesture in progress and commit it, so the element being drawn
    /// stays last in the list until the gesture's own commit.
    fn settle_gesture(&mut self) {
        if self.state == InteractionState::Idle {
            return;
        }
        self.state = InteractionState::Idle;
        self.commit();
    }

    // --- Side-channel edits ---

    /// Add a text element at the viewport center. Empty content is ignored.
    ///
    /// A gesture in progress is committed first.
    pub fn add_text(&mut self, content: &str) -> Option<ElementId> {
        if content.is_empty() {
            return None;
        }
        let center = Point::new(self.viewport_size.width / 2.0, self.viewport_size.height / 2.0);
        let text = Text::new(center, content)
            .with_color(self.settings.color)
            .with_font_size(self.settings.text_size);
        let id = text.id;
        self.settle_gesture();
        self.elements.push(Element::Text(text));
        self.commit();
        Some(id)
    }

    /// Start decoding an uploaded file.
    ///
    /// Returns `None` without reading when the file fails the image type check.
    /// Drive the future anywhere, then hand its output to
    /// [`Engine::finish_image_upload`].
    pub fn begin_image_upload(
        &self,
        file: UploadedFile,
    ) -> Option<BoxFuture<'static, UploadResult<Arc<Bitmap>>>> {
        if !file.is_image() {
            log::debug!("Ignoring non-image upload: {}", file.name);
            return None;
        }
        Some(upload::decode_upload(file))
    }

    /// Place a decoded bitmap at the origin at natural size and commit.
    ///
    /// A gesture in progress is committed first. Decode failures are logged and leave the list untouched.
    pub fn finish_image_upload(&mut self, result: UploadResult<Arc<Bitmap>>) -> Option<ElementId> {
        match result {
            Ok(bitmap) => {
                let image = Image::new(Point::ZERO, bitmap);
                let id = image.id;
                self.settle_gesture();
                self.elements.push(Element::Image(image));
                self.commit();
                Some(id)
            }
            Err(e) => {
                log::warn!("Image upload failed: {e}");
                None
            }
        }
    }

    /// Scale the selected image by 1.1 or 0.9 and commit.
    ///
    /// Returns `false` (no commit) when the selection is not an image.
    pub fn resize_selected_image(&mut self, direction: ResizeDirection) -> bool {
        let Some(id) = self.selection else {
            return false;
        };
        let Some(image) = self
            .elements
            .iter_mut()
            .find(|e| e.id() == id)
            .and_then(Element::as_image_mut)
        else {
            return false;
        };
        image.scale(direction.factor());
        self.commit();
        true
    }

    // --- History ---

    /// Step back one commit. Returns `false` at the oldest state.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.elements = snapshot.to_vec();
        self.after_history_jump();
        true
    }

    /// Step forward one commit. Returns `false` at the newest state.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.elements = snapshot.to_vec();
        self.after_history_jump();
        true
    }

    fn after_history_jump(&mut self) {
        self.state = InteractionState::Idle;
        if let Some(id) = self.selection {
            if !self.elements.iter().any(|e| e.id() == id) {
                self.selection = None;
            }
        }
        log::debug!(
            "History cursor {:?} of {}",
            self.history.cursor(),
            self.history.len()
        );
        self.persist();
    }

    /// Clear elements, history and selection, restore default settings and
    /// remove the persisted record. Display mode is kept.
    pub fn reset_canvas(&mut self) {
        self.elements.clear();
        self.history.clear();
        self.selection = None;
        self.state = InteractionState::Idle;
        self.settings = ToolSettings::default();
        if let Err(e) = self.persistence.clear() {
            log::warn!("Failed to remove saved whiteboard: {e}");
        }
        log::info!("Canvas reset");
    }

    fn commit(&mut self) {
        self.history.commit(&self.elements);
        log::debug!(
            "Committed {} elements (history {})",
            self.elements.len(),
            self.history.len()
        );
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.elements, self.dark_mode) {
            log::warn!("Failed to save whiteboard: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::STATE_KEY;
    use crate::upload::tests::png_bytes;

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
        }
    }

    fn to(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    fn drag(engine: &mut Engine, from: (f64, f64), moves: &[(f64, f64)]) {
        engine.handle_pointer_event(down(from.0, from.1));
        for &(x, y) in moves {
            engine.handle_pointer_event(to(x, y));
        }
        engine.handle_pointer_event(PointerEvent::Up);
    }

    fn engine_with_storage() -> (Engine, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (Engine::with_storage(storage.clone()), storage)
    }

    fn add_image(engine: &mut Engine, w: u32, h: u32) -> ElementId {
        let file = UploadedFile::new("pic.png", Some("image/png".into()), png_bytes(w, h));
        let future = engine.begin_image_upload(file).unwrap();
        engine.finish_image_upload(pollster::block_on(future)).unwrap()
    }

    #[test]
    fn test_pencil_stroke() {
        let mut engine = Engine::new();
        engine.set_stroke_color(SerializableColor::rgb(255, 0, 0));
        engine.set_stroke_width(5.0);

        engine.handle_pointer_event(down(10.0, 10.0));
        assert_eq!(engine.interaction_state(), InteractionState::Drawing);
        // Style changes mid-gesture do not affect the element being drawn.
        engine.set_stroke_color(SerializableColor::rgb(0, 0, 255));
        engine.handle_pointer_event(to(10.0, 20.0));
        engine.handle_pointer_event(to(20.0, 20.0));
        assert_eq!(engine.history().len(), 0);
        engine.handle_pointer_event(PointerEvent::Up);

        assert_eq!(engine.elements().len(), 1);
        let Element::Stroke(stroke) = &engine.elements()[0] else {
            panic!("expected stroke");
        };
        assert_eq!(
            stroke.points,
            vec![Point::new(10.0, 10.0), Point::new(10.0, 20.0), Point::new(20.0, 20.0)]
        );
        assert_eq!(stroke.color, SerializableColor::rgb(255, 0, 0));
        assert!((stroke.stroke_width - 5.0).abs() < f64::EPSILON);
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.interaction_state(), InteractionState::Idle);
    }

    #[test]
    fn test_circle_and_select() {
        let mut engine = Engine::new();
        engine.set_tool(ToolKind::Circle);
        drag(&mut engine, (50.0, 50.0), &[(50.0, 80.0)]);

        let Element::Circle(circle) = &engine.elements()[0] else {
            panic!("expected circle");
        };
        assert!((circle.radius - 30.0).abs() < f64::EPSILON);
        let circle_id = circle.id;

        engine.set_tool(ToolKind::Select);
        engine.handle_pointer_event(down(50.0, 55.0));
        assert_eq!(engine.selection(), Some(circle_id));
        assert_eq!(
            engine.interaction_state(),
            InteractionState::Moving { id: circle_id }
        );
        engine.handle_pointer_event(PointerEvent::Up);

        engine.handle_pointer_event(down(50.0, 120.0));
        assert_eq!(engine.selection(), None);
        assert_eq!(engine.interaction_state(), InteractionState::Idle);
        // A miss creates nothing and commits nothing.
        engine.handle_pointer_event(PointerEvent::Up);
        assert_eq!(engine.elements().len(), 1);
        assert_eq!(engine.history().len(), 2);
    }

    #[test]
    fn test_move_rectangle_centers_on_pointer() {
        let mut engine = Engine::new();
        engine.set_tool(ToolKind::Rectangle);
        drag(&mut engine, (0.0, 0.0), &[(40.0, 20.0)]);

        engine.set_tool(ToolKind::Select);
        drag(&mut engine, (10.0, 10.0), &[(100.0, 100.0)]);

        let Element::Rectangle(rect) = &engine.elements()[0] else {
            panic!("expected rectangle");
        };
        assert_eq!(rect.origin, Point::new(80.0, 90.0));
        assert_eq!(engine.history().len(), 2);
    }

    #[test]
    fn test_move_reverse_dragged_rectangle() {
        let mut engine = Engine::new();
        engine.set_tool(ToolKind::Rectangle);
        drag(&mut engine, (100.0, 100.0), &[(60.0, 80.0)]);

        engine.set_tool(ToolKind::Select);
        drag(&mut engine, (70.0, 90.0), &[(200.0, 200.0)]);

        let bounds = engine.elements()[0].bounds();
        assert_eq!(bounds.center(), Point::new(200.0, 200.0));
        assert!((bounds.width() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_move_text_sets_anchor() {
        let mut engine = Engine::new();
        engine.set_viewport_size(400.0, 300.0);
        engine.add_text("hello").unwrap();

        engine.set_tool(ToolKind::Select);
        drag(&mut engine, (205.0, 145.0), &[(10.0, 40.0)]);

        let Element::Text(text) = &engine.elements()[0] else {
            panic!("expected text");
        };
        assert_eq!(text.anchor, Point::new(10.0, 40.0));
    }

    #[test]
    fn test_strokes_cannot_be_selected() {
        let mut engine = Engine::new();
        drag(&mut engine, (10.0, 10.0), &[(30.0, 30.0)]);
        engine.set_tool(ToolKind::Select);
        engine.handle_pointer_event(down(10.0, 10.0));
        assert_eq!(engine.selection(), None);
        assert_eq!(engine.interaction_state(), InteractionState::Idle);
    }

    #[test]
    fn test_idle_events_are_noops() {
        let (mut engine, storage) = engine_with_storage();
        engine.handle_pointer_event(to(5.0, 5.0));
        engine.handle_pointer_event(PointerEvent::Up);
        engine.handle_pointer_event(PointerEvent::Leave);
        assert!(engine.elements().is_empty());
        assert_eq!(engine.history().len(), 0);
        assert!(!storage.exists(STATE_KEY).unwrap());
    }

    #[test]
    fn test_leave_commits_like_up() {
        let mut engine = Engine::new();
        engine.set_tool(ToolKind::Rectangle);
        engine.handle_pointer_event(down(0.0, 0.0));
        engine.handle_pointer_event(to(10.0, 10.0));
        engine.handle_pointer_event(PointerEvent::Leave);
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.interaction_state(), InteractionState::Idle);
    }

    #[test]
    fn test_second_down_during_gesture_is_ignored() {
        let mut engine = Engine::new();
        engine.handle_pointer_event(down(0.0, 0.0));
        engine.handle_pointer_event(down(50.0, 50.0));
        engine.handle_pointer_event(PointerEvent::Up);
        assert_eq!(engine.elements().len(), 1);
    }

    #[test]
    fn test_text_and_image_tools_ignore_pointer() {
        let mut engine = Engine::new();
        for tool in [ToolKind::Text, ToolKind::Image] {
            engine.set_tool(tool);
            drag(&mut engine, (0.0, 0.0), &[(10.0, 10.0)]);
        }
        assert!(engine.elements().is_empty());
        assert_eq!(engine.history().len(), 0);
    }

    #[test]
    fn test_add_text() {
        let mut engine = Engine::new();
        engine.set_viewport_size(400.0, 300.0);
        engine.set_stroke_color(SerializableColor::rgb(0, 0, 255));
        engine.increase_text_size();

        assert!(engine.add_text("").is_none());
        assert_eq!(engine.history().len(), 0);

        let id = engine.add_text("note").unwrap();
        let Element::Text(text) = &engine.elements()[0] else {
            panic!("expected text");
        };
        assert_eq!(text.id, id);
        assert_eq!(text.anchor, Point::new(200.0, 150.0));
        assert_eq!(text.color, SerializableColor::rgb(0, 0, 255));
        assert!((text.font_size - 22.0).abs() < f64::EPSILON);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_image_upload_and_resize() {
        let mut engine = Engine::new();
        let id = add_image(&mut engine, 100, 50);
        assert_eq!(engine.history().len(), 1);

        // Nothing selected yet.
        assert!(!engine.resize_selected_image(ResizeDirection::Increase));

        engine.set_tool(ToolKind::Select);
        engine.handle_pointer_event(down(10.0, 10.0));
        engine.handle_pointer_event(PointerEvent::Up);
        assert_eq!(engine.selection(), Some(id));

        assert!(engine.resize_selected_image(ResizeDirection::Increase));
        let image = engine.selected_element().and_then(Element::as_image).unwrap();
        assert!((image.width - 110.0).abs() < 1e-9);
        assert!((image.height - 55.0).abs() < 1e-9);

        assert!(engine.resize_selected_image(ResizeDirection::Decrease));
        let image = engine.selected_element().and_then(Element::as_image).unwrap();
        assert!((image.width - 99.0).abs() < 1e-9);
        assert_eq!(engine.history().len(), 4);
    }

    #[test]
    fn test_resize_ignores_non_images() {
        let mut engine = Engine::new();
        engine.set_tool(ToolKind::Circle);
        drag(&mut engine, (50.0, 50.0), &[(50.0, 80.0)]);
        engine.set_tool(ToolKind::Select);
        drag(&mut engine, (50.0, 50.0), &[]);
        let before = engine.history().len();
        assert!(!engine.resize_selected_image(ResizeDirection::Increase));
        assert_eq!(engine.history().len(), before);
    }

    #[test]
    fn test_rejected_and_failed_uploads() {
        let mut engine = Engine::new();
        let text = UploadedFile::new("notes.txt", Some("text/plain".into()), b"hi".to_vec());
        assert!(engine.begin_image_upload(text).is_none());

        let broken = UploadedFile::new("broken.png", Some("image/png".into()), vec![0x89, 0x50]);
        let future = engine.begin_image_upload(broken).unwrap();
        assert!(engine.finish_image_upload(pollster::block_on(future)).is_none());
        assert!(engine.elements().is_empty());
        assert_eq!(engine.history().len(), 0);
    }

    #[test]
    fn test_image_arriving_mid_drag_commits_the_drag_first() {
        let mut engine = Engine::new();
        engine.set_tool(ToolKind::Rectangle);
        engine.handle_pointer_event(down(300.0, 300.0));
        engine.handle_pointer_event(to(320.0, 320.0));

        let file = UploadedFile::new("pic.png", Some("image/png".into()), png_bytes(100, 50));
        let future = engine.begin_image_upload(file).unwrap();
        let image_id = engine.finish_image_upload(pollster::block_on(future)).unwrap();
        assert_eq!(engine.interaction_state(), InteractionState::Idle);

        // The rest of the drag no longer reaches any element.
        engine.handle_pointer_event(to(400.0, 400.0));
        engine.handle_pointer_event(PointerEvent::Up);

        assert_eq!(engine.elements().len(), 2);
        assert!(matches!(engine.elements()[0], Element::Rectangle(_)));
        assert!((engine.elements()[0].bounds().x1 - 320.0).abs() < f64::EPSILON);
        assert_eq!(engine.elements()[1].id(), image_id);
        let image = engine.elements()[1].as_image().unwrap();
        assert!((image.width - 100.0).abs() < f64::EPSILON);
        assert!((image.height - 50.0).abs() < f64::EPSILON);
        assert_eq!(engine.history().len(), 2);
    }

    #[test]
    fn test_text_added_mid_stroke_keeps_stroke_intact() {
        let mut engine = Engine::new();
        engine.handle_pointer_event(down(0.0, 0.0));
        engine.handle_pointer_event(to(2.0, 2.0));
        engine.add_text("hi").unwrap();
        engine.handle_pointer_event(to(5.0, 5.0));
        engine.handle_pointer_event(PointerEvent::Up);

        let Element::Stroke(stroke) = &engine.elements()[0] else {
            panic!("expected stroke first");
        };
        assert_eq!(stroke.points, vec![Point::new(0.0, 0.0), Point::new(2.0, 2.0)]);
        let Element::Text(text) = &engine.elements()[1] else {
            panic!("expected text last");
        };
        assert_eq!(text.content, "hi");
        assert_eq!(engine.history().len(), 2);
        // The committed stroke snapshot is complete, not a mid-gesture copy.
        assert_eq!(engine.history().entries()[0].len(), 1);
    }

    #[test]
    fn test_failed_upload_mid_drag_leaves_gesture_running() {
        let mut engine = Engine::new();
        engine.set_tool(ToolKind::Rectangle);
        engine.handle_pointer_event(down(10.0, 10.0));

        let broken = UploadedFile::new("broken.png", Some("image/png".into()), vec![0x89, 0x50]);
        let future = engine.begin_image_upload(broken).unwrap();
        assert!(engine.finish_image_upload(pollster::block_on(future)).is_none());
        assert_eq!(engine.interaction_state(), InteractionState::Drawing);

        engine.handle_pointer_event(to(60.0, 40.0));
        engine.handle_pointer_event(PointerEvent::Up);
        assert!((engine.elements()[0].bounds().x1 - 60.0).abs() < f64::EPSILON);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_touch_translates_to_canvas_space() {
        let mut engine = Engine::new();
        let origin = Point::new(100.0, 50.0);
        engine.handle_touch_event(
            &TouchEvent::Start {
                touches: vec![Point::new(110.0, 60.0)],
            },
            origin,
        );
        engine.handle_touch_event(
            &TouchEvent::Move {
                touches: vec![Point::new(130.0, 90.0), Point::new(0.0, 0.0)],
            },
            origin,
        );
        engine.handle_touch_event(&TouchEvent::End, origin);

        let Element::Stroke(stroke) = &engine.elements()[0] else {
            panic!("expected stroke");
        };
        assert_eq!(stroke.points, vec![Point::new(10.0, 10.0), Point::new(30.0, 40.0)]);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_undo_redo_installs_snapshots() {
        let mut engine = Engine::new();
        engine.set_tool(ToolKind::Rectangle);
        for i in 0..3 {
            let x = i as f64 * 50.0;
            drag(&mut engine, (x, 0.0), &[(x + 20.0, 20.0)]);
        }
        let final_elements = engine.elements().to_vec();

        for expected in [2, 1, 0] {
            assert!(engine.undo());
            assert_eq!(engine.elements().len(), expected);
        }
        assert!(!engine.undo());

        for _ in 0..3 {
            assert!(engine.redo());
        }
        assert!(!engine.redo());
        assert_eq!(engine.elements(), &final_elements[..]);
    }

    #[test]
    fn test_undo_clears_stale_selection() {
        let mut engine = Engine::new();
        engine.set_tool(ToolKind::Rectangle);
        drag(&mut engine, (0.0, 0.0), &[(40.0, 40.0)]);
        engine.set_tool(ToolKind::Select);
        drag(&mut engine, (10.0, 10.0), &[]);
        assert!(engine.selection().is_some());

        // Back past the move commit: the rectangle still exists.
        assert!(engine.undo());
        assert!(engine.selection().is_some());

        // Back past the draw commit: it does not.
        assert!(engine.undo());
        assert_eq!(engine.selection(), None);
        assert!(engine.selected_element().is_none());
    }

    #[test]
    fn test_commit_after_undo_truncates() {
        let mut engine = Engine::new();
        engine.set_tool(ToolKind::Circle);
        for i in 0..3 {
            let x = i as f64 * 100.0;
            drag(&mut engine, (x, 0.0), &[(x, 10.0)]);
        }
        engine.undo();
        drag(&mut engine, (500.0, 500.0), &[(500.0, 520.0)]);
        assert_eq!(engine.history().len(), 3);
        assert!(!engine.redo());
    }

    #[test]
    fn test_reset_canvas() {
        let (mut engine, storage) = engine_with_storage();
        engine.set_dark_mode(true);
        engine.set_tool(ToolKind::Rectangle);
        engine.set_stroke_width(9.0);
        for i in 0..5 {
            let x = i as f64 * 30.0;
            drag(&mut engine, (x, 0.0), &[(x + 10.0, 10.0)]);
        }
        engine.set_tool(ToolKind::Select);
        drag(&mut engine, (5.0, 5.0), &[]);
        assert!(storage.exists(STATE_KEY).unwrap());

        engine.reset_canvas();

        assert_eq!(engine.history().len(), 0);
        assert!(engine.elements().is_empty());
        assert_eq!(engine.selection(), None);
        assert!(!storage.exists(STATE_KEY).unwrap());
        assert_eq!(*engine.settings(), ToolSettings::default());
        assert!(engine.is_dark_mode());
        assert!(!engine.undo());
    }

    #[test]
    fn test_state_survives_restart() {
        let storage = Arc::new(MemoryStorage::new());
        let mut engine = Engine::with_storage(storage.clone());
        engine.set_tool(ToolKind::Circle);
        drag(&mut engine, (50.0, 50.0), &[(50.0, 80.0)]);
        engine.add_text("hello");
        add_image(&mut engine, 4, 4);
        engine.toggle_dark_mode();
        let saved = engine.elements().to_vec();

        let mut restored = Engine::with_storage(storage);
        assert!(restored.is_dark_mode());
        assert_eq!(restored.elements(), &saved[..]);
        assert_eq!(restored.history().len(), 0);
        // The restored list is the undo floor.
        assert!(!restored.undo());
        assert_eq!(restored.elements().len(), 3);
    }

    #[test]
    fn test_corrupt_record_starts_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(STATE_KEY, "][").unwrap();
        let engine = Engine::with_storage(storage);
        assert!(engine.elements().is_empty());
        assert!(!engine.is_dark_mode());
    }

    #[test]
    fn test_dark_mode_is_persisted() {
        let (mut engine, storage) = engine_with_storage();
        engine.toggle_dark_mode();
        let json = storage.get(STATE_KEY).unwrap().unwrap();
        assert!(json.contains("\"isDarkMode\":true"));
    }

    #[test]
    fn test_custom_text_measure() {
        struct Wide;
        impl TextMeasure for Wide {
            fn text_width(&mut self, _: &str, _: f64) -> f64 {
                1000.0
            }
        }

        let mut engine = Engine::new();
        engine.set_viewport_size(0.0, 100.0);
        engine.add_text("x");
        assert!(engine.element_at(Point::new(900.0, 45.0)).is_none());

        engine.set_text_measure(Box::new(Wide));
        assert!(engine.element_at(Point::new(900.0, 45.0)).is_some());
    }
}
