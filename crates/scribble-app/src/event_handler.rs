//! Translates window input into engine operations.

use crate::shortcuts::{Action, ShortcutRegistry};
use kurbo::Point;
use scribble_core::{Engine, InputState, PALETTE, PointerEvent, ResizeDirection, ToolKind, TouchEvent};
use winit::event::TouchPhase;
use winit::keyboard::{Key, NamedKey};

/// Effects the engine cannot perform itself; the app shell runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    ExportPng,
    UploadImage,
}

/// Handles high-level events and translates them to engine operations.
pub struct EventHandler {
    input: InputState,
    /// Characters typed while the text tool is active.
    text_buffer: String,
    /// Active touches in the order they started.
    touches: Vec<(u64, Point)>,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            input: InputState::new(),
            text_buffer: String::new(),
            touches: Vec::new(),
        }
    }

    /// Pending text for the text tool.
    pub fn text_buffer(&self) -> &str {
        &self.text_buffer
    }

    // --- Mouse ---

    pub fn handle_cursor_moved(&mut self, engine: &mut Engine, position: Point) {
        let event = self.input.track(PointerEvent::Move { position });
        engine.handle_pointer_event(event);
    }

    /// Primary button pressed at the last cursor position.
    pub fn handle_press(&mut self, engine: &mut Engine) {
        let event = self.input.press();
        engine.handle_pointer_event(event);
    }

    pub fn handle_release(&mut self, engine: &mut Engine) {
        let event = self.input.track(PointerEvent::Up);
        engine.handle_pointer_event(event);
    }

    pub fn handle_cursor_left(&mut self, engine: &mut Engine) {
        let event = self.input.track(PointerEvent::Leave);
        engine.handle_pointer_event(event);
    }

    // --- Touch ---

    /// Feed one touch update. Only the first active touch drives the gesture.
    pub fn handle_touch(&mut self, engine: &mut Engine, id: u64, phase: TouchPhase, position: Point) {
        let event = match phase {
            TouchPhase::Started => {
                self.touches.push((id, position));
                TouchEvent::Start {
                    touches: self.touch_points(),
                }
            }
            TouchPhase::Moved => {
                if let Some(touch) = self.touches.iter_mut().find(|(touch_id, _)| *touch_id == id) {
                    touch.1 = position;
                }
                TouchEvent::Move {
                    touches: self.touch_points(),
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.retain(|(touch_id, _)| *touch_id != id);
                if !self.touches.is_empty() {
                    return;
                }
                TouchEvent::End
            }
        };
        // The window is the canvas, so touch locations are already canvas-relative.
        engine.handle_touch_event(&event, Point::ZERO);
    }

    fn touch_points(&self) -> Vec<Point> {
        self.touches.iter().map(|(_, point)| *point).collect()
    }

    // --- Keyboard ---

    /// Handle a key press. Returns a command when the shell has work to do.
    pub fn handle_key(
        &mut self,
        engine: &mut Engine,
        key: &Key,
        ctrl: bool,
        shift: bool,
    ) -> Option<AppCommand> {
        if engine.settings().tool == ToolKind::Text && !ctrl && self.handle_text_key(engine, key) {
            return None;
        }

        let name = match key {
            Key::Character(c) => c.as_str(),
            Key::Named(NamedKey::Delete) => "Delete",
            Key::Named(NamedKey::Escape) => "Escape",
            _ => return None,
        };
        let action = ShortcutRegistry::lookup(name, ctrl, shift)?;
        self.apply(engine, action)
    }

    /// Text entry keys. Returns `true` when the key was consumed.
    fn handle_text_key(&mut self, engine: &mut Engine, key: &Key) -> bool {
        match key {
            Key::Named(NamedKey::Enter) => {
                if let Some(id) = engine.add_text(&self.text_buffer) {
                    log::debug!("Added text {id}");
                }
                self.text_buffer.clear();
            }
            // Escape on an empty buffer falls through to leave the text tool.
            Key::Named(NamedKey::Escape) if !self.text_buffer.is_empty() => {
                self.text_buffer.clear()
            }
            Key::Named(NamedKey::Backspace) => {
                self.text_buffer.pop();
            }
            Key::Named(NamedKey::Space) => self.text_buffer.push(' '),
            Key::Character(c) => self.text_buffer.push_str(c),
            _ => return false,
        }
        true
    }

    fn apply(&mut self, engine: &mut Engine, action: Action) -> Option<AppCommand> {
        match action {
            Action::SelectTool(tool) => {
                engine.set_tool(tool);
                if tool != ToolKind::Text {
                    self.text_buffer.clear();
                }
                if tool == ToolKind::Image {
                    return Some(AppCommand::UploadImage);
                }
            }
            Action::PickColor(index) => {
                if let Some(color) = PALETTE.get(index) {
                    engine.set_stroke_color(*color);
                }
            }
            Action::Undo => {
                engine.undo();
            }
            Action::Redo => {
                engine.redo();
            }
            Action::ExportPng => return Some(AppCommand::ExportPng),
            Action::UploadImage => return Some(AppCommand::UploadImage),
            Action::ResetCanvas => {
                self.text_buffer.clear();
                engine.reset_canvas();
            }
            Action::ToggleDarkMode => engine.toggle_dark_mode(),
            Action::IncreaseTextSize => engine.increase_text_size(),
            Action::DecreaseTextSize => engine.decrease_text_size(),
            Action::IncreaseStrokeWidth => {
                let width = engine.settings().stroke_width + 1.0;
                engine.set_stroke_width(width);
            }
            Action::DecreaseStrokeWidth => {
                let width = engine.settings().stroke_width - 1.0;
                engine.set_stroke_width(width);
            }
            Action::GrowImage => {
                engine.resize_selected_image(ResizeDirection::Increase);
            }
            Action::ShrinkImage => {
                engine.resize_selected_image(ResizeDirection::Decrease);
            }
        }
        None
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
