//! Keyboard shortcut registry and documentation.

use scribble_core::{PALETTE, ToolKind};

/// What a shortcut does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectTool(ToolKind),
    /// Pick the palette swatch at this index.
    PickColor(usize),
    Undo,
    Redo,
    ExportPng,
    UploadImage,
    ResetCanvas,
    ToggleDarkMode,
    IncreaseTextSize,
    DecreaseTextSize,
    IncreaseStrokeWidth,
    DecreaseStrokeWidth,
    GrowImage,
    ShrinkImage,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: Action,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: Action,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// Whether a key press triggers this shortcut. Letter keys match either case.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.ctrl == ctrl && self.shift == shift && self.key.eq_ignore_ascii_case(key)
    }
}

/// Digit keys for the palette: 1-9 then 0 pick the first ten swatches,
/// Ctrl+1-6 pick the remaining six.
const DIGITS: [&str; 10] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"];

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        let mut shortcuts = vec![
            Shortcut::new("P", false, false, Action::SelectTool(ToolKind::Pencil), "Pencil"),
            Shortcut::new("E", false, false, Action::SelectTool(ToolKind::Eraser), "Eraser"),
            Shortcut::new(
                "R",
                false,
                false,
                Action::SelectTool(ToolKind::Rectangle),
                "Rectangle",
            ),
            Shortcut::new("C", false, false, Action::SelectTool(ToolKind::Circle), "Circle"),
            Shortcut::new("T", false, false, Action::SelectTool(ToolKind::Text), "Text"),
            Shortcut::new(
                "I",
                false,
                false,
                Action::SelectTool(ToolKind::Image),
                "Image (opens file picker)",
            ),
            Shortcut::new("V", false, false, Action::SelectTool(ToolKind::Select), "Select"),
            Shortcut::new(
                "Escape",
                false,
                false,
                Action::SelectTool(ToolKind::Select),
                "Select (leaves text entry)",
            ),
            Shortcut::new("Z", true, false, Action::Undo, "Undo"),
            Shortcut::new("Z", true, true, Action::Redo, "Redo"),
            Shortcut::new("Y", true, false, Action::Redo, "Redo"),
            Shortcut::new("E", true, false, Action::ExportPng, "Export to PNG"),
            Shortcut::new("O", true, false, Action::UploadImage, "Upload image..."),
            Shortcut::new("Delete", true, false, Action::ResetCanvas, "Reset canvas"),
            Shortcut::new("D", false, false, Action::ToggleDarkMode, "Toggle dark mode"),
            Shortcut::new("=", false, false, Action::IncreaseTextSize, "Larger text"),
            Shortcut::new("-", false, false, Action::DecreaseTextSize, "Smaller text"),
            Shortcut::new("]", false, false, Action::IncreaseStrokeWidth, "Thicker stroke"),
            Shortcut::new("[", false, false, Action::DecreaseStrokeWidth, "Thinner stroke"),
            Shortcut::new("=", true, false, Action::GrowImage, "Enlarge selected image"),
            Shortcut::new("-", true, false, Action::ShrinkImage, "Shrink selected image"),
        ];

        for (index, &key) in DIGITS.iter().enumerate() {
            shortcuts.push(Shortcut::new(key, false, false, Action::PickColor(index), "Color"));
        }
        for (index, &key) in DIGITS.iter().take(PALETTE.len() - DIGITS.len()).enumerate() {
            shortcuts.push(Shortcut::new(
                key,
                true,
                false,
                Action::PickColor(DIGITS.len() + index),
                "Color",
            ));
        }

        shortcuts
    }

    /// Find the action bound to a key press.
    pub fn lookup(key: &str, ctrl: bool, shift: bool) -> Option<Action> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(key, ctrl, shift))
            .map(|shortcut| shortcut.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
