//! Scribble Core Library
//!
//! Platform-agnostic drawing-element engine for the Scribble whiteboard: the
//! element model, gesture state machine, hit-testing, undo history and persistence.

pub mod elements;
pub mod engine;
pub mod history;
pub mod input;
pub mod settings;
pub mod storage;
pub mod tools;
pub mod upload;

pub use elements::{Element, ElementId, ElementTrait, SerializableColor};
pub use engine::{Engine, InteractionState};
pub use hit_test::{ApproximateTextMeasure, TextMeasure, element_at};
pub use history::HistoryStore;
pub use input::{InputState, PointerEvent, TouchEvent};
pub use settings::{PALETTE, ResizeDirection, ToolSettings};
pub use storage::{PersistedState, PersistenceGateway, Storage};
pub use tools::ToolKind;
pub use upload::{UploadError, UploadedFile};
