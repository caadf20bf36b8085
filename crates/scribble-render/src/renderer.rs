//! Renderer trait abstraction.

use kurbo::{Affine, Rect, Size};
use peniko::Color;
use scribble_core::elements::{Element, ElementId};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Canvas background in light mode.
pub const LIGHT_BACKGROUND: Color = Color::from_rgba8(255, 255, 255, 255);
/// Canvas background in dark mode (gray-900).
pub const DARK_BACKGROUND: Color = Color::from_rgba8(17, 24, 39, 255);
/// Selection highlight color.
pub const SELECTION_COLOR: Color = Color::from_rgba8(0, 0, 255, 255);
/// Selection outline width.
pub const SELECTION_STROKE_WIDTH: f64 = 2.0;
/// Selection dash length (dash and gap).
pub const SELECTION_DASH: f64 = 5.0;

/// Background color for a display mode.
pub fn background_for(dark_mode: bool) -> Color {
    if dark_mode {
        DARK_BACKGROUND
    } else {
        LIGHT_BACKGROUND
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Elements in paint order.
    pub elements: &'a [Element],
    /// Selected element, if any. Stale ids are skipped.
    pub selection: Option<ElementId>,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Background color. Eraser strokes are painted with it.
    pub background_color: Color,
    /// Selection highlight color.
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(elements: &'a [Element], viewport_size: Size) -> Self {
        Self {
            elements,
            selection: None,
            viewport_size,
            scale_factor: 1.0,
            background_color: LIGHT_BACKGROUND,
            selection_color: SELECTION_COLOR,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Pick the background for a display mode.
    pub fn with_dark_mode(self, dark_mode: bool) -> Self {
        self.with_background(background_for(dark_mode))
    }

    pub fn with_selection(mut self, selection: Option<ElementId>) -> Self {
        self.selection = selection;
        self
    }

    /// Transform from canvas to device pixels.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale_factor)
    }

    /// The visible canvas area in canvas coordinates.
    pub fn viewport_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.viewport_size.width / self.scale_factor,
            self.viewport_size.height / self.scale_factor,
        )
    }
}

/// Trait for rendering backends.
///
/// Every frame is a full rebuild from the element list; there is no damage tracking.
pub trait Renderer {
    /// Build the scene for a frame: elements in order, then the selection overlay.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Helper trait for element rendering (used internally by renderers).
pub trait ElementRenderer {
    /// Render one element with the given transform.
    fn render_element(&mut self, element: &Element, transform: Affine, background: Color);

    /// Render the dashed selection outline for an element.
    fn render_selection(&mut self, element: &Element, transform: Affine, color: Color);
}
