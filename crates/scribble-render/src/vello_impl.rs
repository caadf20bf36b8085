//! Vello-based renderer implementation.

use crate::renderer::{
    ElementRenderer, RenderContext, Renderer, SELECTION_DASH, SELECTION_STROKE_WIDTH,
};
use kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Shape as KurboShape, Stroke};
use parley::layout::{Layout, PositionedLayoutItem};
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use scribble_core::elements::{Element, ElementId, ElementTrait, Image, Text};
use scribble_core::hit_test::{TextMeasure, text_bounds};
use std::collections::HashMap;
use std::sync::Arc;
use vello::Scene;

/// Font stack for text elements.
const FONT_STACK: &str = "Arial, Helvetica, sans-serif";

/// Parley-backed text layout, shared by drawing and hit-testing.
pub struct ParleyTextMeasure {
    font_cx: FontContext,
    layout_cx: LayoutContext<Brush>,
}

impl Default for ParleyTextMeasure {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyTextMeasure {
    /// Create a measurer over the system font collection.
    pub fn new() -> Self {
        Self {
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
        }
    }

    /// Lay out a single unwrapped line.
    fn layout(&mut self, content: &str, font_size: f64, brush: Brush) -> Layout<Brush> {
        let mut builder = self
            .layout_cx
            .ranged_builder(&mut self.font_cx, content, 1.0, false);
        builder.push_default(StyleProperty::FontSize(font_size as f32));
        builder.push_default(StyleProperty::Brush(brush));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(
            FONT_STACK.into(),
        )));
        let mut layout = builder.build(content);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());
        layout
    }
}

impl TextMeasure for ParleyTextMeasure {
    fn text_width(&mut self, content: &str, font_size: f64) -> f64 {
        if content.is_empty() {
            return 0.0;
        }
        let width = self.layout(content, font_size, Brush::default()).width() as f64;
        if width > 0.0 {
            width
        } else {
            // No usable system font.
            Text::new(Point::ZERO, content)
                .with_font_size(font_size)
                .approximate_width()
        }
    }
}

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Text layout (cached to avoid rebuilding the font collection).
    text: ParleyTextMeasure,
    /// Image cache to avoid re-decoding images every frame.
    /// Key is the element ID, value is the decoded peniko ImageData.
    image_cache: HashMap<ElementId, peniko::ImageData>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            text: ParleyTextMeasure::new(),
            image_cache: HashMap::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Number of decoded images held.
    pub fn cached_images(&self) -> usize {
        self.image_cache.len()
    }

    /// Build a scene for export: background and elements, no selection overlay.
    pub fn build_export_scene(&mut self, ctx: &RenderContext) -> Scene {
        self.paint_elements(ctx);
        std::mem::take(&mut self.scene)
    }

    /// Reset the scene, fill the background and draw every element in order.
    fn paint_elements(&mut self, ctx: &RenderContext) {
        self.scene.reset();
        self.image_cache
            .retain(|id, _| ctx.elements.iter().any(|e| e.id() == *id));

        let background = Rect::new(0.0, 0.0, ctx.viewport_size.width, ctx.viewport_size.height);
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            ctx.background_color,
            None,
            &background,
        );

        let transform = ctx.transform();
        for element in ctx.elements {
            self.render_element(element, transform, ctx.background_color);
        }
    }

    /// Stroke a freehand polyline with round caps and joins.
    fn render_polyline(&mut self, path: &BezPath, color: Color, width: f64, transform: Affine) {
        let stroke = Stroke::new(width)
            .with_caps(Cap::Round)
            .with_join(Join::Round);
        self.scene.stroke(&stroke, transform, color, None, path);
    }

    /// Stroke an outline.
    fn render_outline(&mut self, path: &BezPath, color: Color, width: f64, transform: Affine) {
        let stroke = Stroke::new(width);
        self.scene.stroke(&stroke, transform, color, None, path);
    }

    /// Render a text element with its baseline on the anchor.
    fn render_text(&mut self, text: &Text, transform: Affine) {
        if text.content.is_empty() {
            return;
        }

        let brush = Brush::Solid(text.color.into());
        let layout = self.text.layout(&text.content, text.font_size, brush.clone());

        // Parley puts y = 0 at the top of the first line.
        let first_baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline as f64)
            .unwrap_or(text.font_size);
        let text_transform =
            transform * Affine::translate((text.anchor.x, text.anchor.y - first_baseline));

        // Adapted from Parley's vello example
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let font_size = run.font_size();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }
    }

    /// Decode (or fetch from cache) the pixels of an image element.
    fn decoded_image(&mut self, image: &Image) -> Option<peniko::ImageData> {
        let id = image.id();
        if let Some(cached) = self.image_cache.get(&id) {
            return Some(cached.clone());
        }

        let raw = image.bitmap.data()?;
        let decoded = match ::image::load_from_memory_with_format(
            &raw,
            image.bitmap.format.decoder_format(),
        ) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("Failed to decode image {id}: {e}");
                return None;
            }
        };
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = peniko::ImageData {
            data: peniko::Blob::new(Arc::new(rgba.into_vec())),
            format: peniko::ImageFormat::Rgba8,
            width,
            height,
            alpha_type: peniko::ImageAlphaType::Alpha,
        };
        self.image_cache.insert(id, data.clone());
        Some(data)
    }

    /// Render an image element scaled to its current size.
    fn render_image(&mut self, image: &Image, transform: Affine) {
        let bounds = image.as_rect();
        let Some(image_data) = self.decoded_image(image) else {
            self.render_image_placeholder(bounds, transform);
            return;
        };
        if image_data.width == 0 || image_data.height == 0 {
            return;
        }

        let scale_x = bounds.width() / image_data.width as f64;
        let scale_y = bounds.height() / image_data.height as f64;
        let image_transform = transform
            * Affine::translate((bounds.x0, bounds.y0))
            * Affine::scale_non_uniform(scale_x, scale_y);

        self.scene.draw_image(&peniko::ImageBrush::from(image_data), image_transform);
    }

    /// Render a placeholder for images that couldn't be decoded.
    fn render_image_placeholder(&mut self, bounds: Rect, transform: Affine) {
        let rect_path = bounds.to_path(0.1);
        self.scene.fill(
            Fill::NonZero,
            transform,
            Color::from_rgba8(200, 200, 200, 255),
            None,
            &rect_path,
        );

        let mut x_path = BezPath::new();
        x_path.move_to(Point::new(bounds.x0, bounds.y0));
        x_path.line_to(Point::new(bounds.x1, bounds.y1));
        x_path.move_to(Point::new(bounds.x1, bounds.y0));
        x_path.line_to(Point::new(bounds.x0, bounds.y1));
        self.render_outline(&x_path, Color::from_rgba8(150, 150, 150, 255), 2.0, transform);
    }

    /// Outline that the selection overlay follows.
    fn selection_outline(&mut self, element: &Element) -> BezPath {
        match element {
            Element::Circle(circle) => circle.as_kurbo().to_path(0.1),
            Element::Text(text) => text_bounds(text, &mut self.text).to_path(0.1),
            other => other.bounds().to_path(0.1),
        }
    }
}

impl ElementRenderer for VelloRenderer {
    fn render_element(&mut self, element: &Element, transform: Affine, background: Color) {
        match element {
            Element::Stroke(stroke) => {
                let color = stroke.color.into();
                self.render_polyline(&stroke.to_path(), color, stroke.stroke_width, transform);
            }
            // Painted over, not erased: shows as a background-colored patch on images.
            Element::Eraser(stroke) => {
                self.render_polyline(&stroke.to_path(), background, stroke.stroke_width, transform);
            }
            Element::Rectangle(rect) => {
                let path = rect.as_rect().to_path(0.1);
                self.render_outline(&path, rect.color.into(), rect.stroke_width, transform);
            }
            Element::Circle(circle) => {
                let path = circle.as_kurbo().to_path(0.1);
                self.render_outline(&path, circle.color.into(), circle.stroke_width, transform);
            }
            Element::Text(text) => self.render_text(text, transform),
            Element::Image(image) => self.render_image(image, transform),
        }
    }

    fn render_selection(&mut self, element: &Element, transform: Affine, color: Color) {
        let path = self.selection_outline(element);
        let stroke = Stroke::new(SELECTION_STROKE_WIDTH)
            .with_dashes(0.0, &[SELECTION_DASH, SELECTION_DASH]);
        self.scene.stroke(&stroke, transform, color, None, &path);
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.paint_elements(ctx);

        let selected = ctx
            .selection
            .and_then(|id| ctx.elements.iter().find(|e| e.id() == id));
        if let Some(element) = selected {
            self.render_selection(element, ctx.transform(), ctx.selection_color);
        }
    }
}
