//! Scribble Render Library
//!
//! Renderer abstraction and implementations for Scribble.
//! The default implementation uses Vello for GPU-accelerated rendering and
//! Parley for text layout.

mod export;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use export::{EXPORT_FILE_NAME, PngRenderResult, encode_png};
pub use renderer::{
    DARK_BACKGROUND, ElementRenderer, LIGHT_BACKGROUND, RenderContext, RenderResult, Renderer,
    RendererError, SELECTION_COLOR, background_for,
};

#[cfg(all(feature = "vello-renderer", not(target_arch = "wasm32")))]
pub use export::render_scene_to_png;

#[cfg(feature = "vello-renderer")]
pub use vello_impl::{ParleyTextMeasure, VelloRenderer};
