//! Core application state and lifecycle.

use crate::event_handler::{AppCommand, EventHandler};
use crate::shortcuts::ShortcutRegistry;
use kurbo::{Point, Size};
use scribble_core::Engine;
use scribble_core::elements::Bitmap;
use scribble_core::storage::{FileStorage, Storage, create_default_storage};
use scribble_core::upload::UploadResult;
use scribble_render::{
    ParleyTextMeasure, RenderContext, Renderer, VelloRenderer, render_scene_to_png,
};
use std::path::PathBuf;
use std::sync::Arc;
use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use vello::{AaConfig, RenderParams, RendererOptions};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::keyboard::ModifiersState;
use winit::window::{Window, WindowId};

/// Environment variable overriding where the whiteboard is saved.
pub const DATA_DIR_ENV: &str = "SCRIBBLE_DATA_DIR";

mod file_ops {
    use scribble_core::upload::UploadedFile;
    use scribble_render::EXPORT_FILE_NAME;

    /// Pick an image file using native file dialog.
    pub fn pick_image() -> Option<UploadedFile> {
        let path = rfd::FileDialog::new()
            .set_title("Upload Image")
            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
            .pick_file()?;

        match std::fs::read(&path) {
            Ok(bytes) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                log::info!("Read {} bytes from {:?}", bytes.len(), path);
                Some(UploadedFile::new(name, None, bytes))
            }
            Err(e) => {
                log::error!("Failed to read image: {}", e);
                None
            }
        }
    }

    /// Export PNG to file using native file dialog.
    pub fn export_png(png_data: &[u8]) {
        let dialog = rfd::FileDialog::new()
            .set_title("Export PNG")
            .set_file_name(EXPORT_FILE_NAME)
            .add_filter("PNG Image", &["png"]);

        if let Some(path) = dialog.save_file() {
            if let Err(e) = std::fs::write(&path, png_data) {
                log::error!("Failed to write PNG: {}", e);
            } else {
                log::info!("Exported PNG to: {:?}", path);
            }
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Where the whiteboard record lives. `None` uses the platform data dir.
    pub storage_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Scribble".to_string(),
            width: 1280,
            height: 800,
            storage_dir: None,
        }
    }
}

impl AppConfig {
    /// Defaults, with the storage directory read from `SCRIBBLE_DATA_DIR` when set.
    pub fn from_env() -> Self {
        Self::default().with_storage_dir(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    pub fn with_storage_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.storage_dir = dir;
        self
    }

    /// Open the configured store, falling back to the platform default.
    pub fn open_storage(&self) -> Arc<dyn Storage> {
        let Some(dir) = &self.storage_dir else {
            return create_default_storage();
        };
        match FileStorage::new(dir.clone()) {
            Ok(storage) => {
                log::info!("Saving whiteboard under {:?}", storage.base_path());
                Arc::new(storage)
            }
            Err(e) => {
                log::warn!("Cannot use storage dir {:?}: {}", dir, e);
                create_default_storage()
            }
        }
    }
}

/// Events delivered to the event loop from worker threads.
pub enum AppEvent {
    /// An uploaded file finished decoding.
    ImageDecoded(UploadResult<Arc<Bitmap>>),
}

/// Application state.
struct AppState {
    // Windowing
    window: Arc<Window>,
    surface: RenderSurface<'static>,

    // Rendering
    vello_renderer: vello::Renderer,
    shape_renderer: VelloRenderer,
    /// Texture blitter for RGBA->surface format conversion
    texture_blitter: vello::wgpu::util::TextureBlitter,

    // State
    engine: Engine,
    event_handler: EventHandler,
    modifiers: ModifiersState,
    config: AppConfig,
}

impl AppState {
    /// Canvas size in logical pixels, which is the space pointer events use.
    fn logical_size(&self) -> Size {
        let scale = self.window.scale_factor();
        Size::new(
            self.surface.config.width as f64 / scale,
            self.surface.config.height as f64 / scale,
        )
    }

    fn to_canvas_point(&self, x: f64, y: f64) -> Point {
        let scale = self.window.scale_factor();
        Point::new(x / scale, y / scale)
    }

    /// Show the active tool, and pending text while typing, in the title bar.
    fn update_title(&self) {
        let tool = self.engine.settings().tool.display_name();
        let pending = self.event_handler.text_buffer();
        let title = if pending.is_empty() {
            format!("{} - {}", self.config.title, tool)
        } else {
            format!("{} - {} [{}]", self.config.title, tool, pending)
        };
        self.window.set_title(&title);
    }
}

/// Render context for the surface, without selection.
fn frame_context<'a>(engine: &'a Engine, surface: &RenderSurface<'_>, scale: f64) -> RenderContext<'a> {
    let size = Size::new(surface.config.width as f64, surface.config.height as f64);
    RenderContext::new(engine.elements(), size)
        .with_scale_factor(scale)
        .with_dark_mode(engine.is_dark_mode())
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
    proxy: EventLoopProxy<AppEvent>,
}

impl App {
    /// Create a new application with default configuration.
    pub fn new(proxy: EventLoopProxy<AppEvent>) -> Self {
        Self::with_config(AppConfig::default(), proxy)
    }

    /// Create a new application with custom configuration.
    pub fn with_config(config: AppConfig, proxy: EventLoopProxy<AppEvent>) -> Self {
        Self {
            config,
            state: None,
            render_cx: None,
            proxy,
        }
    }

    /// Run the application.
    pub async fn run() {
        let event_loop = EventLoop::<AppEvent>::with_user_event()
            .build()
            .expect("Failed to create event loop");
        let mut app = App::with_config(AppConfig::from_env(), event_loop.create_proxy());
        event_loop.run_app(&mut app).expect("Event loop error");
    }

    /// Finish initialization after surface is created.
    fn finish_init(&mut self, window: Arc<Window>, surface: RenderSurface<'static>) {
        let render_cx = self.render_cx.as_ref().expect("RenderContext not initialized");
        let device = &render_cx.devices[surface.dev_id].device;

        let vello_renderer = vello::Renderer::new(device, RendererOptions::default())
            .expect("Failed to create Vello renderer");

        // Vello renders to Rgba8Unorm; the surface may want another format.
        let texture_blitter =
            vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        let mut engine = Engine::with_storage(self.config.open_storage());
        engine.set_text_measure(Box::new(ParleyTextMeasure::new()));

        log::info!(
            "Scribble initialized - {}x{}",
            surface.config.width,
            surface.config.height
        );
        ShortcutRegistry::print_all();

        let mut state = AppState {
            window: window.clone(),
            surface,
            vello_renderer,
            shape_renderer: VelloRenderer::new(),
            texture_blitter,
            engine,
            event_handler: EventHandler::new(),
            modifiers: ModifiersState::empty(),
            config: self.config.clone(),
        };
        let size = state.logical_size();
        state.engine.set_viewport_size(size.width, size.height);
        state.update_title();
        self.state = Some(state);

        window.request_redraw();
    }
}

/// Run a shell-side command produced by the event handler.
fn run_command(
    command: AppCommand,
    state: &mut AppState,
    render_cx: Option<&vello::util::RenderContext>,
    proxy: &EventLoopProxy<AppEvent>,
) {
    match command {
        AppCommand::UploadImage => start_upload(state, proxy),
        AppCommand::ExportPng => {
            if let Some(render_cx) = render_cx {
                export_png(state, render_cx);
            }
        }
    }
}

/// Pick a file and decode it on a worker thread.
fn start_upload(state: &mut AppState, proxy: &EventLoopProxy<AppEvent>) {
    let Some(file) = file_ops::pick_image() else {
        return;
    };
    let Some(decode) = state.engine.begin_image_upload(file) else {
        log::warn!("Selected file is not an image");
        return;
    };

    let proxy = proxy.clone();
    std::thread::spawn(move || {
        let result = pollster::block_on(decode);
        if proxy.send_event(AppEvent::ImageDecoded(result)).is_err() {
            log::warn!("Event loop closed before the upload finished");
        }
    });
}

/// Render the element list without selection overlay and save it as PNG.
fn export_png(state: &mut AppState, render_cx: &vello::util::RenderContext) {
    let device_handle = &render_cx.devices[state.surface.dev_id];
    let width = state.surface.config.width;
    let height = state.surface.config.height;

    let ctx = frame_context(&state.engine, &state.surface, state.window.scale_factor());
    let base_color = ctx.background_color;
    let scene = state.shape_renderer.build_export_scene(&ctx);

    let result = render_scene_to_png(
        &device_handle.device,
        &device_handle.queue,
        &mut state.vello_renderer,
        &scene,
        width,
        height,
        base_color,
    )
    .and_then(|pixels| pixels.to_png());

    match result {
        Ok(png) => file_ops::export_png(&png),
        Err(e) => log::error!("Failed to export PNG: {}", e),
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        log::info!("Creating window...");

        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };

        log::info!("Surface size: {}x{}", width, height);

        let render_cx = self
            .render_cx
            .get_or_insert_with(vello::util::RenderContext::new);

        let surface = pollster::block_on(render_cx.create_surface(
            window.clone(),
            width,
            height,
            PresentMode::AutoVsync,
        ))
        .expect("Failed to create surface");

        self.finish_init(window, surface);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            AppEvent::ImageDecoded(result) => {
                if let Some(id) = state.engine.finish_image_upload(result) {
                    log::info!("Placed image {}", id);
                }
                state.window.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }

                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                let logical = state.logical_size();
                state.engine.set_viewport_size(logical.width, logical.height);

                state.window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let logical = state.logical_size();
                state.engine.set_viewport_size(logical.width, logical.height);
                state.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                let Some(render_cx) = self.render_cx.as_ref() else {
                    return;
                };

                let device_handle = &render_cx.devices[state.surface.dev_id];
                let device = &device_handle.device;
                let queue = &device_handle.queue;

                let ctx = frame_context(&state.engine, &state.surface, state.window.scale_factor())
                    .with_selection(state.engine.selection());
                let base_color = state.shape_renderer.background_color(&ctx);
                state.shape_renderer.build_scene(&ctx);

                let surface_texture = match state.surface.surface.get_current_texture() {
                    Ok(t) => t,
                    Err(e) => {
                        log::warn!("Failed to get surface texture: {:?}", e);
                        return;
                    }
                };

                let width = state.surface.config.width;
                let height = state.surface.config.height;

                let params = RenderParams {
                    base_color,
                    width,
                    height,
                    antialiasing_method: AaConfig::Area,
                };

                // Vello's compute shaders need a StorageBinding Rgba8Unorm target.
                let render_texture = device.create_texture(&vello::wgpu::TextureDescriptor {
                    label: Some("vello render texture"),
                    size: vello::wgpu::Extent3d {
                        width,
                        height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: vello::wgpu::TextureDimension::D2,
                    format: vello::wgpu::TextureFormat::Rgba8Unorm,
                    usage: vello::wgpu::TextureUsages::STORAGE_BINDING
                        | vello::wgpu::TextureUsages::COPY_SRC
                        | vello::wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                });
                let render_texture_view =
                    render_texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

                if let Err(e) = state.vello_renderer.render_to_texture(
                    device,
                    queue,
                    state.shape_renderer.scene(),
                    &render_texture_view,
                    &params,
                ) {
                    log::error!("Failed to render: {:?}", e);
                    return;
                }

                let surface_view = surface_texture
                    .texture
                    .create_view(&vello::wgpu::TextureViewDescriptor::default());

                let mut blit_encoder =
                    device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                        label: Some("blit encoder"),
                    });
                state.texture_blitter.copy(
                    device,
                    &mut blit_encoder,
                    &render_texture_view,
                    &surface_view,
                );
                queue.submit(std::iter::once(blit_encoder.finish()));

                surface_texture.present();
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                state.modifiers = modifiers.state();
            }

            WindowEvent::CursorMoved { position, .. } => {
                let point = state.to_canvas_point(position.x, position.y);
                state
                    .event_handler
                    .handle_cursor_moved(&mut state.engine, point);
                state.window.request_redraw();
            }

            WindowEvent::CursorLeft { .. } => {
                state.event_handler.handle_cursor_left(&mut state.engine);
                state.window.request_redraw();
            }

            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                match button_state {
                    ElementState::Pressed => state.event_handler.handle_press(&mut state.engine),
                    ElementState::Released => {
                        state.event_handler.handle_release(&mut state.engine)
                    }
                }
                state.window.request_redraw();
            }

            WindowEvent::Touch(touch) => {
                let point = state.to_canvas_point(touch.location.x, touch.location.y);
                state
                    .event_handler
                    .handle_touch(&mut state.engine, touch.id, touch.phase, point);
                state.window.request_redraw();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }

                let ctrl = state.modifiers.control_key() || state.modifiers.super_key();
                let shift = state.modifiers.shift_key();
                let command = state.event_handler.handle_key(
                    &mut state.engine,
                    &event.logical_key,
                    ctrl,
                    shift,
                );
                state.update_title();

                if let Some(command) = command {
                    run_command(command, state, self.render_cx.as_ref(), &self.proxy);
                }
                state.window.request_redraw();
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.title, "Scribble");
        assert_eq!((config.width, config.height), (1280, 800));
        assert!(config.storage_dir.is_none());
    }

    #[test]
    fn test_storage_dir_round_trips_through_engine() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default().with_storage_dir(Some(dir.path().to_path_buf()));

        let mut engine = Engine::with_storage(config.open_storage());
        engine.toggle_dark_mode();

        let restored = Engine::with_storage(config.open_storage());
        assert!(restored.is_dark_mode());
    }
}
