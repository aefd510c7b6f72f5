//! Core application state and lifecycle.

use std::sync::Arc;

use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use scrawl_core::api::{ApiConfig, DEFAULT_BASE_URL, timestamp_millis};
use scrawl_core::canvas::Canvas;
use scrawl_core::input::PointerEvent;
use scrawl_render::{RenderContext, Renderer, VelloRenderer};
use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use vello::{AaConfig, RenderParams, RendererOptions};
use winit::application::ApplicationHandler;
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

#[cfg(not(target_arch = "wasm32"))]
use winit::dpi::LogicalSize;

use crate::event_handler::EventHandler;
use crate::export;
use crate::save::{SaveNotifier, SaveQueue, SharedApi};
use crate::ui::{render_ui, UiAction, UiState};

/// Environment variable naming the whiteboard server (native).
pub const API_URL_ENV: &str = "SCRAWL_API_URL";

/// Events sent to the event loop from outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// A background save has a result waiting.
    SaveFinished,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
    /// Whiteboard server base URL. Empty means the page origin.
    pub api_base_url: String,
    /// File name offered for PNG exports.
    pub export_filename: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Whiteboard".to_string(),
            width: 1280,
            height: 800,
            background_color: Color::WHITE,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            export_filename: "whiteboard.png".to_string(),
        }
    }
}

impl AppConfig {
    /// Default configuration with the server URL taken from `SCRAWL_API_URL`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::default().with_api_url(std::env::var(API_URL_ENV).ok())
    }

    /// Point at another server; blank values keep the current one.
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        self
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api_base_url.clone())
    }

    fn api_client(&self) -> SharedApi {
        #[cfg(not(target_arch = "wasm32"))]
        {
            Arc::new(scrawl_core::api::HttpApi::new(self.api_config()))
        }
        #[cfg(target_arch = "wasm32")]
        {
            std::rc::Rc::new(scrawl_core::api::FetchApi::new(self.api_config()))
        }
    }
}

/// Runtime state for the application.
struct AppState {
    // Windowing
    window: Arc<Window>,
    surface: RenderSurface<'static>,

    // Rendering
    vello_renderer: vello::Renderer,
    shape_renderer: VelloRenderer,
    /// Converts the RGBA render target to the surface format.
    texture_blitter: vello::wgpu::util::TextureBlitter,

    // egui
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    ui_state: UiState,

    // State
    canvas: Canvas,
    config: AppConfig,
    event_handler: EventHandler,
    saves: SaveQueue,
}

impl AppState {
    /// Feed a pointer event to the canvas.
    fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        #[cfg(not(target_arch = "wasm32"))]
        {
            // The text modal owns the pointer until it is answered
            if self.ui_state.pending_text.is_some() {
                return false;
            }
            let mut prompt = crate::ui::DeferredTextPrompt(&mut self.ui_state.pending_text);
            self.canvas.handle_pointer_event(event, &mut prompt)
        }
        #[cfg(target_arch = "wasm32")]
        {
            self.canvas
                .handle_pointer_event(event, &mut crate::web::BrowserPrompt)
        }
    }

    fn apply_action(&mut self, action: UiAction, render_cx: Option<&vello::util::RenderContext>) {
        match action {
            UiAction::SetTool(tool) => {
                self.canvas.set_tool(tool);
                self.ui_state.current_tool = tool;
            }
            UiAction::SetColor(color) => {
                self.canvas.set_color(color);
                self.ui_state.color = color;
            }
            UiAction::SetStrokeWidth(width) => {
                self.canvas.set_stroke_width(width);
                self.ui_state.stroke_width = width;
            }
            UiAction::Save => self.saves.submit(self.canvas.save_payload(timestamp_millis())),
            UiAction::Export => match render_cx {
                Some(render_cx) => self.export_png(render_cx),
                None => log::warn!("Export requested before the renderer was ready"),
            },
            UiAction::Clear => {
                self.canvas.clear();
                log::info!("Whiteboard cleared");
            }
            UiAction::SubmitText { position, text } => {
                self.ui_state.pending_text = None;
                self.canvas.insert_text(position, text);
            }
            UiAction::CancelText => self.ui_state.pending_text = None,
        }
    }

    /// Render the visible drawing surface offscreen and hand the PNG to the platform.
    fn export_png(&mut self, render_cx: &vello::util::RenderContext) {
        let surface = self.event_handler.surface();
        let width = surface.width().round().max(0.0) as u32;
        let height = surface.height().round().max(0.0) as u32;
        let scene = self.shape_renderer.build_export_scene(
            &self.canvas,
            Size::new(width as f64, height as f64),
            Color::WHITE,
        );

        let device_handle = &render_cx.devices[self.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;
        log::info!("Exporting PNG: {}x{}", width, height);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let png_data = export::render_scene_to_png(
                device,
                queue,
                &mut self.vello_renderer,
                &scene,
                width,
                height,
            )
            .and_then(|result| export::encode_png(&result.rgba_data, result.width, result.height));
            match png_data {
                Ok(png_data) => export::deliver_png(&png_data, &self.config.export_filename),
                Err(e) => log::error!("PNG export failed: {}", e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        export::spawn_png_export_async(
            device,
            queue,
            scene,
            width,
            height,
            self.config.export_filename.clone(),
        );
    }

    /// Run the UI, paint the canvas and composite egui on top.
    fn redraw(&mut self, render_cx: &vello::util::RenderContext) {
        if let Some(notification) = self.saves.poll() {
            self.ui_state.notify(notification);
        }
        self.ui_state.expire_notification(web_time::Instant::now());

        let egui_input = self.egui_state.take_egui_input(&self.window);
        let mut action = None;
        let egui_output = self.egui_ctx.run(egui_input, |ctx| {
            action = render_ui(ctx, &mut self.ui_state);
        });
        self.egui_state
            .handle_platform_output(&self.window, egui_output.platform_output);
        let egui_primitives = self
            .egui_ctx
            .tessellate(egui_output.shapes, egui_output.pixels_per_point);

        let surface_rect = self.ui_state.surface_rect;
        self.event_handler.set_surface(Rect::new(
            surface_rect.min.x as f64,
            surface_rect.min.y as f64,
            surface_rect.max.x as f64,
            surface_rect.max.y as f64,
        ));

        if let Some(action) = action {
            self.apply_action(action, Some(render_cx));
        }

        let width = self.surface.config.width;
        let height = self.surface.config.height;
        let render_ctx = RenderContext::new(&self.canvas, Size::new(width as f64, height as f64))
            .with_scale_factor(egui_output.pixels_per_point as f64)
            .with_surface_origin(Vec2::new(surface_rect.min.x as f64, surface_rect.min.y as f64))
            .with_background(self.config.background_color);
        self.shape_renderer.build_scene(&render_ctx);

        let device_handle = &render_cx.devices[self.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;

        let surface_texture = match self.surface.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Failed to get surface texture: {:?}", e);
                return;
            }
        };

        let params = RenderParams {
            base_color: self.config.background_color,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };

        // Vello needs a storage-bindable target, which WebGPU only offers for Rgba8Unorm
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

        if let Err(e) = self.vello_renderer.render_to_texture(
            device,
            queue,
            self.shape_renderer.scene(),
            &render_texture_view,
            &params,
        ) {
            log::error!("Failed to render: {:?}", e);
            return;
        }

        let surface_view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());

        {
            let mut blit_encoder =
                device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                    label: Some("blit encoder"),
                });
            self.texture_blitter
                .copy(device, &mut blit_encoder, &render_texture_view, &surface_view);
            queue.submit(std::iter::once(blit_encoder.finish()));
        }

        for (id, image_delta) in &egui_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: egui_output.pixels_per_point,
        };

        {
            let mut egui_encoder =
                device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                    label: Some("egui encoder"),
                });
            self.egui_renderer.update_buffers(
                device,
                queue,
                &mut egui_encoder,
                &egui_primitives,
                &screen_descriptor,
            );

            let render_pass = egui_encoder.begin_render_pass(&vello::wgpu::RenderPassDescriptor {
                label: Some("egui render pass"),
                color_attachments: &[Some(vello::wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: vello::wgpu::Operations {
                        // Keep the canvas underneath
                        load: vello::wgpu::LoadOp::Load,
                        store: vello::wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // egui-wgpu wants a 'static render pass
            let mut render_pass = render_pass.forget_lifetime();
            self.egui_renderer
                .render(&mut render_pass, &egui_primitives, &screen_descriptor);
            drop(render_pass);

            queue.submit(std::iter::once(egui_encoder.finish()));
        }

        for id in &egui_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
        surface_texture.present();

        if self.egui_ctx.has_requested_repaint() {
            self.window.request_redraw();
        }
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
    proxy: Option<EventLoopProxy<AppEvent>>,
    /// Window waiting for async surface creation (WASM only)
    pending_window: Option<Arc<Window>>,
    #[cfg(target_arch = "wasm32")]
    init_in_progress: std::cell::Cell<bool>,
}

impl App {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            render_cx: None,
            proxy: None,
            pending_window: None,
            #[cfg(target_arch = "wasm32")]
            init_in_progress: std::cell::Cell::new(false),
        }
    }

    /// Run the application.
    pub async fn run(config: AppConfig) {
        let event_loop = EventLoop::<AppEvent>::with_user_event()
            .build()
            .expect("Failed to create event loop");
        let mut app = App::with_config(config);
        app.proxy = Some(event_loop.create_proxy());

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::EventLoopExtWebSys;
            event_loop.spawn_app(app);
        }

        #[cfg(not(target_arch = "wasm32"))]
        event_loop.run_app(&mut app).expect("Event loop error");
    }

    /// Finish initialization after the surface is created.
    fn finish_init(&mut self, window: Arc<Window>, surface: RenderSurface<'static>) {
        let Some(render_cx) = self.render_cx.as_ref() else {
            log::error!("Render context missing after surface creation");
            return;
        };
        let device = &render_cx.devices[surface.dev_id].device;

        let vello_renderer = match vello::Renderer::new(device, RendererOptions::default()) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Failed to create Vello renderer: {:?}", e);
                return;
            }
        };
        let texture_blitter =
            vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface.config.format,
            egui_wgpu::RendererOptions::default(),
        );

        log::info!(
            "Scrawl initialized - {}x{}, saving to {}",
            surface.config.width,
            surface.config.height,
            self.config.api_base_url
        );

        self.state = Some(AppState {
            window: window.clone(),
            surface,
            vello_renderer,
            shape_renderer: VelloRenderer::new(),
            texture_blitter,
            egui_ctx,
            egui_state,
            egui_renderer,
            ui_state: UiState::new(self.config.title.clone()),
            canvas: Canvas::new(),
            saves: self.save_queue(),
            config: self.config.clone(),
            event_handler: EventHandler::new(),
        });
        self.pending_window = None;

        window.request_redraw();
    }

    /// Save queue that wakes the event loop when a save finishes.
    fn save_queue(&self) -> SaveQueue {
        let queue = SaveQueue::new(self.config.api_client());
        let Some(proxy) = self.proxy.clone() else {
            return queue;
        };
        let notify = move || {
            if proxy.send_event(AppEvent::SaveFinished).is_err() {
                log::debug!("Save finished after the event loop closed");
            }
        };
        #[cfg(not(target_arch = "wasm32"))]
        let notifier: SaveNotifier = Arc::new(notify);
        #[cfg(target_arch = "wasm32")]
        let notifier: SaveNotifier = std::rc::Rc::new(notify);
        queue.with_notifier(notifier)
    }

    /// Kick off surface creation for a window created on the web.
    #[cfg(target_arch = "wasm32")]
    fn start_async_init(&mut self, window: Arc<Window>) {
        let Some(web_window) = web_sys::window() else {
            return;
        };
        let dpr = web_window.device_pixel_ratio();
        let viewport_width = web_window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(self.config.width as f64);
        let viewport_height = web_window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(self.config.height as f64);
        let width = (viewport_width * dpr) as u32;
        let height = (viewport_height * dpr) as u32;

        self.init_in_progress.set(true);
        let self_ptr = self as *mut Self;

        wasm_bindgen_futures::spawn_local(async move {
            log::info!("Creating surface asynchronously...");
            let mut render_cx = vello::util::RenderContext::new();

            match render_cx
                .create_surface(window.clone(), width, height, PresentMode::AutoVsync)
                .await
            {
                Ok(surface) => {
                    // SAFETY: the surface only borrows the window, which it
                    // owns through the Arc stored alongside it.
                    let surface: RenderSurface<'static> = unsafe { std::mem::transmute(surface) };
                    // SAFETY: WASM is single threaded and the event loop keeps
                    // the App alive for the lifetime of the page.
                    let app = unsafe { &mut *self_ptr };
                    app.render_cx = Some(render_cx);
                    app.finish_init(window, surface);
                }
                Err(e) => {
                    log::error!("Failed to create surface: {:?}", e);
                    let app = unsafe { &mut *self_ptr };
                    app.init_in_progress.set(false);
                }
            }
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn window_attributes(&self) -> winit::window::WindowAttributes {
        use wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        let web_window = web_sys::window().expect("No window");
        let document = web_window.document().expect("No document");

        let viewport_width = web_window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(self.config.width as f64);
        let viewport_height = web_window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(self.config.height as f64);

        if let Some(loading) = document.get_element_by_id("loading") {
            loading.remove();
        }

        let canvas = document
            .get_element_by_id("scrawl-canvas")
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
            .or_else(|| {
                let body = document.body()?;
                let canvas = document.create_element("canvas").ok()?;
                canvas.set_id("scrawl-canvas");
                body.append_child(&canvas).ok()?;
                canvas.dyn_into::<web_sys::HtmlCanvasElement>().ok()
            })
            .expect("Failed to create canvas");

        let dpr = web_window.device_pixel_ratio();
        canvas.set_width((viewport_width * dpr) as u32);
        canvas.set_height((viewport_height * dpr) as u32);
        let style = canvas.style();
        let _ = style.set_property("width", "100%");
        let _ = style.set_property("height", "100%");
        let _ = style.set_property("display", "block");
        let _ = style.set_property("position", "fixed");
        let _ = style.set_property("top", "0");
        let _ = style.set_property("left", "0");

        Window::default_attributes()
            .with_title(&self.config.title)
            .with_canvas(Some(canvas))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn window_attributes(&self) -> winit::window::WindowAttributes {
        Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        // Banner timeout
        if let StartCause::ResumeTimeReached { .. } = cause {
            if let Some(state) = &self.state {
                state.window.request_redraw();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::SaveFinished => {
                if let Some(state) = &self.state {
                    state.window.request_redraw();
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let deadline = self
            .state
            .as_ref()
            .and_then(|state| state.ui_state.notification_deadline());
        match deadline {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.pending_window.is_some() {
            return;
        }

        log::info!("Creating window...");
        let window = Arc::new(
            event_loop
                .create_window(self.window_attributes())
                .expect("Failed to create window"),
        );

        #[cfg(not(target_arch = "wasm32"))]
        {
            let size = window.inner_size();
            let (width, height) = if size.width == 0 || size.height == 0 {
                (self.config.width, self.config.height)
            } else {
                (size.width, size.height)
            };

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

            // SAFETY: the surface only borrows the window, which it owns
            // through the Arc stored alongside it in AppState.
            let surface: RenderSurface<'static> = unsafe { std::mem::transmute(surface) };
            self.finish_init(window, surface);
        }

        #[cfg(target_arch = "wasm32")]
        {
            self.pending_window = Some(window);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        #[cfg(target_arch = "wasm32")]
        if self.state.is_none() {
            if let Some(window) = self.pending_window.clone() {
                if !self.init_in_progress.get() {
                    self.start_async_init(window.clone());
                }
                window.request_redraw();
            }
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        let egui_response = state.egui_state.on_window_event(&state.window, &event);
        if egui_response.repaint {
            state.window.request_redraw();
        }
        // Popups and the text modal float over the drawing surface
        let egui_wants_pointer = egui_response.consumed
            || state.egui_ctx.is_pointer_over_area()
            || state.egui_ctx.wants_pointer_input();

        let pixels_per_point = state.egui_ctx.pixels_per_point() as f64;
        let pointer_event = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                None
            }
            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                state.window.request_redraw();
                None
            }
            WindowEvent::RedrawRequested => {
                let Some(render_cx) = self.render_cx.as_ref() else {
                    return;
                };
                state.redraw(render_cx);
                None
            }
            WindowEvent::CursorMoved { position, .. } => state.event_handler.cursor_moved(
                Point::new(position.x / pixels_per_point, position.y / pixels_per_point),
            ),
            WindowEvent::CursorLeft { .. } => state.event_handler.cursor_left(),
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                let event = state.event_handler.mouse_input(button_state, button);
                // Presses over egui windows belong to egui; releases always reach the canvas
                match event {
                    Some(PointerEvent::Down { .. }) if egui_wants_pointer => None,
                    other => other,
                }
            }
            _ => None,
        };

        if let Some(pointer_event) = pointer_event {
            if state.handle_pointer(pointer_event) {
                state.window.request_redraw();
            }
            // A text prompt opened by this press needs a frame to appear
            if state.ui_state.pending_text.is_some() {
                state.window.request_redraw();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.export_filename, "whiteboard.png");
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.background_color, Color::WHITE);
        assert_eq!(
            config.api_config().save_url(),
            "http://localhost:3030/api/whiteboard/save"
        );
    }

    #[test]
    fn test_api_url_override() {
        let config = AppConfig::default().with_api_url(Some("http://example.com:8080/".into()));
        assert_eq!(config.api_base_url, "http://example.com:8080");

        let config = AppConfig::default().with_api_url(Some("   ".into()));
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);

        let config = AppConfig::default().with_api_url(None);
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
    }
}
