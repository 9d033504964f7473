use std::{
    fmt::Display,
    num::NonZeroUsize,
    sync::Arc,
    time::Instant,
};

use log::{debug, info};
use vello::{
    AaConfig, Renderer, RendererOptions,
    kurbo::Point,
    peniko::Color,
    util::{RenderContext, RenderSurface},
    wgpu,
};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::{Animation, Error, Limits, Plot, Result};

pub(crate) struct WalkViewer<'p, 's> {
    plot: &'p mut Plot,
    title: String,
    is_plot_outdated: bool,

    animation: Option<Animation>,
    next_frame: Instant,

    context: RenderContext,
    render_state: Option<RenderState<'s>>,
    renderers: Vec<Option<Renderer>>,

    is_mouse_down: bool,
    drag_start: Option<Point>,
    prior_position: Option<Point>,

    error: Option<Error>,
}

impl<'p, 's> WalkViewer<'p, 's> {
    pub(crate) fn new(plot: &'p mut Plot, title: &str, animation: Option<Animation>) -> Self {
        if let Some(animation) = &animation {
            plot.show_frame(Some(animation.frame()));
            if animation.limits == Limits::Growing {
                plot.fit(Some(animation.frame()));
            }
        }

        Self {
            plot,
            title: title.to_owned(),
            is_plot_outdated: true,
            animation,
            next_frame: Instant::now(),
            context: RenderContext::new(),
            render_state: None,
            renderers: Vec::new(),
            is_mouse_down: false,
            drag_start: None,
            prior_position: None,
            error: None,
        }
    }

    /// this blocks
    pub(crate) fn display(&mut self) -> Result<()> {
        let event_loop = EventLoop::new().map_err(|e| Error::Viewer(e.to_string()))?;
        event_loop
            .run_app(self)
            .map_err(|e| Error::Viewer(e.to_string()))?;

        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: impl Display) {
        self.error = Some(Error::Viewer(error.to_string()));
        event_loop.exit();
    }

    fn request_redraw(&self) {
        if let Some(RenderState { window, .. }) = &self.render_state {
            window.request_redraw();
        }
    }

    fn show_frame(&mut self, frame: usize) {
        self.plot.show_frame(Some(frame));
        if self
            .animation
            .as_ref()
            .is_some_and(|animation| animation.limits == Limits::Growing)
        {
            self.plot.fit(Some(frame));
        }
        self.is_plot_outdated = true;
        self.request_redraw();
    }

    fn render(&mut self) -> std::result::Result<(), String> {
        let Some(RenderState { surface, .. }) = &self.render_state else {
            return Ok(());
        };
        let width = surface.config.width;
        let height = surface.config.height;

        let device_handle = &self.context.devices[surface.dev_id];

        let render_params = vello::RenderParams {
            base_color: Color::WHITE,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };

        if self.is_plot_outdated {
            self.plot.redraw();
            self.is_plot_outdated = false;
        }

        let Some(renderer) = self.renderers[surface.dev_id].as_mut() else {
            return Err("no renderer for surface device".to_owned());
        };
        renderer
            .render_to_texture(
                &device_handle.device,
                &device_handle.queue,
                &self.plot.scene,
                &surface.target_view,
                &render_params,
            )
            .map_err(|e| format!("failed to render to texture: {e}"))?;

        let surface_texture = surface
            .surface
            .get_current_texture()
            .map_err(|e| format!("failed to get surface texture: {e}"))?;
        let mut encoder =
            device_handle
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Surface Blit"),
                });
        surface.blitter.copy(
            &device_handle.device,
            &mut encoder,
            &surface.target_view,
            &surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
        );
        device_handle.queue.submit([encoder.finish()]);
        surface_texture.present();

        device_handle
            .device
            .poll(wgpu::PollType::Poll)
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

impl ApplicationHandler for WalkViewer<'_, '_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.render_state.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_inner_size(LogicalSize::new(self.plot.width(), self.plot.height()))
                .with_resizable(true)
                .with_title(self.title.as_str()),
        ) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e),
        };
        let size = window.inner_size();
        self.plot.set_scale_factor(window.scale_factor());
        self.plot.resize(size.width, size.height);

        let present_mode = wgpu::PresentMode::AutoVsync;
        let surface_future =
            self.context
                .create_surface(window.clone(), size.width, size.height, present_mode);
        let surface = match pollster::block_on(surface_future) {
            Ok(surface) => surface,
            Err(e) => return self.fail(event_loop, format!("error creating surface: {e}")),
        };

        let render_state = RenderState { surface, window };

        self.renderers
            .resize_with(self.context.devices.len(), || None);

        let id = render_state.surface.dev_id;
        if self.renderers[id].is_none() {
            let device_handle = &self.context.devices[id];
            let renderer = Renderer::new(
                &device_handle.device,
                RendererOptions {
                    use_cpu: false,
                    antialiasing_support: [AaConfig::Area].iter().copied().collect(),
                    num_init_threads: NonZeroUsize::new(1),
                    pipeline_cache: None,
                },
            );
            match renderer {
                Ok(renderer) => self.renderers[id] = Some(renderer),
                Err(e) => return self.fail(event_loop, e),
            }
        }

        info!("opened window {:?}", self.title);
        self.render_state = Some(render_state);
        self.next_frame = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(render_state) = &mut self.render_state else {
            return;
        };
        if render_state.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.logical_key.as_ref() {
                    Key::Named(NamedKey::Escape) => event_loop.exit(),
                    Key::Named(NamedKey::Space) => {
                        if let Some(animation) = &mut self.animation {
                            animation.toggle_pause();
                            debug!("animation paused: {}", animation.is_paused());
                        }
                    }
                    Key::Character("r" | "R") => {
                        if let Some(animation) = &mut self.animation {
                            animation.restart();
                            self.next_frame = Instant::now();
                            self.show_frame(0);
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(RenderState { surface, window }) = &mut self.render_state {
                    self.context
                        .resize_surface(surface, size.width, size.height);
                    self.plot.resize(size.width, size.height);
                    self.is_plot_outdated = true;
                    window.request_redraw();
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.plot.set_scale_factor(scale_factor);
                self.is_plot_outdated = true;
                self.request_redraw();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.is_mouse_down = state == ElementState::Pressed;
                    self.drag_start = if self.is_mouse_down {
                        self.prior_position
                    } else {
                        None
                    };
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.prior_position = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let factor = match delta {
                    MouseScrollDelta::LineDelta(_, y) => 1.0 - y as f64 / 10.0,
                    MouseScrollDelta::PixelDelta(delta) => 1.0 - delta.y / 500.0,
                };

                if let Some(prior) = self.prior_position {
                    self.plot.zoom(prior.into(), factor);
                    self.is_plot_outdated = true;
                    self.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Point {
                    x: position.x,
                    y: position.y,
                };

                if self.is_mouse_down {
                    if let (Some(start), Some(prior)) = (self.drag_start, self.prior_position) {
                        self.plot
                            .drag(start.into(), prior.into(), position.into());
                        self.is_plot_outdated = true;
                        self.request_redraw();
                    }
                }

                self.prior_position = Some(position);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(animation) = &mut self.animation else {
            return;
        };
        if animation.is_paused() || animation.is_finished() {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }

        let now = Instant::now();
        if now >= self.next_frame {
            self.next_frame = now + animation.interval;
            if let Some(frame) = animation.advance() {
                self.show_frame(frame);
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }
}

struct RenderState<'s> {
    surface: RenderSurface<'s>,
    window: Arc<Window>,
}
