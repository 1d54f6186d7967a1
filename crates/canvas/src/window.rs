use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::error::ShaderError;
use crate::gpu::WgpuContextSource;
use crate::mount::CanvasMount;
use crate::surface::Viewport;
use crate::types::RendererConfig;

/// Scroll gesture decoded from a key press, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ScrollKey {
    By(f32),
    Start,
    End,
}

pub(crate) fn scroll_for_key(key: &Key, line_height: f32, page_height: f32) -> Option<ScrollKey> {
    match key {
        Key::Named(NamedKey::ArrowDown) => Some(ScrollKey::By(line_height)),
        Key::Named(NamedKey::ArrowUp) => Some(ScrollKey::By(-line_height)),
        Key::Named(NamedKey::PageDown) | Key::Named(NamedKey::Space) => {
            Some(ScrollKey::By(page_height))
        }
        Key::Named(NamedKey::PageUp) => Some(ScrollKey::By(-page_height)),
        Key::Named(NamedKey::Home) => Some(ScrollKey::Start),
        Key::Named(NamedKey::End) => Some(ScrollKey::End),
        _ => None,
    }
}

/// Wheel movement in CSS pixels; positive scrolls the page down.
pub(crate) fn wheel_delta(delta: MouseScrollDelta, line_height: f32, scale_factor: f64) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * line_height,
        MouseScrollDelta::PixelDelta(position) => (-position.y / scale_factor.max(1e-3)) as f32,
    }
}

/// The window plus whatever canvas is mounted in it.
///
/// `mount` is `None` when the canvas failed to open; the window then stays up
/// with nothing drawn. A fault while drawing closes the window.
struct WindowState {
    window: Arc<Window>,
    mount: Option<CanvasMount<WgpuContextSource>>,
    line_height_px: f32,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Self {
        let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
        let sources = config.scene.sources();
        let mount = match CanvasMount::open(
            WgpuContextSource::new(Arc::clone(&window)),
            Box::new(Arc::clone(&window)),
            &sources,
            config.scene.driver(),
            viewport,
            Instant::now(),
        ) {
            Ok(mount) => Some(mount),
            Err(ShaderError::ContextUnavailable(reason)) => {
                warn!(%reason, "no graphics context; canvas left blank");
                None
            }
            Err(err) => {
                error!("{err}");
                None
            }
        };
        Self {
            window,
            mount,
            line_height_px: config.line_height_px,
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport::from_physical(self.window.inner_size(), self.window.scale_factor())
    }

    fn resize(&mut self) {
        let viewport = self.viewport();
        if let Some(mount) = self.mount.as_mut() {
            mount.resize(viewport);
        }
    }

    fn scroll_by(&mut self, delta_px: f32) {
        if let Some(mount) = self.mount.as_mut() {
            mount.scroll_by(delta_px);
        }
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let Some(mount) = self.mount.as_mut() else {
            return;
        };
        let page_height = mount.viewport().css_height;
        match scroll_for_key(&event.logical_key, self.line_height_px, page_height) {
            Some(ScrollKey::By(delta)) => mount.scroll_by(delta),
            Some(ScrollKey::Start) => mount.scroll_to(0.0),
            Some(ScrollKey::End) => {
                let (_, max) = mount.scroll_extent();
                mount.scroll_to(max);
            }
            None => {}
        }
    }

    /// Returns `false` after a frame fault; the mount is closed by then.
    fn redraw(&mut self) -> bool {
        let Some(mount) = self.mount.as_mut() else {
            return true;
        };
        match mount.frame(Instant::now()) {
            Ok(_) => true,
            Err(err) => {
                error!("{err}; unmounting canvas");
                self.close();
                false
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut mount) = self.mount.take() {
            mount.close();
        }
    }
}

/// Opens the window and drives the `winit` event loop until it closes.
///
/// Redraws are only ever requested by the mounted canvas, so the loop sleeps
/// between events unless a scene animates continuously.
pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let (width, height) = config.window_size;
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(LogicalSize::new(width as f64, height as f64))
        .build(&event_loop)
        .context("failed to create window")?;
    let window = Arc::new(window);
    info!(scene = config.scene.label(), width, height, "opened window");

    let mut state = WindowState::new(window, config);

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window.id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        state.close();
                        elwt.exit();
                    }
                    WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                        state.resize();
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let delta =
                            wheel_delta(delta, state.line_height_px, state.window.scale_factor());
                        state.scroll_by(delta);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state == ElementState::Pressed
                            && event.logical_key == Key::Named(NamedKey::Escape)
                        {
                            state.close();
                            elwt.exit();
                        } else {
                            state.handle_key(&event);
                        }
                    }
                    WindowEvent::Occluded(false) => {
                        if let Some(mount) = state.mount.as_mut() {
                            mount.request_redraw();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if !state.redraw() {
                            elwt.exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => elwt.set_control_flow(ControlFlow::Wait),
            _ => {}
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}
