//! Native window front end (winit + wgpu surface).

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::audio::default_backend;
use crate::config::GardenConfig;
use crate::garden::Garden;
use crate::gpu::renderer::Renderer;
use crate::input::{InputEvent, Key};

/// Longest frame step fed to the garden.
const MAX_FRAME_DT: f32 = 0.1;

struct App {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: Renderer,
    garden: Garden,
    title: String,
    last_frame: Instant,
    cursor: PhysicalPosition<f64>,
    shown_status: Option<String>,
}

impl App {
    async fn new(window: Arc<Window>, config: &GardenConfig) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No adapter found"))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await?;

        let caps = surface.get_capabilities(&adapter);
        // Shaders output linear color; let the surface encode sRGB
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);

        let renderer = Renderer::new(device, queue, format, surface_config.width, surface_config.height);

        let mut config = config.clone();
        config.window.width = surface_config.width;
        config.window.height = surface_config.height;
        let garden = Garden::new(&config, default_backend());

        log::info!("Window ready: {}x{} {:?}", surface_config.width, surface_config.height, format);

        Ok(Self {
            window,
            surface,
            surface_config,
            renderer,
            garden,
            title: config.window.title.clone(),
            last_frame: Instant::now(),
            cursor: PhysicalPosition::new(0.0, 0.0),
            shown_status: None,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(self.renderer.device(), &self.surface_config);
        self.renderer.resize(size.width, size.height);
        self.garden.handle_input(InputEvent::Resize {
            width: size.width,
            height: size.height,
        });
    }

    /// Returns false when rendering can't continue.
    fn frame(&mut self) -> bool {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32().min(MAX_FRAME_DT);
        self.last_frame = now;

        self.garden.update(dt);
        self.sync_title();

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(self.renderer.device(), &self.surface_config);
                return true;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory");
                return false;
            }
            Err(e) => {
                log::warn!("Skipping frame: {:?}", e);
                return true;
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.render(&view, &self.garden);
        output.present();
        true
    }

    /// Mirror the audio status line into the window title.
    fn sync_title(&mut self) {
        let status = self.garden.audio_status().message().map(str::to_owned);
        if status == self.shown_status {
            return;
        }
        match &status {
            Some(message) => self.window.set_title(&format!("{} - {}", self.title, message)),
            None => self.window.set_title(&self.title),
        }
        self.shown_status = status;
    }
}

fn key_from_code(code: KeyCode) -> Key {
    match code {
        KeyCode::Digit0 | KeyCode::Numpad0 => Key::Digit(0),
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Digit(1),
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Digit(2),
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Digit(3),
        KeyCode::Digit4 | KeyCode::Numpad4 => Key::Digit(4),
        KeyCode::Digit5 | KeyCode::Numpad5 => Key::Digit(5),
        KeyCode::Digit6 | KeyCode::Numpad6 => Key::Digit(6),
        KeyCode::Digit7 | KeyCode::Numpad7 => Key::Digit(7),
        KeyCode::Digit8 | KeyCode::Numpad8 => Key::Digit(8),
        KeyCode::Digit9 | KeyCode::Numpad9 => Key::Digit(9),
        _ => Key::Other,
    }
}

pub fn run(config: GardenConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window.title.as_str())
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
            .build(&event_loop)?,
    );

    let mut app = pollster::block_on(App::new(window, &config))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, window_id } if window_id == app.window.id() => match event {
            WindowEvent::CloseRequested => {
                app.garden.teardown();
                elwt.exit();
            }
            WindowEvent::Resized(size) => app.resize(size),
            WindowEvent::CursorMoved { position, .. } => app.cursor = position,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = (app.cursor.x as f32, app.cursor.y as f32);
                app.garden.handle_input(InputEvent::PointerDown { x, y });
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    app.garden.teardown();
                    elwt.exit();
                } else {
                    app.garden.handle_input(InputEvent::KeyDown(key_from_code(code)));
                }
            }
            WindowEvent::RedrawRequested => {
                if !app.frame() {
                    app.garden.teardown();
                    elwt.exit();
                }
            }
            _ => {}
        },
        Event::AboutToWait => app.window.request_redraw(),
        _ => {}
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes_map_to_digits() {
        assert_eq!(key_from_code(KeyCode::Digit4), Key::Digit(4));
        assert_eq!(key_from_code(KeyCode::Numpad2), Key::Digit(2));
        assert_eq!(key_from_code(KeyCode::KeyA), Key::Other);
    }
}
