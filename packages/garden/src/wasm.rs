use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::audio::default_backend;
use crate::config::GardenConfig;
use crate::environment::{Environment, Mood};
use crate::garden::Garden;
use crate::gpu::renderer::Renderer;
use crate::input::{InputEvent, Key};

#[wasm_bindgen]
pub struct WasmGarden {
    inner: Rc<RefCell<GardenContext>>,
}

struct GardenContext {
    renderer: Renderer,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    garden: Garden,
}

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

#[wasm_bindgen]
impl WasmGarden {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        panic!("Use create_garden async constructor");
    }

    /// Pointer pressed at canvas pixel coordinates (not CSS pixels).
    ///
    /// The first press also unlocks audio, so call this from the DOM
    /// `pointerdown` handler itself.
    pub fn pointer_down(&self, x: f32, y: f32) {
        let mut inner = self.inner.borrow_mut();
        inner.garden.handle_input(InputEvent::PointerDown { x, y });
    }

    /// Forward a `KeyboardEvent.key` value.
    pub fn key_down(&self, key: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.garden.handle_input(InputEvent::KeyDown(Key::from_dom_key(key)));
    }

    /// Returns false for an unknown environment name.
    pub fn set_environment(&self, name: &str) -> bool {
        match name.parse::<Environment>() {
            Ok(environment) => {
                self.inner.borrow_mut().garden.set_environment(environment);
                true
            }
            Err(e) => {
                log::warn!("{}", e);
                false
            }
        }
    }

    /// Returns false for an unknown mood name.
    pub fn set_mood(&self, name: &str) -> bool {
        match name.parse::<Mood>() {
            Ok(mood) => {
                self.inner.borrow_mut().garden.set_mood(mood);
                true
            }
            Err(e) => {
                log::warn!("{}", e);
                false
            }
        }
    }

    pub fn environment(&self) -> String {
        self.inner.borrow().garden.environment().to_string()
    }

    pub fn mood(&self) -> String {
        self.inner.borrow().garden.mood().to_string()
    }

    /// Text for the audio status banner, or `undefined` when it should be hidden.
    pub fn audio_status(&self) -> Option<String> {
        self.inner.borrow().garden.audio_status().message().map(str::to_owned)
    }

    pub fn resize(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let mut inner = self.inner.borrow_mut();
        let ctx = &mut *inner;

        ctx.renderer.resize(width, height);
        ctx.config.width = width;
        ctx.config.height = height;
        ctx.surface.configure(ctx.renderer.device(), &ctx.config);
        ctx.garden.handle_input(InputEvent::Resize { width, height });
    }

    /// Advance by `dt` seconds and draw a frame.
    pub fn render(&self, dt: f32) {
        let mut inner = self.inner.borrow_mut();
        let ctx = &mut *inner;

        ctx.garden.update(dt);

        match ctx.surface.get_current_texture() {
            Ok(output) => {
                let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
                ctx.renderer.render(&view, &ctx.garden);
                output.present();
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                ctx.surface.configure(ctx.renderer.device(), &ctx.config);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory");
            }
            Err(e) => {
                log::warn!("Surface error: {:?}", e);
            }
        }
    }

    /// Stop audio and release the scene. The handle should be dropped afterwards.
    pub fn teardown(&self) {
        self.inner.borrow_mut().garden.teardown();
    }
}

/// Create a garden drawing into `canvas`.
///
/// `config_json` is an optional garden config (same shape as the native
/// config file); missing fields take their defaults.
#[wasm_bindgen]
pub async fn create_garden(canvas: HtmlCanvasElement, config_json: Option<String>) -> Result<WasmGarden, JsValue> {
    init_panic_hook();

    let mut garden_config = match config_json {
        Some(json) => GardenConfig::from_json(&json).map_err(|e| JsValue::from_str(&format!("{:#}", e)))?,
        None => GardenConfig::default(),
    };

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let target = wgpu::SurfaceTarget::Canvas(canvas.clone());
    let surface = instance
        .create_surface(target)
        .map_err(|e| JsValue::from_str(&format!("Failed to create surface: {}", e)))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::None,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| JsValue::from_str("Failed to find an appropriate adapter"))?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .map_err(|e| JsValue::from_str(&format!("Failed to create device: {}", e)))?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .copied()
        .find(|f: &wgpu::TextureFormat| f.is_srgb())
        .or_else(|| surface_caps.formats.first().copied())
        .ok_or_else(|| JsValue::from_str("Surface reports no formats"))?;

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: canvas.width().max(1),
        height: canvas.height().max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    let renderer = Renderer::new(device, queue, config.format, config.width, config.height);

    garden_config.window.width = config.width;
    garden_config.window.height = config.height;
    let garden = Garden::new(&garden_config, default_backend());

    Ok(WasmGarden {
        inner: Rc::new(RefCell::new(GardenContext {
            renderer,
            surface,
            config,
            garden,
        })),
    })
}
