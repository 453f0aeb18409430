use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::audio::{SilentBackend, TrackCatalog};
use crate::config::GardenConfig;
use crate::environment::{Environment, Mood};
use crate::garden::Garden;
use crate::gpu::renderer::Renderer;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand. Flags override the config file.
#[derive(Args, Debug, Clone)]
struct SceneArgs {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting environment (valley, forest, park)
    #[arg(long)]
    environment: Option<Environment>,

    /// Starting mood (morning, sunset, night)
    #[arg(long)]
    mood: Option<Mood>,

    /// Seed for procedural placement
    #[arg(long)]
    seed: Option<u64>,

    /// Directory that track names are resolved against
    #[arg(long)]
    audio_root: Option<String>,
}

impl SceneArgs {
    fn load(&self) -> Result<GardenConfig> {
        let mut config = GardenConfig::load_or_default(self.config.as_deref())?;
        if let Some(environment) = self.environment {
            config.scene.environment = environment;
        }
        if let Some(mood) = self.mood {
            config.scene.mood = mood;
        }
        if self.seed.is_some() {
            config.scene.seed = self.seed;
        }
        if let Some(root) = &self.audio_root {
            config.audio.root = root.clone();
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Open the garden in a window
    Run {
        #[command(flatten)]
        scene: SceneArgs,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,
    },
    /// Render frames to disk
    Render {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output directory for frames
        #[arg(long)]
        out: PathBuf,

        /// Frames per second
        #[arg(long, default_value_t = 30.0)]
        fps: f32,

        /// Duration in seconds
        #[arg(long, default_value_t = 4.0)]
        duration: f32,

        /// Output width
        #[arg(long, default_value_t = 800)]
        width: u32,

        /// Output height
        #[arg(long, default_value_t = 600)]
        height: u32,

        /// Plant a light-flower at this pixel on the first frame ("x,y")
        #[arg(long, value_parser = parse_point)]
        click: Option<(f32, f32)>,
    },
    /// List the candidate tracks for each environment and whether they exist
    Tracks {
        #[command(flatten)]
        scene: SceneArgs,
    },
}

fn parse_point(value: &str) -> std::result::Result<(f32, f32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected 'x,y', got '{}'", value))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { scene, width, height } => {
            let mut config = scene.load()?;
            if let Some(width) = width {
                config.window.width = width;
            }
            if let Some(height) = height {
                config.window.height = height;
            }
            crate::app::run(config)?;
        }
        Commands::Render { scene, out, fps, duration, width, height, click } => {
            let mut config = scene.load()?;
            config.window.width = width;
            config.window.height = height;
            pollster::block_on(render_offline(config, out, fps, duration, click))?;
        }
        Commands::Tracks { scene } => {
            let config = scene.load()?;
            print_tracks(&config);
        }
    }
    Ok(())
}

fn print_tracks(config: &GardenConfig) {
    let catalog = TrackCatalog::from_config(&config.audio);
    for environment in Environment::ALL {
        println!("{}:", environment);
        for candidate in catalog.candidates(environment) {
            let marker = if std::path::Path::new(&candidate).is_file() { "ok" } else { "missing" };
            println!("  [{:>7}] {}", marker, candidate);
        }
    }
}

async fn render_offline(
    config: GardenConfig,
    out_dir: PathBuf,
    fps: f32,
    duration: f32,
    click: Option<(f32, f32)>,
) -> Result<()> {
    let (width, height) = (config.window.width, config.window.height);
    anyhow::ensure!(width > 0 && height > 0, "output size must be non-zero");
    anyhow::ensure!(fps > 0.0, "fps must be positive");

    let total_frames = (duration * fps).ceil() as usize;
    let dt = 1.0 / fps;

    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    // WGPU Init
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None, // Headless
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| anyhow::anyhow!("No adapter found"))?;

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor::default(), None)
        .await?;

    let texture_desc = wgpu::TextureDescriptor {
        label: Some("Target Texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    };

    let texture = device.create_texture(&texture_desc);
    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    // Buffer for reading back data
    let u32_size = std::mem::size_of::<u32>() as u32;
    let unpadded_bytes_per_row = u32_size * width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_bytes_per_row_padding = (align - unpadded_bytes_per_row % align) % align;
    let padded_bytes_per_row = unpadded_bytes_per_row + padded_bytes_per_row_padding;

    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Output Buffer"),
        size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    // Move device/queue to Renderer
    let mut renderer = Renderer::new(device, queue, texture_desc.format, width, height);
    let mut garden = Garden::new(&config, Box::new(SilentBackend::new()));

    if let Some((x, y)) = click {
        if garden.pointer_down(x, y).is_none() {
            log::warn!("Click at ({}, {}) does not hit the ground", x, y);
        }
    }

    println!(
        "Rendering {} frames of {} / {} to {:?}...",
        total_frames,
        garden.environment(),
        garden.mood(),
        out_dir
    );

    for i in 0..total_frames {
        garden.update(dt);

        // Render to texture
        renderer.render(&texture_view, &garden);

        // Copy texture to buffer
        let mut encoder = renderer
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &output_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            texture_desc.size,
        );

        renderer.queue().submit(Some(encoder.finish()));

        // Map buffer and save
        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |v| {
            let _ = tx.send(v);
        });
        renderer.device().poll(wgpu::Maintain::Wait);
        rx.recv().context("readback channel closed")??;

        let data = buffer_slice.get_mapped_range();

        // Unpad rows
        let mut unpadded_data = Vec::with_capacity((width * height * 4) as usize);
        for row in 0..height {
            let start = (row * padded_bytes_per_row) as usize;
            let end = start + (width * 4) as usize;
            unpadded_data.extend_from_slice(&data[start..end]);
        }

        let frame_path = out_dir.join(format!("frame_{:05}.png", i));
        image::save_buffer(&frame_path, &unpadded_data, width, height, image::ColorType::Rgba8)
            .with_context(|| format!("writing {}", frame_path.display()))?;

        drop(data);
        output_buffer.unmap();

        if i % 30 == 0 {
            print!(".");
            use std::io::Write;
            std::io::stdout().flush()?;
        }
    }
    println!("\nDone.");

    garden.teardown();
    Ok(())
}
