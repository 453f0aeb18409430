//! GPU renderer for the garden scene graph.
//!
//! Draws every visible mesh with one instanced call per geometry, then the
//! particle and butterfly quads, into a color target plus a depth buffer.

use std::collections::HashMap;
use std::iter;

use wgpu::util::DeviceExt;

use crate::camera::CameraUniforms;
use crate::garden::Garden;
use crate::gpu::batch::FrameBatches;
use crate::gpu::mesh::{GpuBillboardInstance, GpuMeshInstance};
use crate::gpu::pipeline;
use crate::lighting::LightingUniforms;
use crate::mesh_asset::{MeshAsset, MeshAssetRegistry};
use crate::scene_graph::MeshType;

/// Initial instance capacity; buffers grow by doubling.
const INITIAL_MESH_INSTANCES: usize = 1024;
const INITIAL_BILLBOARDS: usize = 2048;

/// GPU buffers for one piece of geometry.
struct MeshGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
}

/// Vertex buffer that is recreated larger when a frame doesn't fit.
struct InstanceBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: usize,
    stride: usize,
}

impl InstanceBuffer {
    fn new(device: &wgpu::Device, label: &'static str, stride: usize, capacity: usize) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (stride * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            label,
            buffer,
            capacity,
            stride,
        }
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        let count = bytes.len() / self.stride;
        if count > self.capacity {
            let capacity = count.next_power_of_two();
            log::debug!("Growing {} to {} instances", self.label, capacity);
            *self = Self::new(device, self.label, self.stride, capacity);
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
    }
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: wgpu::Extent3d,
    format: wgpu::TextureFormat,

    // Shared uniforms (camera + lighting)
    camera_buffer: wgpu::Buffer,
    lighting_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    mesh_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    billboard_pipeline: wgpu::RenderPipeline,

    depth_view: wgpu::TextureView,

    // Geometry uploaded on first use, keyed by mesh cache key
    geometry: HashMap<String, MeshGeometry>,

    mesh_instances: InstanceBuffer,
    billboard_instances: InstanceBuffer,
    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,
}

impl Renderer {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        // === Uniforms ===

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lighting_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lighting Uniform Buffer"),
            contents: bytemuck::cast_slice(&[LightingUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0), uniform_entry(1)],
            label: Some("scene_bind_group_layout"),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lighting_buffer.as_entire_binding(),
                },
            ],
            label: Some("scene_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = pipeline::create_mesh_pipeline(&device, &pipeline_layout, format, false);
        let transparent_pipeline = pipeline::create_mesh_pipeline(&device, &pipeline_layout, format, true);
        let billboard_pipeline = pipeline::create_billboard_pipeline(&device, &pipeline_layout, format);

        // === Instances ===

        let mesh_instances = InstanceBuffer::new(
            &device,
            "Mesh Instance Buffer",
            std::mem::size_of::<GpuMeshInstance>(),
            INITIAL_MESH_INSTANCES,
        );
        let billboard_instances = InstanceBuffer::new(
            &device,
            "Billboard Instance Buffer",
            std::mem::size_of::<GpuBillboardInstance>(),
            INITIAL_BILLBOARDS,
        );

        // Quad geometry for billboards (4 vertices, 6 indices)
        let quad_vertices: [f32; 8] = [
            -0.5, -0.5, // bottom-left
            0.5, -0.5, // bottom-right
            0.5, 0.5, // top-right
            -0.5, 0.5, // top-left
        ];
        let quad_indices: [u16; 6] = [0, 1, 2, 0, 2, 3];
        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Billboard Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Billboard Quad Index Buffer"),
            contents: bytemuck::cast_slice(&quad_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let depth_view = create_depth_view(&device, size);

        Self {
            device,
            queue,
            size,
            format,
            camera_buffer,
            lighting_buffer,
            bind_group,
            mesh_pipeline,
            transparent_pipeline,
            billboard_pipeline,
            depth_view,
            geometry: HashMap::new(),
            mesh_instances,
            billboard_instances,
            quad_vertex_buffer,
            quad_index_buffer,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            };
            self.depth_view = create_depth_view(&self.device, self.size);
        }
    }

    fn ensure_geometry(&mut self, key: &str, mesh_type: &MeshType, assets: &MeshAssetRegistry) -> bool {
        if self.geometry.contains_key(key) {
            return true;
        }
        let asset = match mesh_type {
            MeshType::Asset(id) => assets.get(id),
            primitive => MeshAsset::primitive(primitive).map(std::sync::Arc::new),
        };
        let Some(asset) = asset else {
            log::warn!("No geometry for mesh '{}'", key);
            return false;
        };

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Mesh Vertex Buffer: {}", key)),
            contents: bytemuck::cast_slice(&asset.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Mesh Index Buffer: {}", key)),
            contents: bytemuck::cast_slice(&asset.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.geometry.insert(
            key.to_string(),
            MeshGeometry {
                vertex_buffer,
                index_buffer,
                num_indices: asset.indices.len() as u32,
            },
        );
        true
    }

    pub fn render(&mut self, view: &wgpu::TextureView, garden: &Garden) {
        let frame = FrameBatches::collect(garden.scene());

        for batch in &frame.batches {
            self.ensure_geometry(&batch.key, &batch.mesh_type, garden.assets());
        }

        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[garden.camera().uniforms()]));
        self.queue
            .write_buffer(&self.lighting_buffer, 0, bytemuck::cast_slice(&[garden.lighting_uniforms()]));

        // write_buffer is immediate, so every instance is uploaded before the pass
        self.mesh_instances
            .upload(&self.device, &self.queue, bytemuck::cast_slice(&frame.instances));
        self.billboard_instances
            .upload(&self.device, &self.queue, bytemuck::cast_slice(&frame.billboards));

        let sky = garden.sky().top;
        let clear = wgpu::Color {
            r: sky.x as f64,
            g: sky.y as f64,
            b: sky.z as f64,
            a: 1.0,
        };

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.bind_group, &[]);

            let stride = std::mem::size_of::<GpuMeshInstance>() as u64;
            let mut transparent = None;
            for batch in &frame.batches {
                let Some(geometry) = self.geometry.get(&batch.key) else {
                    continue;
                };
                if transparent != Some(batch.transparent) {
                    let pipeline = if batch.transparent {
                        &self.transparent_pipeline
                    } else {
                        &self.mesh_pipeline
                    };
                    render_pass.set_pipeline(pipeline);
                    transparent = Some(batch.transparent);
                }
                let start = batch.range.start as u64 * stride;
                let end = batch.range.end as u64 * stride;
                render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.mesh_instances.buffer.slice(start..end));
                render_pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..geometry.num_indices, 0, 0..batch.instance_count());
            }

            if !frame.billboards.is_empty() {
                render_pass.set_pipeline(&self.billboard_pipeline);
                render_pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.billboard_instances.buffer.slice(..));
                render_pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..6, 0, 0..frame.billboards.len() as u32);
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
    }
}

fn create_depth_view(device: &wgpu::Device, size: wgpu::Extent3d) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: pipeline::DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
