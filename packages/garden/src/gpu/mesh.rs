use bytemuck::{Pod, Zeroable};

/// Mesh vertex: object-space position and normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 12, // [f32; 3] is 12 bytes
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Per-instance data for instanced mesh drawing.
///
/// The normal matrix is the inverse-transpose of the model's upper 3x3,
/// stored as three padded columns.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GpuMeshInstance {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub color: [f32; 4],
    /// rgb = emissive color pre-multiplied by intensity, a unused.
    pub emissive: [f32; 4],
}

impl GpuMeshInstance {
    pub fn new(model: glam::Mat4, color: [f32; 4], emissive: [f32; 3]) -> Self {
        let normal = glam::Mat3::from_mat4(model).inverse().transpose();
        let col = |c: glam::Vec3| [c.x, c.y, c.z, 0.0];
        Self {
            model: model.to_cols_array_2d(),
            normal: [col(normal.x_axis), col(normal.y_axis), col(normal.z_axis)],
            color,
            emissive: [emissive[0], emissive[1], emissive[2], 0.0],
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 9] = wgpu::vertex_attr_array![
        2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4,
        6 => Float32x4, 7 => Float32x4, 8 => Float32x4,
        9 => Float32x4, 10 => Float32x4
    ];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuMeshInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-instance data for camera-facing quads (particles and butterflies).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GpuBillboardInstance {
    /// xyz = world position, w = shape (0 = round point, 1..=3 = butterfly palette).
    pub position: [f32; 4],
    /// xy = world-space size, zw unused.
    pub size: [f32; 4],
    pub color: [f32; 4],
}

impl GpuBillboardInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x4, 2 => Float32x4, 3 => Float32x4
    ];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuBillboardInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_sizes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<GpuMeshInstance>(), 144);
        assert_eq!(std::mem::size_of::<GpuBillboardInstance>(), 48);
    }

    #[test]
    fn test_normal_matrix_undoes_non_uniform_scale() {
        let model = glam::Mat4::from_scale(glam::Vec3::new(1.0, 0.1, 1.0));
        let inst = GpuMeshInstance::new(model, [1.0; 4], [0.0; 3]);
        // y column of the inverse-transpose is scaled by 1/0.1
        assert!((inst.normal[1][1] - 10.0).abs() < 1e-4);
        assert!((inst.normal[0][0] - 1.0).abs() < 1e-6);
    }
}
