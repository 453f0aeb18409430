//! Procedural mesh generation and management.
//!
//! Every primitive is generated at unit size and placed with its instance
//! transform, so one vertex buffer serves all cones, all spheres, and so on.
//!
//! ## Unit conventions
//!
//! - cube: side 1, centered at origin
//! - plane: 1x1 in the XZ plane, facing +Y
//! - sphere: radius 1
//! - cone: base radius 1 at y = -0.5, apex at y = 0.5
//! - cylinder: radius 1, y from -0.5 to 0.5
//! - disc: radius 1 in the XZ plane, facing +Y
//!
//! Tubes are swept along a curve at their final size and registered under an
//! asset id.

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use glam::Vec3;

use crate::curve::CatmullRom;
use crate::gpu::mesh::Vertex;
use crate::scene_graph::MeshType;

/// Geometry ready for upload.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    /// Unique identifier for this asset.
    pub id: String,
    pub vertices: Vec<Vertex>,
    /// Triangle list indices.
    pub indices: Vec<u16>,
}

impl MeshAsset {
    pub fn new(id: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u16>) -> Self {
        Self {
            id: id.into(),
            vertices,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Generate a built-in primitive. Returns `None` for [`MeshType::Asset`].
    pub fn primitive(mesh_type: &MeshType) -> Option<Self> {
        let id = mesh_type.cache_key();
        let asset = match *mesh_type {
            MeshType::Cube => cube(id),
            MeshType::Plane => plane(id),
            MeshType::Sphere { segments } => sphere(id, segments),
            MeshType::Cone { segments } => cone(id, segments),
            MeshType::Cylinder { segments } => cylinder(id, segments),
            MeshType::Disc { segments } => disc(id, segments),
            MeshType::Asset(_) => return None,
        };
        Some(asset)
    }
}

fn cube(id: String) -> MeshAsset {
    // (normal, u axis, v axis) per face
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in faces {
        let base = vertices.len() as u16;
        let center = normal * 0.5;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let p = center + u * su + v * sv;
            vertices.push(Vertex::new(p.to_array(), normal.to_array()));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshAsset::new(id, vertices, indices)
}

fn plane(id: String) -> MeshAsset {
    let up = [0.0, 1.0, 0.0];
    let vertices = vec![
        Vertex::new([-0.5, 0.0, 0.5], up),
        Vertex::new([0.5, 0.0, 0.5], up),
        Vertex::new([0.5, 0.0, -0.5], up),
        Vertex::new([-0.5, 0.0, -0.5], up),
    ];
    MeshAsset::new(id, vertices, vec![0, 1, 2, 0, 2, 3])
}

fn sphere(id: String, segments: u16) -> MeshAsset {
    let width = segments.max(3);
    let height = (segments / 2).max(2);

    let mut vertices = Vec::with_capacity(((width + 1) * (height + 1)) as usize);
    for iy in 0..=height {
        let v = iy as f32 / height as f32;
        let phi = v * PI;
        for ix in 0..=width {
            let u = ix as f32 / width as f32;
            let theta = u * TAU;
            let n = Vec3::new(-theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());
            vertices.push(Vertex::new(n.to_array(), n.to_array()));
        }
    }

    let mut indices = Vec::new();
    let row = width + 1;
    for iy in 0..height {
        for ix in 0..width {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshAsset::new(id, vertices, indices)
}

/// Lateral surface of a cone or cylinder plus caps.
fn lathe(id: String, segments: u16, top_radius: f32, bottom_radius: f32) -> MeshAsset {
    let segments = segments.max(3);
    let height = 1.0;
    let slope = (bottom_radius - top_radius) / height;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for (y, radius) in [(0.5, top_radius), (-0.5, bottom_radius)] {
        for ix in 0..=segments {
            let theta = ix as f32 / segments as f32 * TAU;
            let (s, c) = theta.sin_cos();
            let normal = Vec3::new(s, slope, c).normalize();
            vertices.push(Vertex::new([radius * s, y, radius * c], normal.to_array()));
        }
    }

    let row = segments + 1;
    for ix in 0..segments {
        let a = ix;
        let b = row + ix;
        let c = row + ix + 1;
        let d = ix + 1;
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    for (y, radius, sign) in [(0.5, top_radius, 1.0), (-0.5, bottom_radius, -1.0)] {
        if radius <= 0.0 {
            continue;
        }
        let normal = [0.0, sign, 0.0];
        let center = vertices.len() as u16;
        vertices.push(Vertex::new([0.0, y, 0.0], normal));
        for ix in 0..=segments {
            let theta = ix as f32 / segments as f32 * TAU;
            let (s, c) = theta.sin_cos();
            vertices.push(Vertex::new([radius * s, y, radius * c], normal));
        }
        for ix in 0..segments {
            let i = center + 1 + ix;
            if sign > 0.0 {
                indices.extend_from_slice(&[i, i + 1, center]);
            } else {
                indices.extend_from_slice(&[i + 1, i, center]);
            }
        }
    }

    MeshAsset::new(id, vertices, indices)
}

fn cone(id: String, segments: u16) -> MeshAsset {
    lathe(id, segments, 0.0, 1.0)
}

fn cylinder(id: String, segments: u16) -> MeshAsset {
    lathe(id, segments, 1.0, 1.0)
}

fn disc(id: String, segments: u16) -> MeshAsset {
    let segments = segments.max(3);
    let up = [0.0, 1.0, 0.0];
    let mut vertices = vec![Vertex::new([0.0, 0.0, 0.0], up)];
    for ix in 0..=segments {
        let theta = ix as f32 / segments as f32 * TAU;
        vertices.push(Vertex::new([theta.cos(), 0.0, -theta.sin()], up));
    }
    let mut indices = Vec::with_capacity(segments as usize * 3);
    for ix in 1..=segments {
        indices.extend_from_slice(&[0, ix, ix + 1]);
    }
    MeshAsset::new(id, vertices, indices)
}

/// Sweep a circular cross-section along `curve`.
///
/// `y_scale` flattens the result vertically after sweeping (a river is a tube
/// squashed to a ribbon). Normals are recomputed from the final triangles.
pub fn tube(
    id: impl Into<String>,
    curve: &CatmullRom,
    tubular_segments: u16,
    radius: f32,
    radial_segments: u16,
    y_scale: f32,
) -> MeshAsset {
    let tubular = tubular_segments.max(1);
    let radial = radial_segments.max(3);
    debug_assert!((tubular as u32 + 1) * radial as u32 <= u16::MAX as u32);

    // Frames are propagated along the curve to avoid twisting
    let mut tangent = curve.tangent(0.0);
    let seed = if tangent.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let mut normal = tangent.cross(seed).cross(tangent).normalize_or_zero();

    let mut positions = Vec::with_capacity(((tubular + 1) * radial) as usize);
    for i in 0..=tubular {
        let t = i as f32 / tubular as f32;
        let center = curve.point(t);
        let next_tangent = curve.tangent(t);
        let axis = tangent.cross(next_tangent);
        if axis.length_squared() > 1e-12 {
            let angle = tangent.dot(next_tangent).clamp(-1.0, 1.0).acos();
            normal = glam::Quat::from_axis_angle(axis.normalize(), angle) * normal;
        }
        tangent = next_tangent;
        let binormal = tangent.cross(normal);

        for j in 0..radial {
            let v = j as f32 / radial as f32 * TAU;
            let dir = normal * v.cos() + binormal * v.sin();
            let p = center + dir * radius;
            positions.push([p.x, p.y * y_scale, p.z]);
        }
    }

    let mut indices = Vec::with_capacity((tubular * radial * 6) as usize);
    for i in 0..tubular {
        for j in 0..radial {
            let jn = (j + 1) % radial;
            let a = i * radial + j;
            let b = (i + 1) * radial + j;
            let c = (i + 1) * radial + jn;
            let d = i * radial + jn;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    let normals = compute_vertex_normals(&positions, &indices);
    let vertices = positions
        .into_iter()
        .zip(normals)
        .map(|(p, n)| Vertex::new(p, n))
        .collect();

    MeshAsset::new(id, vertices, indices)
}

/// Compute area-weighted vertex normals from face normals.
///
/// For each vertex, accumulates the (unnormalized) face normal of each adjacent triangle.
/// The resulting normal is normalized. This gives area-weighted averaging since
/// larger triangles contribute proportionally more to the normal.
fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u16]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            continue;
        }

        let p0 = Vec3::from(positions[i0]);
        let p1 = Vec3::from(positions[i1]);
        let p2 = Vec3::from(positions[i2]);

        // Magnitude = 2 * triangle area
        let face_normal = (p1 - p0).cross(p2 - p0);
        for idx in [i0, i1, i2] {
            normals[idx] += face_normal;
        }
    }

    normals
        .into_iter()
        .map(|n| {
            if n.length_squared() > 1e-12 {
                n.normalize().to_array()
            } else {
                // Degenerate normal, use Y-up as fallback
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

/// Registry for generated mesh assets.
///
/// Primitives are generated on first request; swept meshes are registered
/// explicitly by the scene builders.
#[derive(Debug, Default)]
pub struct MeshAssetRegistry {
    assets: HashMap<String, Arc<MeshAsset>>,
}

impl MeshAssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-built mesh asset, replacing any asset with the same id.
    pub fn register(&mut self, asset: MeshAsset) {
        self.assets.insert(asset.id.clone(), Arc::new(asset));
    }

    /// Get a mesh asset by ID.
    pub fn get(&self, asset_id: &str) -> Option<Arc<MeshAsset>> {
        self.assets.get(asset_id).cloned()
    }

    /// Look up the geometry for a mesh type, generating primitives on demand.
    pub fn resolve(&mut self, mesh_type: &MeshType) -> Option<Arc<MeshAsset>> {
        let key = mesh_type.cache_key();
        if let Some(asset) = self.assets.get(&key) {
            return Some(asset.clone());
        }
        let asset = Arc::new(MeshAsset::primitive(mesh_type)?);
        self.assets.insert(key, asset.clone());
        Some(asset)
    }

    /// Check if an asset is registered.
    pub fn contains(&self, asset_id: &str) -> bool {
        self.assets.contains_key(asset_id)
    }

    /// Unregister an asset.
    pub fn unregister(&mut self, asset_id: &str) -> bool {
        self.assets.remove(asset_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_index_in_bounds(asset: &MeshAsset) -> bool {
        asset
            .indices
            .iter()
            .all(|&i| (i as usize) < asset.vertices.len())
    }

    #[test]
    fn test_cube_geometry() {
        let cube = MeshAsset::primitive(&MeshType::Cube).unwrap();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        for v in &cube.vertices {
            for c in v.position {
                assert!((c.abs() - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_sphere_is_unit_radius() {
        let sphere = MeshAsset::primitive(&MeshType::Sphere { segments: 16 }).unwrap();
        assert!(max_index_in_bounds(&sphere));
        for v in &sphere.vertices {
            let len = Vec3::from(v.position).length();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cone_spans_unit_height() {
        let cone = MeshAsset::primitive(&MeshType::Cone { segments: 6 }).unwrap();
        assert!(max_index_in_bounds(&cone));
        let min_y = cone.vertices.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        let max_y = cone.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        assert_eq!(min_y, -0.5);
        assert_eq!(max_y, 0.5);
    }

    #[test]
    fn test_disc_triangle_count() {
        let disc = MeshAsset::primitive(&MeshType::Disc { segments: 32 }).unwrap();
        assert_eq!(disc.triangle_count(), 32);
        assert!(max_index_in_bounds(&disc));
    }

    #[test]
    fn test_asset_type_is_not_a_primitive() {
        assert!(MeshAsset::primitive(&MeshType::Asset("river".into())).is_none());
    }

    #[test]
    fn test_tube_is_flattened() {
        let curve = CatmullRom::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(5.0, 0.0, 20.0),
        ])
        .unwrap();
        let tube = tube("river", &curve, 40, 1.7, 14, 0.1);
        assert_eq!(tube.vertices.len(), 41 * 14);
        assert_eq!(tube.triangle_count(), 40 * 14 * 2);
        assert!(max_index_in_bounds(&tube));
        for v in &tube.vertices {
            assert!(v.position[1].abs() <= 0.17 + 1e-4);
        }
    }

    #[test]
    fn test_vertex_normals_are_normalized() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2]);
        for n in normals {
            assert!((Vec3::from(n).length() - 1.0).abs() < 1e-5);
            assert!((n[1].abs() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_registry_resolves_and_caches() {
        let mut registry = MeshAssetRegistry::new();
        let a = registry.resolve(&MeshType::Sphere { segments: 16 }).unwrap();
        let b = registry.resolve(&MeshType::Sphere { segments: 16 }).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(registry.resolve(&MeshType::Asset("missing".into())).is_none());

        registry.register(MeshAsset::new("river", Vec::new(), Vec::new()));
        assert!(registry.contains("river"));
        assert!(registry.resolve(&MeshType::Asset("river".into())).is_some());
        assert!(registry.unregister("river"));
        assert!(!registry.contains("river"));
    }
}
