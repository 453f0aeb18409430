//! Per-frame instance collection.
//!
//! Walks the visible scene once and groups mesh instances by geometry so
//! each distinct mesh is drawn with a single instanced call. Particles and
//! butterfly sprites become camera-facing quads.

use std::collections::HashMap;
use std::ops::Range;

use crate::gpu::mesh::{GpuBillboardInstance, GpuMeshInstance};
use crate::scene_graph::{MeshType, SceneEntity, SceneGraph};

/// One instanced draw: every visible instance of `mesh_type` with the same
/// blending mode.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBatch {
    pub mesh_type: MeshType,
    pub key: String,
    /// Instance range into [`FrameBatches::instances`].
    pub range: Range<u32>,
    /// Alpha-blended, drawn after every opaque batch without depth writes.
    pub transparent: bool,
}

impl MeshBatch {
    pub fn instance_count(&self) -> u32 {
        self.range.end - self.range.start
    }
}

#[derive(Debug, Default)]
pub struct FrameBatches {
    /// Opaque batches first, then transparent ones.
    pub batches: Vec<MeshBatch>,
    pub instances: Vec<GpuMeshInstance>,
    pub billboards: Vec<GpuBillboardInstance>,
}

impl FrameBatches {
    pub fn collect(scene: &SceneGraph) -> Self {
        // (key, transparent) -> slot in `groups`, keeps first-seen order
        let mut slots: HashMap<(String, bool), usize> = HashMap::new();
        let mut groups: Vec<(MeshType, String, bool, Vec<GpuMeshInstance>)> = Vec::new();
        let mut billboards = Vec::new();

        scene.visit_visible(|_, entity, world| match entity {
            SceneEntity::Mesh(mesh) => {
                let material = &mesh.material;
                if material.opacity <= 0.0 {
                    return;
                }
                let transparent = material.opacity < 1.0;
                let key = mesh.mesh_type.cache_key();
                let slot = *slots.entry((key.clone(), transparent)).or_insert_with(|| {
                    groups.push((mesh.mesh_type.clone(), key, transparent, Vec::new()));
                    groups.len() - 1
                });
                let [r, g, b] = material.color;
                groups[slot]
                    .3
                    .push(GpuMeshInstance::new(world, [r, g, b, material.opacity], material.emissive));
            }
            SceneEntity::Particles(particles) => {
                if particles.opacity <= 0.0 {
                    return;
                }
                let [r, g, b] = particles.color;
                let color = [r, g, b, particles.opacity];
                let size = [particles.size, particles.size, 0.0, 0.0];
                billboards.extend(particles.positions().iter().map(|&p| {
                    let p = world.transform_point3(p);
                    GpuBillboardInstance {
                        position: [p.x, p.y, p.z, 0.0],
                        size,
                        color,
                    }
                }));
            }
            SceneEntity::Sprite(sprite) => {
                let p = world.w_axis.truncate();
                let width = world.x_axis.truncate().length();
                let height = world.y_axis.truncate().length();
                billboards.push(GpuBillboardInstance {
                    position: [p.x, p.y, p.z, f32::from(sprite.palette.max(1))],
                    size: [width, height, 0.0, 0.0],
                    color: [1.0; 4],
                });
            }
            SceneEntity::Group { .. } => {}
        });

        // Stable partition: opaque before transparent
        groups.sort_by_key(|(_, _, transparent, _)| *transparent);

        let mut batches = Vec::with_capacity(groups.len());
        let mut instances = Vec::new();
        for (mesh_type, key, transparent, group) in groups {
            let start = instances.len() as u32;
            instances.extend(group);
            batches.push(MeshBatch {
                mesh_type,
                key,
                range: start..instances.len() as u32,
                transparent,
            });
        }

        Self {
            batches,
            instances,
            billboards,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty() && self.billboards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use crate::particle::{ParticleMotion, ParticleSystem};
    use crate::scene_graph::{Material, MeshInstance, Owner, Sprite, Transform};

    fn mesh(mesh_type: MeshType, material: Material, x: f32) -> SceneEntity {
        let mut m = MeshInstance::new(mesh_type, material);
        m.transform = Transform::at(Vec3::new(x, 0.0, 0.0));
        SceneEntity::Mesh(m)
    }

    #[test]
    fn test_instances_grouped_by_geometry() {
        let mut scene = SceneGraph::new();
        let red = Material::hex(0xff0000);
        scene.spawn(mesh(MeshType::Cube, red, 0.0), Owner::Global);
        scene.spawn(mesh(MeshType::Sphere { segments: 8 }, red, 1.0), Owner::Global);
        scene.spawn(mesh(MeshType::Cube, red, 2.0), Owner::Global);

        let frame = FrameBatches::collect(&scene);
        assert_eq!(frame.batches.len(), 2);
        assert_eq!(frame.batches[0].mesh_type, MeshType::Cube);
        assert_eq!(frame.batches[0].instance_count(), 2);
        assert_eq!(frame.batches[1].range, 2..3);
        assert_eq!(frame.instances.len(), 3);
    }

    #[test]
    fn test_transparent_batches_last() {
        let mut scene = SceneGraph::new();
        let glass = Material::hex(0x4dd9ff).with_opacity(0.5);
        scene.spawn(mesh(MeshType::Plane, glass, 0.0), Owner::Global);
        scene.spawn(mesh(MeshType::Plane, Material::hex(0x00ff00), 0.0), Owner::Global);
        scene.spawn(mesh(MeshType::Plane, Material::hex(0x00ff00).with_opacity(0.0), 0.0), Owner::Global);

        let frame = FrameBatches::collect(&scene);
        assert_eq!(frame.batches.len(), 2);
        assert!(!frame.batches[0].transparent);
        assert!(frame.batches[1].transparent);
    }

    #[test]
    fn test_hidden_particles_skipped() {
        let mut scene = SceneGraph::new();
        let base = vec![Vec3::ZERO, Vec3::X];
        let visible = ParticleSystem::new(ParticleMotion::Drift, base.clone(), 0.3, 0xffffff, 0.8);
        let faded = ParticleSystem::new(ParticleMotion::Twinkle, base, 0.3, 0xffffff, 0.0);
        scene.spawn(SceneEntity::Particles(visible), Owner::Global);
        scene.spawn(SceneEntity::Particles(faded), Owner::Global);

        let frame = FrameBatches::collect(&scene);
        assert_eq!(frame.billboards.len(), 2);
        assert!((frame.billboards[0].color[3] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_sprite_carries_palette_and_size() {
        let mut scene = SceneGraph::new();
        let sprite = Sprite {
            palette: 2,
            transform: Transform::at(Vec3::new(1.0, 2.0, 3.0)).with_scale(Vec3::new(0.5, 0.35, 1.0)),
            visible: true,
        };
        scene.spawn(SceneEntity::Sprite(sprite), Owner::Global);

        let frame = FrameBatches::collect(&scene);
        let b = frame.billboards[0];
        assert_eq!(b.position, [1.0, 2.0, 3.0, 2.0]);
        assert!((b.size[0] - 0.5).abs() < 1e-6);
        assert!((b.size[1] - 0.35).abs() < 1e-6);
    }
}
