//! Pieces shared by several environments.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::animation::Butterfly;
use crate::scene_graph::{EntityId, Material, MeshType, Owner, SceneEntity, SceneGraph, Sprite, Transform};

pub const BUTTERFLY_COUNT: usize = 22;
const WILDFLOWER_COLORS: [u32; 5] = [0xffe3a3, 0xff9bcc, 0x88d9ff, 0xcda5ff, 0xfdf7b5];

/// Spawn an empty root group for environment content.
pub fn group(scene: &mut SceneGraph, owner: Owner) -> EntityId {
    scene.spawn(SceneEntity::group(Transform::default()), owner)
}

/// Unit-sized mesh placed by position and size.
pub fn place(
    scene: &mut SceneGraph,
    parent: EntityId,
    mesh_type: MeshType,
    material: Material,
    position: Vec3,
    size: Vec3,
) -> Option<EntityId> {
    scene.spawn_mesh(parent, mesh_type, material, Transform::at(position).with_scale(size))
}

/// Cone with three's (radius, height) sizing.
pub fn cone_size(radius: f32, height: f32) -> Vec3 {
    Vec3::new(radius, height, radius)
}

/// Scatter flower clusters in a ring-ish disc around `center`.
///
/// Each cluster holds 3-5 small blossoms in random pastel colors.
pub fn scatter_wildflowers(
    scene: &mut SceneGraph,
    owner: Owner,
    rng: &mut impl Rng,
    radius: f32,
    count: usize,
    center: Vec3,
) -> EntityId {
    let materials: Vec<Material> = WILDFLOWER_COLORS
        .iter()
        .map(|&c| Material::hex(c).with_emissive(c, 0.3))
        .collect();

    let root = group(scene, owner);
    for _ in 0..count {
        let base_radius = radius * (0.3 + rng.gen::<f32>() * 0.7);
        let theta = rng.gen::<f32>() * TAU;
        let position = Vec3::new(
            center.x + theta.cos() * base_radius,
            0.04,
            center.z + theta.sin() * base_radius,
        );
        let Some(cluster) = scene.spawn_child(root, SceneEntity::group(Transform::at(position))) else {
            continue;
        };

        let blossoms = rng.gen_range(3..6);
        for _ in 0..blossoms {
            let material = materials[rng.gen_range(0..materials.len())];
            let offset = Vec3::new(
                (rng.gen::<f32>() - 0.5) * 0.4,
                0.05 + rng.gen::<f32>() * 0.05,
                (rng.gen::<f32>() - 0.5) * 0.4,
            );
            place(
                scene,
                cluster,
                MeshType::Sphere { segments: 16 },
                material,
                offset,
                Vec3::splat(0.14),
            );
        }
    }
    root
}

/// A swarm of butterflies over the middle of the garden.
pub fn create_butterflies(scene: &mut SceneGraph, owner: Owner, rng: &mut impl Rng) -> Vec<Butterfly> {
    (0..BUTTERFLY_COUNT)
        .map(|_| {
            let palette = rng.gen_range(1..=3u8);
            let position = Vec3::new(
                (rng.gen::<f32>() - 0.5) * 18.0,
                1.6 + rng.gen::<f32>() * 1.4,
                -4.0 + (rng.gen::<f32>() - 0.5) * 10.0,
            );
            let size = 0.9 + rng.gen::<f32>() * 0.45;
            let sprite = Sprite {
                palette,
                transform: Transform::at(position).with_scale(Vec3::new(size, size * 0.7, 1.0)),
                visible: true,
            };
            let entity = scene.spawn(SceneEntity::Sprite(sprite), owner);
            Butterfly {
                entity,
                phase: rng.gen::<f32>() * TAU,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_wildflower_clusters_stay_in_radius() {
        let mut scene = SceneGraph::new();
        let mut rng = StdRng::seed_from_u64(11);
        let owner = Owner::Environment(Environment::Park);
        let center = Vec3::new(-6.0, 0.0, -10.0);
        let root = scatter_wildflowers(&mut scene, owner, &mut rng, 12.0, 80, center);

        let clusters = scene.node(root).unwrap().children().to_vec();
        assert_eq!(clusters.len(), 80);
        for cluster in clusters {
            let pos = scene.get(cluster).unwrap().transform().position;
            let d = Vec3::new(pos.x - center.x, 0.0, pos.z - center.z).length();
            assert!(d >= 12.0 * 0.3 - 1e-4 && d <= 12.0 + 1e-4);
            let blossoms = scene.node(cluster).unwrap().children().len();
            assert!((3..=5).contains(&blossoms));
        }
        assert_eq!(scene.count_owned(|o| o == owner), scene.len());
    }

    #[test]
    fn test_butterfly_swarm() {
        let mut scene = SceneGraph::new();
        let mut rng = StdRng::seed_from_u64(5);
        let butterflies = create_butterflies(&mut scene, Owner::Transient, &mut rng);
        assert_eq!(butterflies.len(), BUTTERFLY_COUNT);
        for b in &butterflies {
            match scene.get(b.entity) {
                Some(SceneEntity::Sprite(s)) => assert!((1..=3).contains(&s.palette)),
                other => panic!("expected sprite, got {other:?}"),
            }
        }
    }
}
