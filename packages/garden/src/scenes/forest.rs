//! Forest: rocky hills, dense conifers and a waterfall.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use rand::Rng;

use crate::environment::Environment;
use crate::particle::ParticleSystem;
use crate::scene_graph::{EntityId, Material, MeshType, Owner, SceneEntity, SceneGraph, Transform};

use super::common::{cone_size, create_butterflies, group, place, scatter_wildflowers};
use super::EnvironmentRig;

const OWNER: Owner = Owner::Environment(Environment::Forest);
pub const TREE_COUNT: usize = 30;
/// Top of the waterfall; particles fall from here.
pub const WATERFALL_ORIGIN: Vec3 = Vec3::new(0.0, 6.0, -20.0);

pub fn build(scene: &mut SceneGraph, rng: &mut impl Rng) -> EnvironmentRig {
    create_hills(scene);
    create_trees(scene, rng);
    let waterfall = create_waterfall(scene, rng);
    scatter_wildflowers(scene, OWNER, rng, 32.0, 180, Vec3::ZERO);
    let butterflies = create_butterflies(scene, OWNER, rng);

    EnvironmentRig {
        environment: Environment::Forest,
        butterflies,
        dog: None,
        waterfall: Some(waterfall),
    }
}

fn create_hills(scene: &mut SceneGraph) {
    let root = group(scene, OWNER);
    let rock = Material::hex(0x404a57);
    for position in [Vec3::new(-10.0, 9.0, -40.0), Vec3::new(12.0, 9.0, -38.0)] {
        place(scene, root, MeshType::Cone { segments: 6 }, rock, position, cone_size(18.0, 18.0));
    }
}

fn create_trees(scene: &mut SceneGraph, rng: &mut impl Rng) {
    let root = group(scene, OWNER);
    let trunk = Material::hex(0x3a2514);
    let foliage = Material::hex(0x18492a).with_emissive(0x12321d, 0.8);

    for _ in 0..TREE_COUNT {
        let x = (rng.gen::<f32>() - 0.5) * 60.0;
        let z = -10.0 + (rng.gen::<f32>() - 0.5) * 40.0;
        place(
            scene,
            root,
            MeshType::Cylinder { segments: 10 },
            trunk,
            Vec3::new(x, 2.1, z),
            Vec3::new(0.45, 4.2, 0.45),
        );
        place(
            scene,
            root,
            MeshType::Cone { segments: 12 },
            foliage,
            Vec3::new(x, 4.9, z),
            cone_size(2.0, 4.6),
        );
    }
}

/// Water sheet, pool and falling droplets. Returns the particle entity.
fn create_waterfall(scene: &mut SceneGraph, rng: &mut impl Rng) -> EntityId {
    let root = group(scene, OWNER);

    let sheet = Material::hex(0x4dd9ff)
        .with_emissive(0x4dd9ff, 0.9)
        .with_opacity(0.9);
    // Unit plane stood upright to face +Z
    scene.spawn_mesh(
        root,
        MeshType::Plane,
        sheet,
        Transform::at(Vec3::new(0.0, 6.0, -20.01))
            .with_scale(Vec3::new(4.0, 1.0, 10.0))
            .with_rotation(Vec3::new(FRAC_PI_2, 0.0, 0.0)),
    );

    let pool = Material::hex(0x3da8ff).with_emissive(0x3da8ff, 0.7);
    place(
        scene,
        root,
        MeshType::Cylinder { segments: 32 },
        pool,
        Vec3::new(0.0, 0.12, -16.0),
        Vec3::new(6.0, 0.2, 6.0),
    );

    let mut droplets = ParticleSystem::waterfall(rng);
    droplets.transform = Transform::at(WATERFALL_ORIGIN);
    scene.spawn(SceneEntity::Particles(droplets), OWNER)
}
