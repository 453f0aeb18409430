//! Park: a paved path with benches and lamps, a ring of trees, a pond and
//! two flower beds.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use crate::environment::Environment;
use crate::scene_graph::{EntityId, Material, MeshType, Owner, SceneEntity, SceneGraph, Transform};

use super::common::{cone_size, create_butterflies, group, place, scatter_wildflowers};
use super::EnvironmentRig;

const OWNER: Owner = Owner::Environment(Environment::Park);
pub const TREE_RING: usize = 16;
const LAMP_SPOTS: [(f32, f32); 4] = [(-2.5, -14.0), (2.5, -4.0), (-2.5, 6.0), (2.5, 16.0)];

pub fn build(scene: &mut SceneGraph, rng: &mut impl Rng) -> EnvironmentRig {
    create_path_and_benches(scene);
    create_lamps(scene);
    create_trees(scene, rng);
    create_pond(scene);
    scatter_wildflowers(scene, OWNER, rng, 12.0, 80, Vec3::new(-6.0, 0.0, -10.0));
    scatter_wildflowers(scene, OWNER, rng, 12.0, 80, Vec3::new(6.0, 0.0, 8.0));
    let butterflies = create_butterflies(scene, OWNER, rng);

    EnvironmentRig {
        environment: Environment::Park,
        butterflies,
        dog: None,
        waterfall: None,
    }
}

fn create_path_and_benches(scene: &mut SceneGraph) {
    let root = group(scene, OWNER);
    place(
        scene,
        root,
        MeshType::Plane,
        Material::hex(0xc0c5c9),
        Vec3::new(0.0, 0.02, 0.0),
        Vec3::new(6.0, 1.0, 70.0),
    );

    for (position, yaw) in [
        (Vec3::new(-4.0, 0.0, -10.0), PI / 6.0),
        (Vec3::new(4.0, 0.0, 10.0), -PI / 5.0),
    ] {
        let transform = Transform::at(position).with_rotation(Vec3::new(0.0, yaw, 0.0));
        if let Some(bench) = scene.spawn_child(root, SceneEntity::group(transform)) {
            build_bench(scene, bench);
        }
    }
}

fn build_bench(scene: &mut SceneGraph, bench: EntityId) {
    let wood = Material::hex(0x8b5a2b);
    let iron = Material::hex(0x333333);

    place(scene, bench, MeshType::Cube, wood, Vec3::new(0.0, 0.4, 0.0), Vec3::new(2.0, 0.12, 0.5));
    place(scene, bench, MeshType::Cube, wood, Vec3::new(0.0, 0.9, -0.2), Vec3::new(2.0, 0.7, 0.1));
    for (x, z) in [(-0.9, 0.18), (0.9, 0.18), (-0.9, -0.18), (0.9, -0.18)] {
        place(scene, bench, MeshType::Cube, iron, Vec3::new(x, 0.2, z), Vec3::new(0.1, 0.4, 0.1));
    }
}

fn create_lamps(scene: &mut SceneGraph) {
    let root = group(scene, OWNER);
    let pole = Material::hex(0x222222);
    let bulb = Material::hex(0xfffff2).with_emissive(0xfff2cc, 2.0);

    for (x, z) in LAMP_SPOTS {
        place(
            scene,
            root,
            MeshType::Cylinder { segments: 8 },
            pole,
            Vec3::new(x, 1.5, z),
            Vec3::new(0.11, 3.0, 0.11),
        );
        place(
            scene,
            root,
            MeshType::Sphere { segments: 16 },
            bulb,
            Vec3::new(x, 3.2, z),
            Vec3::splat(0.3),
        );
    }
}

fn create_trees(scene: &mut SceneGraph, rng: &mut impl Rng) {
    let root = group(scene, OWNER);
    let trunk = Material::hex(0x4a2e1a);
    let foliage = Material::hex(0x215b32).with_emissive(0x163921, 0.8);

    for i in 0..TREE_RING {
        let angle = i as f32 / TREE_RING as f32 * TAU;
        let radius = 30.0 + rng.gen::<f32>() * 8.0;
        let x = angle.cos() * radius;
        let z = angle.sin() * radius;

        place(
            scene,
            root,
            MeshType::Cylinder { segments: 8 },
            trunk,
            Vec3::new(x, 1.5, z),
            Vec3::new(0.325, 3.0, 0.325),
        );
        place(
            scene,
            root,
            MeshType::Cone { segments: 10 },
            foliage,
            Vec3::new(x, 3.2, z),
            cone_size(1.3, 3.4),
        );
    }
}

fn create_pond(scene: &mut SceneGraph) {
    let root = group(scene, OWNER);
    let water = Material::hex(0x6fb9ff).with_emissive(0x6fb9ff, 0.5);
    place(
        scene,
        root,
        MeshType::Disc { segments: 32 },
        water,
        Vec3::new(-12.0, 0.03, 12.0),
        Vec3::new(4.0, 1.0, 4.0),
    );
}
