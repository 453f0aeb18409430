//! Valley: snow-capped mountains, a winding river, conifers and a dog.

use std::f32::consts::PI;

use glam::Vec3;
use rand::Rng;

use crate::animation::DogWalker;
use crate::curve::CatmullRom;
use crate::environment::Environment;
use crate::mesh_asset::{tube, MeshAssetRegistry};
use crate::scene_graph::{EntityId, Material, MeshType, Owner, SceneEntity, SceneGraph, Transform};

use super::common::{cone_size, create_butterflies, group, place, scatter_wildflowers};
use super::EnvironmentRig;

const OWNER: Owner = Owner::Environment(Environment::Valley);

/// Mesh asset id of the river tube.
pub const RIVER_ASSET: &str = "valley-river";

/// Control points of the river, upstream first.
pub const RIVER_POINTS: [Vec3; 6] = [
    Vec3::new(-8.0, 0.0, -46.0),
    Vec3::new(-4.0, 0.0, -32.0),
    Vec3::new(0.0, 0.0, -18.0),
    Vec3::new(6.0, 0.0, -6.0),
    Vec3::new(12.0, 0.0, 6.0),
    Vec3::new(20.0, 0.0, 18.0),
];

const TREE_SPOTS: [(f32, f32); 9] = [
    (-18.0, -10.0),
    (-22.0, -2.0),
    (-25.0, -16.0),
    (-12.0, -18.0),
    (-4.0, -9.0),
    (6.0, -12.0),
    (14.0, -5.0),
    (18.0, -15.0),
    (10.0, -20.0),
];

pub fn build(scene: &mut SceneGraph, assets: &mut MeshAssetRegistry, rng: &mut impl Rng) -> EnvironmentRig {
    create_mountains(scene);
    let river = create_river(scene, assets);
    create_trees(scene);
    scatter_wildflowers(scene, OWNER, rng, 40.0, 220, Vec3::ZERO);
    let butterflies = create_butterflies(scene, OWNER, rng);
    let dog = create_dog(scene);

    EnvironmentRig {
        environment: Environment::Valley,
        butterflies,
        dog: river.map(|river| DogWalker::new(dog, river)),
        waterfall: None,
    }
}

fn create_mountains(scene: &mut SceneGraph) {
    let root = group(scene, OWNER);
    let rock = Material::hex(0x68758b);
    let snow = Material::hex(0xf8fbff);

    // (position, radius, height, segments, yaw)
    let peaks = [
        (Vec3::new(-10.0, 15.0, -70.0), 22.0, 32.0, 6, PI / 7.0),
        (Vec3::new(18.0, 13.0, -62.0), 16.0, 26.0, 5, -PI / 9.0),
        (Vec3::new(-30.0, 12.0, -60.0), 16.0 * 1.1, 26.0 * 1.1, 5, 0.0),
    ];
    let caps = [
        (Vec3::new(-10.0, 23.0, -70.0), 13.0, 10.0, 6, PI / 7.0),
        (Vec3::new(18.0, 18.0, -62.0), 9.0, 8.0, 5, -PI / 9.0),
        (Vec3::new(-30.0, 17.0, -60.0), 9.0, 8.0, 5, 0.0),
    ];

    for (shapes, material) in [(peaks, rock), (caps, snow)] {
        for (position, radius, height, segments, yaw) in shapes {
            let transform = Transform::at(position)
                .with_scale(cone_size(radius, height))
                .with_rotation(Vec3::new(0.0, yaw, 0.0));
            scene.spawn_mesh(root, MeshType::Cone { segments }, material, transform);
        }
    }
}

/// Build the river tube and return the curve it follows.
fn create_river(scene: &mut SceneGraph, assets: &mut MeshAssetRegistry) -> Option<CatmullRom> {
    let curve = CatmullRom::new(RIVER_POINTS.to_vec())?;
    assets.register(tube(RIVER_ASSET, &curve, 260, 1.7, 14, 0.1));

    let material = Material::hex(0x4aa7ff).with_emissive(0x4aa7ff, 0.45);
    let root = group(scene, OWNER);
    scene.spawn_mesh(
        root,
        MeshType::Asset(RIVER_ASSET.to_string()),
        material,
        Transform::at(Vec3::new(0.0, 0.03, 0.0)),
    );
    Some(curve)
}

fn create_trees(scene: &mut SceneGraph) {
    let root = group(scene, OWNER);
    let trunk = Material::hex(0x4a2e1a);
    let foliage = Material::hex(0x1f4c2f).with_emissive(0x163b24, 0.7);

    for (x, z) in TREE_SPOTS {
        place(
            scene,
            root,
            MeshType::Cylinder { segments: 10 },
            trunk,
            Vec3::new(x, 1.4, z),
            Vec3::new(0.32, 2.8, 0.32),
        );
        place(
            scene,
            root,
            MeshType::Cone { segments: 10 },
            foliage,
            Vec3::new(x, 3.2, z),
            cone_size(1.4, 3.4),
        );
        place(
            scene,
            root,
            MeshType::Cone { segments: 10 },
            foliage,
            Vec3::new(x, 4.7, z),
            cone_size(1.2, 2.6),
        );
    }
}

/// Blocky dog. Its local +X is the snout.
fn create_dog(scene: &mut SceneGraph) -> EntityId {
    let dog = scene.spawn(
        SceneEntity::group(Transform::at(Vec3::new(-10.0, 0.0, -30.0))),
        OWNER,
    );
    let body = Material::hex(0xb8793b);
    let dark = Material::hex(0x5a3a20);
    let nose = Material::hex(0x222222);

    let mut block = |material: Material, position: Vec3, size: Vec3| {
        place(scene, dog, MeshType::Cube, material, position, size);
    };

    block(body, Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.6, 0.6, 0.5));
    block(body, Vec3::new(0.9, 0.75, 0.0), Vec3::new(0.6, 0.6, 0.5));
    block(nose, Vec3::new(1.2, 0.7, 0.0), Vec3::new(0.2, 0.2, 0.3));

    let ear = Vec3::new(0.15, 0.25, 0.1);
    block(dark, Vec3::new(0.8, 1.0, 0.2), ear);
    block(dark, Vec3::new(0.8, 1.0, -0.2), ear);

    let leg = Vec3::new(0.18, 0.5, 0.18);
    for (x, z) in [(-0.6, 0.2), (-0.6, -0.2), (0.4, 0.2), (0.4, -0.2)] {
        block(dark, Vec3::new(x, 0.25, z), leg);
    }

    scene.spawn_mesh(
        dog,
        MeshType::Cube,
        dark,
        Transform::at(Vec3::new(-0.9, 0.9, 0.0))
            .with_scale(Vec3::new(0.1, 0.5, 0.1))
            .with_rotation(Vec3::new(0.0, 0.0, PI / 6.0)),
    );

    dog
}
