//! Procedural scene construction.
//!
//! Builders only add entities to the scene graph; they keep no state. The
//! handles they return ([`GlobalRig`], [`EnvironmentRig`]) are what the
//! garden animates each frame.

pub mod common;
pub mod forest;
pub mod park;
pub mod valley;

use glam::Vec3;
use rand::Rng;

use crate::animation::{Butterfly, DogWalker};
use crate::environment::Environment;
use crate::mesh_asset::MeshAssetRegistry;
use crate::particle::ParticleSystem;
use crate::scene_graph::{EntityId, Material, MeshInstance, MeshType, Owner, SceneEntity, SceneGraph, Transform};

/// Side length of the square ground plane.
pub const GROUND_SIZE: f32 = 160.0;

/// Entities that live for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalRig {
    pub ground: EntityId,
    pub stars: EntityId,
    pub snow: EntityId,
}

/// Animated handles for the environment currently built.
#[derive(Debug, Clone)]
pub struct EnvironmentRig {
    pub environment: Environment,
    pub butterflies: Vec<Butterfly>,
    /// Valley only.
    pub dog: Option<DogWalker>,
    /// Forest only: the falling-droplet particle system.
    pub waterfall: Option<EntityId>,
}

/// Ground plane, star field and snow petals.
pub fn build_global(scene: &mut SceneGraph, rng: &mut impl Rng) -> GlobalRig {
    let mut ground = MeshInstance::new(MeshType::Plane, ground_material(Environment::default()));
    ground.transform = Transform::default().with_scale(Vec3::new(GROUND_SIZE, 1.0, GROUND_SIZE));
    let ground = scene.spawn(SceneEntity::Mesh(ground), Owner::Global);

    let stars = scene.spawn(SceneEntity::Particles(ParticleSystem::stars(rng)), Owner::Global);
    let snow = scene.spawn(SceneEntity::Particles(ParticleSystem::snow(rng)), Owner::Global);

    GlobalRig { ground, stars, snow }
}

/// Build everything owned by `environment`.
///
/// The caller is responsible for clearing the previous environment first.
pub fn build_environment(
    environment: Environment,
    scene: &mut SceneGraph,
    assets: &mut MeshAssetRegistry,
    rng: &mut impl Rng,
) -> EnvironmentRig {
    match environment {
        Environment::Valley => valley::build(scene, assets, rng),
        Environment::Forest => forest::build(scene, rng),
        Environment::Park => park::build(scene, rng),
    }
}

/// Ground color and glow for an environment.
pub fn ground_material(environment: Environment) -> Material {
    let (color, emissive) = match environment {
        Environment::Valley => (0x2a6f32, 0x234f28),
        Environment::Forest => (0x183820, 0x102815),
        Environment::Park => (0x4f8b3d, 0x345b2a),
    };
    Material::hex(color).with_emissive(emissive, 0.5)
}
